//! HTTP transport for webplayer messages: the message is POSTed as plain
//! text to the target origin.

use crate::http::{HttpClient, HttpError};
use searchui_core::error::DeliveryError;
use searchui_core::message::MessageTarget;

const TEXT: &str = "text/plain; charset=utf-8";

#[derive(Clone, Default)]
pub struct HttpMessageTarget {
    http: HttpClient,
}

impl HttpMessageTarget {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageTarget for HttpMessageTarget {
    async fn post(&self, origin: &str, message: &str) -> Result<(), DeliveryError> {
        let resp = self
            .http
            .post(origin, TEXT, message.as_bytes().to_vec())
            .await
            .map_err(|e| match e {
                HttpError::InvalidUrl(url) | HttpError::UnsupportedScheme(url) => {
                    DeliveryError::InvalidOrigin(url)
                }
                other => DeliveryError::Transport(other.to_string()),
            })?;
        if resp.status.is_success() {
            Ok(())
        } else {
            Err(DeliveryError::Status(resp.status.as_u16()))
        }
    }
}
