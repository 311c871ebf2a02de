//! Thin POST-only HTTP client over `hyper-util`'s pooled client.

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{header, Method, Request, StatusCode, Uri};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL {0:?}")]
    InvalidUrl(String),
    #[error("unsupported scheme {0:?}")]
    UnsupportedScheme(String),
    #[error("could not build request: {0}")]
    Request(#[from] hyper::http::Error),
    #[error("{0}")]
    Client(#[from] hyper_util::client::legacy::Error),
    #[error("could not read response body: {0}")]
    Body(#[from] hyper::Error),
}

/// A buffered response.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

#[derive(Clone)]
pub struct HttpClient {
    inner: Client<HttpConnector, Full<Bytes>>,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            inner: Client::builder(TokioExecutor::new()).build_http(),
        }
    }

    /// POST `body` to `url` and buffer the whole response.
    pub async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<HttpResponse, HttpError> {
        let uri = parse_http_uri(url)?;
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Full::new(Bytes::from(body)))?;
        let resp = self.inner.request(req).await?;
        let status = resp.status();
        let body = resp.into_body().collect().await?.to_bytes();
        Ok(HttpResponse { status, body })
    }
}

/// Parse `url`, accepting only plain `http`.
pub fn parse_http_uri(url: &str) -> Result<Uri, HttpError> {
    let uri: Uri = url
        .parse()
        .map_err(|_| HttpError::InvalidUrl(url.to_string()))?;
    match uri.scheme_str() {
        Some("http") => Ok(uri),
        Some(other) => Err(HttpError::UnsupportedScheme(other.to_string())),
        None => Err(HttpError::InvalidUrl(url.to_string())),
    }
}
