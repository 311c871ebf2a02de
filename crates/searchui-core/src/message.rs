//! Webplayer messaging — hands the top results to an embedding host.
//!
//! The message is one comma-separated string: the raw query followed by one
//! segment per document. Commas and semicolons inside values are swapped for
//! their full-width forms (`，` `；`) so the encoding stays unambiguous.
//!
//! Delivery goes to the configured webplayer origin first. If that fails,
//! [`PortSweep`] walks `http://{host}:{port}/` over a bounded port range in
//! increasing order and stops at the first target that accepts.

use crate::config::WebplayerConfig;
use crate::error::DeliveryError;
use crate::types::SearchDocument;
use std::future::Future;
use std::ops::Range;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const FULLWIDTH_COMMA: char = '，';
const FULLWIDTH_SEMICOLON: char = '；';
const VALUE_SEPARATOR: &str = "，";

/// Replace `,` and `;` with their full-width counterparts.
pub fn escape_value(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            ',' => FULLWIDTH_COMMA,
            ';' => FULLWIDTH_SEMICOLON,
            other => other,
        })
        .collect()
}

/// Build the webplayer message for `docs`.
///
/// Each document contributes the escaped values of `field`, joined with a
/// full-width comma; a document without the field contributes an empty
/// segment. The query itself is not escaped.
pub fn encode_message(query: &str, docs: &[SearchDocument], field: &str) -> String {
    let mut parts = Vec::with_capacity(docs.len() + 1);
    parts.push(query.to_string());
    parts.extend(docs.iter().map(|doc| {
        doc.values(field)
            .iter()
            .map(|v| escape_value(v))
            .collect::<Vec<_>>()
            .join(VALUE_SEPARATOR)
    }));
    parts.join(",")
}

/// Something that can receive a message for a given origin.
pub trait MessageTarget: Send + Sync {
    fn post(
        &self,
        origin: &str,
        message: &str,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// Result of a port sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    Delivered { port: u16, attempts: usize },
    Exhausted { attempts: usize },
    Cancelled { attempts: usize },
}

/// Bounded, cancellable walk over local ports.
#[derive(Debug, Clone)]
pub struct PortSweep {
    host: String,
    ports: Range<u16>,
    attempt_timeout: Duration,
}

impl PortSweep {
    pub fn new(host: impl Into<String>, ports: Range<u16>, attempt_timeout: Duration) -> Self {
        Self {
            host: host.into(),
            ports,
            attempt_timeout,
        }
    }

    pub fn from_config(cfg: &WebplayerConfig) -> Self {
        Self::new(
            cfg.sweep_host.clone(),
            cfg.sweep_start..cfg.sweep_end,
            Duration::from_millis(cfg.attempt_timeout_ms),
        )
    }

    /// Origin posted to for `port`.
    pub fn origin(&self, port: u16) -> String {
        format!("http://{}:{}/", self.host, port)
    }

    /// Try each port in order until one accepts, the range runs out, or
    /// `cancel` fires. Individual failures never abort the sweep.
    pub async fn run<T: MessageTarget>(
        &self,
        target: &T,
        message: &str,
        cancel: &CancellationToken,
    ) -> SweepOutcome {
        let mut attempts = 0;
        for port in self.ports.clone() {
            if cancel.is_cancelled() {
                return SweepOutcome::Cancelled { attempts };
            }
            attempts += 1;
            let origin = self.origin(port);
            match attempt(target, &origin, message, self.attempt_timeout).await {
                Ok(()) => return SweepOutcome::Delivered { port, attempts },
                Err(e) => tracing::trace!(port, error = %e, "sweep attempt failed"),
            }
        }
        SweepOutcome::Exhausted { attempts }
    }
}

/// Where a message ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    Webplayer,
    LocalPort(u16),
    Exhausted { attempts: usize },
    Cancelled { attempts: usize },
}

impl MessageOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, MessageOutcome::Webplayer | MessageOutcome::LocalPort(_))
    }
}

/// Webplayer first, then the local sweep.
#[derive(Debug, Clone)]
pub struct Messenger {
    webplayer_url: String,
    sweep: PortSweep,
    attempt_timeout: Duration,
}

impl Messenger {
    pub fn new(cfg: &WebplayerConfig) -> Self {
        Self {
            webplayer_url: cfg.url.clone(),
            sweep: PortSweep::from_config(cfg),
            attempt_timeout: Duration::from_millis(cfg.attempt_timeout_ms),
        }
    }

    pub async fn send<T: MessageTarget>(
        &self,
        target: &T,
        message: &str,
        cancel: &CancellationToken,
    ) -> MessageOutcome {
        if !self.webplayer_url.is_empty() {
            match attempt(target, &self.webplayer_url, message, self.attempt_timeout).await {
                Ok(()) => {
                    tracing::info!(origin = %self.webplayer_url, "message delivered to webplayer");
                    return MessageOutcome::Webplayer;
                }
                Err(e) => {
                    tracing::debug!(origin = %self.webplayer_url, error = %e, "webplayer unreachable, sweeping local ports");
                }
            }
        }
        match self.sweep.run(target, message, cancel).await {
            SweepOutcome::Delivered { port, attempts } => {
                tracing::info!(port, attempts, "message delivered to local host");
                MessageOutcome::LocalPort(port)
            }
            SweepOutcome::Exhausted { attempts } => {
                tracing::warn!(attempts, "no local host accepted the message");
                MessageOutcome::Exhausted { attempts }
            }
            SweepOutcome::Cancelled { attempts } => MessageOutcome::Cancelled { attempts },
        }
    }
}

async fn attempt<T: MessageTarget>(
    target: &T,
    origin: &str,
    message: &str,
    timeout: Duration,
) -> Result<(), DeliveryError> {
    match tokio::time::timeout(timeout, target.post(origin, message)).await {
        Ok(result) => result,
        Err(_) => Err(DeliveryError::Timeout),
    }
}
