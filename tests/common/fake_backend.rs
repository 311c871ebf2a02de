//! In-process search backends for tests that do not need HTTP.

use searchui_core::backend::SearchBackend;
use searchui_core::error::{DeliveryError, SearchError};
use searchui_core::message::MessageTarget;
use searchui_core::{SearchDocument, SearchRequest, SearchResponse};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Answers every request with the same documents, optionally delaying the
/// first call so a later one can overtake it.
#[derive(Default)]
pub struct ScriptedBackend {
    documents: Vec<SearchDocument>,
    first_call_delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<SearchRequest>>,
}

impl ScriptedBackend {
    pub fn new(documents: Vec<SearchDocument>) -> Self {
        Self {
            documents,
            ..Self::default()
        }
    }

    pub fn slow_first_call(mut self, delay: Duration) -> Self {
        self.first_call_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl SearchBackend for ScriptedBackend {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if n == 0 {
            if let Some(delay) = self.first_call_delay {
                tokio::time::sleep(delay).await;
            }
        }
        Ok(SearchResponse {
            documents: self.documents.clone(),
            total_hits: Some(self.documents.len() as u64),
        })
    }
}

/// Accepts every message in-process and remembers `(origin, message)`.
#[derive(Default)]
pub struct RecordingTarget {
    posted: Mutex<Vec<(String, String)>>,
}

impl RecordingTarget {
    pub fn posted(&self) -> Vec<(String, String)> {
        self.posted.lock().unwrap().clone()
    }
}

impl MessageTarget for RecordingTarget {
    async fn post(&self, origin: &str, message: &str) -> Result<(), DeliveryError> {
        self.posted
            .lock()
            .unwrap()
            .push((origin.to_string(), message.to_string()));
        Ok(())
    }
}
