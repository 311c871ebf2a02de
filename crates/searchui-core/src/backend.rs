//! Seams to the remote search service.
//!
//! The production implementations live in `searchui-net`; tests substitute
//! in-memory fakes.

use crate::city::Signal;
use crate::error::SearchError;
use crate::types::{SearchRequest, SearchResponse};
use std::future::Future;

/// Executes search requests.
pub trait SearchBackend: Send + Sync {
    fn search(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<SearchResponse, SearchError>> + Send;
}

/// Records relevance-feedback signals.
pub trait SignalSink: Send + Sync {
    fn add_signals(&self, signals: &[Signal])
        -> impl Future<Output = Result<(), SearchError>> + Send;
}
