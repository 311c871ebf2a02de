//! User actions: export, webplayer hand-off, city listing and rating.
//!
//! Each action builds a request from the [`SearchState`] it is given, runs it
//! against the [`SearchBackend`] and consumes the response. A validation
//! failure returns before the backend is touched. Actions share one
//! [`RequestSequencer`]; a response that arrives after a newer action started
//! is discarded.

use searchui_core::backend::{SearchBackend, SignalSink};
use searchui_core::city::CityCard;
use searchui_core::config::Config;
use searchui_core::delivery::{select_delivery, Delivered, FileDelivery};
use searchui_core::error::{ExportError, SearchError, ValidationError};
use searchui_core::export::CsvExportSpec;
use searchui_core::message::{encode_message, MessageOutcome, MessageTarget, Messenger};
use searchui_core::query::QueryBuilder;
use searchui_core::sequence::RequestSequencer;
use searchui_core::types::{SearchResponse, SearchState};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("no city document at position {0}")]
    NotACity(usize),
}

/// What an export produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written(Delivered),
    /// The result set had no exportable rows; nothing was written.
    Empty,
    /// A newer action started before this response arrived.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent(MessageOutcome),
    Superseded,
}

/// A city card detached from its response.
#[derive(Debug, Clone, PartialEq)]
pub struct CityListing {
    pub position: usize,
    pub title: String,
    pub summary: String,
    pub center: (f64, f64),
}

/// Everything an action needs, passed in explicitly.
pub struct App<B, T> {
    config: Config,
    backend: B,
    target: T,
    delivery: Box<dyn FileDelivery>,
    sequencer: RequestSequencer,
}

impl<B: SearchBackend, T: MessageTarget> App<B, T> {
    /// The file delivery is chosen here, once, from `config.export.agent`.
    pub fn new(config: Config, backend: B, target: T) -> Self {
        let delivery = select_delivery(&config.export.agent, &config.export.output_dir);
        Self::with_delivery(config, backend, target, delivery)
    }

    pub fn with_delivery(
        config: Config,
        backend: B,
        target: T,
        delivery: Box<dyn FileDelivery>,
    ) -> Self {
        Self {
            config,
            backend,
            target,
            delivery,
            sequencer: RequestSequencer::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    fn builder(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(&self.config.search, &self.config.page)
    }

    /// Run `builder` for `state`; `None` when the response was superseded.
    async fn run_search(
        &self,
        builder: QueryBuilder<'_>,
        state: &SearchState,
    ) -> Result<Option<SearchResponse>, ActionError> {
        let request = builder.build(state)?;
        let ticket = self.sequencer.issue();
        let response = self.backend.search(&request).await.inspect_err(|e| {
            tracing::error!(error = %e, query = %state.query, "search failed");
        })?;
        if !self.sequencer.is_current(ticket) {
            tracing::debug!(query = %state.query, "discarding superseded response");
            return Ok(None);
        }
        Ok(Some(response))
    }

    /// Query every configured export field and deliver the rows as CSV.
    pub async fn export(
        &self,
        state: &SearchState,
        query_filter: Option<String>,
    ) -> Result<ExportOutcome, ActionError> {
        let builder = self
            .builder()
            .fields(self.config.export.fields.iter().cloned())
            .query_filter(query_filter);
        let Some(response) = self.run_search(builder, state).await? else {
            return Ok(ExportOutcome::Superseded);
        };
        let spec =
            CsvExportSpec::from_documents(&response.documents, &state.query, &self.config.export);
        match spec.into_artifact()? {
            None => {
                tracing::info!(query = %state.query, "nothing to export");
                Ok(ExportOutcome::Empty)
            }
            Some(artifact) => Ok(ExportOutcome::Written(self.delivery.deliver(&artifact)?)),
        }
    }

    /// Query the display field and post the encoded results to the webplayer.
    pub async fn send_to_webplayer(
        &self,
        state: &SearchState,
        query_filter: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<SendOutcome, ActionError> {
        let builder = self.builder().query_filter(query_filter);
        let Some(response) = self.run_search(builder, state).await? else {
            return Ok(SendOutcome::Superseded);
        };
        let message = encode_message(&state.query, &response.documents, &self.config.search.field);
        tracing::debug!(%message, "webplayer message");
        let outcome = Messenger::new(&self.config.webplayer)
            .send(&self.target, &message, cancel)
            .await;
        Ok(SendOutcome::Sent(outcome))
    }

    /// City cards for the result set, in result order.
    pub async fn cities(
        &self,
        state: &SearchState,
        query_filter: Option<String>,
    ) -> Result<Vec<CityListing>, ActionError> {
        let builder = self
            .builder()
            .fields(self.config.export.fields.iter().cloned())
            .query_filter(query_filter);
        let Some(response) = self.run_search(builder, state).await? else {
            return Ok(Vec::new());
        };
        Ok(response
            .documents
            .iter()
            .enumerate()
            .filter_map(|(position, doc)| CityCard::for_document(doc, position))
            .map(|card| CityListing {
                position: card.position,
                title: card.title().to_string(),
                summary: card.summary(),
                center: card.center(),
            })
            .collect())
    }
}

impl<B: SearchBackend + SignalSink, T: MessageTarget> App<B, T> {
    /// Rate the city at `position` of the result set for `state` and
    /// `query_filter`, the same search `cities` lists. Returns `false` when
    /// the document carries no signal token, so nothing was recorded.
    pub async fn rate_city(
        &self,
        state: &SearchState,
        query_filter: Option<String>,
        position: usize,
        rating: u8,
    ) -> Result<bool, ActionError> {
        let builder = self
            .builder()
            .fields(self.config.export.fields.iter().cloned())
            .query_filter(query_filter);
        let Some(response) = self.run_search(builder, state).await? else {
            return Ok(false);
        };
        let card = response
            .documents
            .get(position)
            .and_then(|doc| CityCard::for_document(doc, position))
            .ok_or(ActionError::NotACity(position))?;
        match card.rate(rating) {
            Some(signal) => {
                self.backend.add_signals(std::slice::from_ref(&signal)).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
