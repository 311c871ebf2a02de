//! Fake search API server for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves:
//! - `POST /rest/searchApi/search` — records the JSON body, answers with the
//!   configured documents (or the configured error status)
//! - `POST /rest/signals/add` — records the posted signal array
//!
//! # Example
//!
//! ```rust,no_run
//! let api = FakeSearchApi::start().await.unwrap();
//! api.set_documents(vec![city_oslo()]).await;
//! let cfg = config_for_api(api.port());
//! ```

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use searchui_core::SearchDocument;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[derive(Default)]
struct ApiState {
    documents: Vec<SearchDocument>,
    /// When set, every search answers with this status and a text body.
    fail_with: Option<u16>,
    requests: Vec<serde_json::Value>,
    signals: Vec<serde_json::Value>,
}

type Shared = Arc<Mutex<ApiState>>;

/// Handle to the running fake search API.
pub struct FakeSearchApi {
    addr: SocketAddr,
    state: Shared,
}

impl FakeSearchApi {
    /// Start the server on a random port. Returns once it is listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state: Shared = Arc::new(Mutex::new(ApiState::default()));

        let app = Router::new()
            .route("/rest/searchApi/search", post(search))
            .route("/rest/signals/add", post(add_signals))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, state })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub async fn set_documents(&self, docs: Vec<SearchDocument>) {
        self.state.lock().await.documents = docs;
    }

    pub async fn fail_with(&self, status: u16) {
        self.state.lock().await.fail_with = Some(status);
    }

    /// Bodies of every search request received so far.
    pub async fn requests(&self) -> Vec<serde_json::Value> {
        self.state.lock().await.requests.clone()
    }

    pub async fn signals(&self) -> Vec<serde_json::Value> {
        self.state.lock().await.signals.clone()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

async fn search(
    State(state): State<Shared>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let mut state = state.lock().await;
    state.requests.push(body);
    if let Some(status) = state.fail_with {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, "backend exploded").into_response();
    }
    Json(serde_json::json!({
        "totalHits": state.documents.len(),
        "documents": state.documents,
    }))
    .into_response()
}

async fn add_signals(
    State(state): State<Shared>,
    Json(body): Json<Vec<serde_json::Value>>,
) -> impl IntoResponse {
    state.lock().await.signals.extend(body);
    StatusCode::NO_CONTENT
}
