//! Fake webplayer host: accepts `POST /` and records each message body.

use axum::{extract::State, http::StatusCode, routing::post, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

pub struct FakeWebplayer {
    addr: SocketAddr,
    messages: Arc<Mutex<Vec<String>>>,
}

impl FakeWebplayer {
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let messages = Arc::new(Mutex::new(Vec::new()));

        let app = Router::new()
            .route("/", post(receive))
            .with_state(messages.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, messages })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Origin in the form the messenger posts to.
    pub fn origin(&self) -> String {
        format!("http://127.0.0.1:{}/", self.addr.port())
    }

    pub async fn messages(&self) -> Vec<String> {
        self.messages.lock().await.clone()
    }
}

async fn receive(State(messages): State<Arc<Mutex<Vec<String>>>>, body: String) -> StatusCode {
    messages.lock().await.push(body);
    StatusCode::OK
}
