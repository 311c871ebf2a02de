//! Shared test utilities for searchui integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Fake servers bind to `127.0.0.1:0` so harnesses can run
//! in parallel.

#![allow(dead_code, unused_imports)]

pub mod builders;
pub mod fake_backend;
pub mod fake_search_api;
pub mod fake_webplayer;
pub mod fixtures;

pub use builders::*;
pub use fake_backend::*;
pub use fake_search_api::*;
pub use fake_webplayer::*;
pub use fixtures::*;

use searchui_core::config::Config;

/// Defaults pointed at a fake search API on `port`.
pub fn config_for_api(port: u16) -> Config {
    let mut cfg = Config::defaults();
    cfg.search.hostname = "127.0.0.1".into();
    cfg.search.port = port;
    cfg.search.timeout_ms = 5_000;
    cfg
}

/// A port nothing is listening on (bound then released).
pub async fn closed_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}
