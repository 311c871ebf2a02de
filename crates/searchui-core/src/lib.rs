//! searchui-core — request building, export and messaging for searchui.
//!
//! This crate holds everything that does not touch the network: the wire
//! types, configuration, the query builder, CSV export and file delivery,
//! webplayer message encoding and the port sweep, and the city card.
//!
//! # Flow
//!
//! ```text
//! SearchState ──► QueryBuilder ──► SearchBackend ──┬──► CsvExportSpec ──► FileDelivery
//!                                                  └──► encode_message ──► Messenger
//! ```
//!
//! The network side (`SearchBackend`, `SignalSink`, `MessageTarget`
//! implementations) lives in `searchui-net`.

pub mod backend;
pub mod city;
pub mod config;
pub mod delivery;
pub mod error;
pub mod export;
pub mod message;
pub mod query;
pub mod sequence;
pub mod types;

pub use types::{FacetFilter, SearchDocument, SearchRequest, SearchResponse, SearchState};
