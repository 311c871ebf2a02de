//! searchui-net — HTTP adapters for searchui.
//!
//! Implements the `searchui-core` seams over `hyper`: [`SearchClient`] for
//! the search and signals endpoints, [`HttpMessageTarget`] for webplayer
//! hand-off. Only plain `http` origins are supported.

pub mod http;
pub mod search;
pub mod webplayer;

pub use search::SearchClient;
pub use webplayer::HttpMessageTarget;
