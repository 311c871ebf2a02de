//! searchui — search API export and webplayer hand-off.
//!
//! Library half of the `searchui` binary. The [`actions::App`] wires the
//! pieces from `searchui-core` to a search backend and message target so
//! integration tests can drive the same code paths as the CLI.
//!
//! # Architecture
//!
//! ```text
//! CLI ──► App ──► QueryBuilder ──► SearchClient (searchui-net)
//!          │
//!          ├──► CsvExportSpec ──► FileDelivery
//!          └──► encode_message ──► Messenger ──► HttpMessageTarget (searchui-net)
//! ```

pub mod actions;

pub use actions::{ActionError, App, CityListing, ExportOutcome, SendOutcome};
