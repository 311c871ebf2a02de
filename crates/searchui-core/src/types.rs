//! Core types for searchui-core.
//!
//! This module defines the wire-level structures shared by every layer: the
//! [`SearchRequest`] posted to the search API, the [`SearchResponse`] and its
//! [`SearchDocument`]s, and the [`SearchState`] a request is built from.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field holding the document identifier.
pub const ID_FIELD: &str = ".id";

/// Query value the searcher uses when nothing has been typed.
pub const MATCH_ALL_QUERY: &str = "*:*";

/// A single facet selection, as produced by clicking a facet bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetFilter {
    pub facet_name: String,
    pub bucket_label: String,
    /// Query-language filter expression applied by the backend.
    pub filter: String,
}

/// A facet the backend should compute (`"table"`, `"country"`, …).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacetSpec(pub String);

/// The JSON body of `POST /rest/searchApi/search`.
///
/// Built fresh for every action by [`QueryBuilder`](crate::query::QueryBuilder)
/// and dropped once the call completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub workflow: String,
    pub query_language: String,
    pub locale: String,
    /// Always positive; see [`Config::validate`](crate::config::Config::validate).
    pub rows: u32,
    /// Geo-filters first, then the caller-supplied filter.
    pub filters: Vec<String>,
    pub facets: Vec<FacetSpec>,
    pub sort: Vec<String>,
    pub fields: Vec<String>,
    pub facet_filters: Vec<FacetFilter>,
    pub rest_params: BTreeMap<String, Vec<String>>,
    pub realm: String,
}

/// One document of a search response.
///
/// Every field is multi-valued; single-valued fields are one-element arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    #[serde(default)]
    pub fields: BTreeMap<String, Vec<String>>,
    /// Opaque relevance-feedback token, present when signals are enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<serde_json::Value>,
}

impl SearchDocument {
    /// All values of `field`, or an empty slice.
    pub fn values(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value of `field`, if any.
    pub fn first_value(&self, field: &str) -> Option<&str> {
        self.values(field).first().map(String::as_str)
    }

    /// The document identifier (first value of `.id`).
    pub fn id(&self) -> Option<&str> {
        self.first_value(ID_FIELD)
    }
}

/// Parsed body of a successful search call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub documents: Vec<SearchDocument>,
    /// Total hit count reported by the backend, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_hits: Option<u64>,
}

/// Searcher state read at the moment a request is built.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub query: String,
    /// Active geo-filters from a map facet; `None` when none are set.
    pub geo_filters: Option<Vec<String>>,
    pub facet_filters: Vec<FacetFilter>,
    /// Empty means "use the configured default sort".
    pub sort: Vec<String>,
    /// Overrides `relevancymodelnames` when set.
    pub relevancy_model: Option<String>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: MATCH_ALL_QUERY.to_string(),
            geo_filters: None,
            facet_filters: Vec::new(),
            sort: Vec::new(),
            relevancy_model: None,
        }
    }
}

impl SearchState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// True when no real query has been entered.
    pub fn is_match_all(&self) -> bool {
        let q = self.query.trim();
        q.is_empty() || q == MATCH_ALL_QUERY
    }
}
