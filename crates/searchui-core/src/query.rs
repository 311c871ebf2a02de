//! Query builder — turns searcher state into a [`SearchRequest`].
//!
//! The builder never reaches for ambient state: everything it needs arrives
//! through [`SearchConfig`], [`PageConfig`] and the [`SearchState`] passed to
//! [`QueryBuilder::build`].

use crate::config::{PageConfig, SearchConfig};
use crate::error::ValidationError;
use crate::types::{SearchRequest, SearchState};

/// Pseudo-field for relevance ordering, always sortable.
pub const SCORE_FIELD: &str = ".score";

const RELEVANCY_PARAM: &str = "relevancymodelnames";

#[derive(Debug, Clone)]
pub struct QueryBuilder<'a> {
    search: &'a SearchConfig,
    page: &'a PageConfig,
    fields: Vec<String>,
    query_filter: Option<String>,
}

impl<'a> QueryBuilder<'a> {
    /// Requests only the configured display field by default.
    pub fn new(search: &'a SearchConfig, page: &'a PageConfig) -> Self {
        Self {
            search,
            page,
            fields: vec![search.field.clone()],
            query_filter: None,
        }
    }

    /// Replace the requested field list.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Filter supplied by the embedding page, appended after any geo-filters.
    pub fn query_filter(mut self, filter: Option<String>) -> Self {
        self.query_filter = filter.filter(|f| !f.trim().is_empty());
        self
    }

    /// Build the request for `state`.
    ///
    /// Fails with [`ValidationError::EmptyQuery`] when the query is the
    /// match-all sentinel; callers must not touch the network in that case.
    pub fn build(&self, state: &SearchState) -> Result<SearchRequest, ValidationError> {
        if state.is_match_all() {
            return Err(ValidationError::EmptyQuery);
        }

        let mut filters = state.geo_filters.clone().unwrap_or_default();
        if let Some(filter) = &self.query_filter {
            filters.push(filter.clone());
        }

        let sort = if state.sort.is_empty() {
            self.search.sort.clone()
        } else {
            for spec in &state.sort {
                validate_sort(spec, &self.page.sortable_fields)?;
            }
            state.sort.clone()
        };

        let mut rest_params = self.search.rest_params.clone();
        if let Some(model) = &state.relevancy_model {
            validate_relevancy_model(model, &self.page.relevancy_models)?;
            rest_params.insert(RELEVANCY_PARAM.to_string(), vec![model.clone()]);
        }

        Ok(SearchRequest {
            query: state.query.clone(),
            workflow: self.search.workflow.clone(),
            query_language: self.search.query_language.clone(),
            locale: self.search.locale.clone(),
            rows: self.search.rows,
            filters,
            facets: Vec::new(),
            sort,
            fields: self.fields.clone(),
            facet_filters: state.facet_filters.clone(),
            rest_params,
            realm: self.search.realm.clone(),
        })
    }
}

/// Check a `field:DIRECTION` sort expression against the sortable fields.
pub fn validate_sort(spec: &str, sortable: &[String]) -> Result<(), ValidationError> {
    let (field, direction) = spec.rsplit_once(':').unwrap_or((spec, "ASC"));
    if !matches!(direction, "ASC" | "DESC") {
        return Err(ValidationError::InvalidSortDirection(direction.to_string()));
    }
    if field != SCORE_FIELD && !sortable.iter().any(|f| f == field) {
        return Err(ValidationError::UnknownSortField(field.to_string()));
    }
    Ok(())
}

fn validate_relevancy_model(model: &str, known: &[String]) -> Result<(), ValidationError> {
    if known.is_empty() || known.iter().any(|m| m == model) {
        Ok(())
    } else {
        Err(ValidationError::UnknownRelevancyModel(model.to_string()))
    }
}
