//! Test builders — ergonomic constructors for search documents.
//!
//! These builders are designed for readability in test assertions, not for
//! production use.

use searchui_core::SearchDocument;

/// Fluent builder for [`SearchDocument`] fixtures.
///
/// ```rust
/// let doc = DocumentBuilder::new("42")
///     .field("title", "Oslo")
///     .values("alias", &["Christiania", "Kristiania"])
///     .build();
/// ```
pub struct DocumentBuilder {
    doc: SearchDocument,
}

impl DocumentBuilder {
    /// Starts with `.id` set.
    pub fn new(id: &str) -> Self {
        Self::anonymous().field(".id", id)
    }

    /// No identifier at all.
    pub fn anonymous() -> Self {
        Self {
            doc: SearchDocument::default(),
        }
    }

    /// Append one value to `name`.
    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.doc
            .fields
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
        self
    }

    pub fn values(self, name: &str, values: &[&str]) -> Self {
        values.iter().fold(self, |b, v| b.field(name, v))
    }

    pub fn signal(mut self, token: serde_json::Value) -> Self {
        self.doc.signal = Some(token);
        self
    }

    pub fn build(self) -> SearchDocument {
        self.doc
    }
}

/// A city document in the shape the search page renders.
pub fn city(id: &str, title: &str, size: &str, language: &str, location: &str, country: &str) -> SearchDocument {
    DocumentBuilder::new(id)
        .field("table", "city")
        .field("title", title)
        .field("size", size)
        .field("language", language)
        .field("location", location)
        .field("country", country)
        .build()
}
