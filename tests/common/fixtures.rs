//! Static result sets used across harnesses.

use super::builders::{city, DocumentBuilder};
use searchui_core::SearchDocument;

pub fn city_oslo() -> SearchDocument {
    let mut doc = city("city-1", "Oslo", "634293", "Norwegian", "Oslo", "Norway");
    doc.fields.insert("latitude".into(), vec!["59.9127".into()]);
    doc.fields.insert("longitude".into(), vec!["10.7461".into()]);
    doc
}

pub fn city_lyon() -> SearchDocument {
    city("city-2", "Lyon", "513275", "French", "Auvergne-Rhône-Alpes", "France")
}

/// A non-city hit mixed into results.
pub fn news_article() -> SearchDocument {
    DocumentBuilder::new("news-9")
        .field("table", "news")
        .field("title", "Rain, again; more expected")
        .build()
}

/// Two cities and an article, in result order.
pub fn mixed_results() -> Vec<SearchDocument> {
    vec![city_oslo(), news_article(), city_lyon()]
}
