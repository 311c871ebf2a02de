//! City result card — the data side of the per-document city view.
//!
//! A card only exists for documents whose `table` is `city`. It exposes the
//! one-line summary, the map centre and turns a star rating into a
//! relevance-feedback [`Signal`].

use crate::types::SearchDocument;
use chrono::{DateTime, Utc};
use serde::Serialize;

const CITY_TABLE: &str = "city";
const LIKE_SIGNAL: &str = "like";
const MAX_RATING: u8 = 5;

/// A relevance-feedback event for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub doc_id: String,
    #[serde(rename = "type")]
    pub signal_type: String,
    pub weight: u8,
    /// Token handed out with the search result.
    pub signal: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct CityCard<'a> {
    doc: &'a SearchDocument,
    pub position: usize,
}

impl<'a> CityCard<'a> {
    /// A card for `doc` if it is a city document, otherwise `None` so the
    /// next renderer can try.
    pub fn for_document(doc: &'a SearchDocument, position: usize) -> Option<Self> {
        (doc.first_value("table") == Some(CITY_TABLE)).then_some(Self { doc, position })
    }

    pub fn document(&self) -> &'a SearchDocument {
        self.doc
    }

    pub fn title(&self) -> &'a str {
        self.field("title")
    }

    fn field(&self, name: &str) -> &'a str {
        self.doc.first_value(name).unwrap_or_default()
    }

    /// Population, if `size` starts with an integer.
    pub fn population(&self) -> Option<i64> {
        parse_leading_int(self.field("size"))
    }

    pub fn summary(&self) -> String {
        let size = self
            .population()
            .map(group_thousands)
            .unwrap_or_else(|| "NaN".to_string());
        format!(
            "The {size} inhabitants here speak {}. This city is in the state/province of {} in {}.",
            self.field("language"),
            self.field("location"),
            self.field("country"),
        )
    }

    /// `(longitude, latitude)`; unparseable coordinates become 0.
    pub fn center(&self) -> (f64, f64) {
        let coord = |name| self.field(name).trim().parse::<f64>().unwrap_or(0.0);
        (coord("longitude"), coord("latitude"))
    }

    /// Signal for a star rating. `None` when the document carries no signal
    /// token or the rating is outside 1..=5.
    pub fn rate(&self, rating: u8) -> Option<Signal> {
        if !(1..=MAX_RATING).contains(&rating) {
            return None;
        }
        let token = self.doc.signal.clone()?;
        Some(Signal {
            doc_id: self.doc.id().unwrap_or_default().to_string(),
            signal_type: LIKE_SIGNAL.to_string(),
            weight: rating,
            signal: token,
            timestamp: Utc::now(),
        })
    }
}

/// Leading optional sign and digits, ignoring leading whitespace.
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse::<i64>().ok().map(|n| sign * n)
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
