//! Export — flattens search documents into rows and serialises them to CSV.
//!
//! A document `{".id": ["1"], "name": ["Ann", "Annie"]}` becomes one
//! [`ExportRow`] per value of every non-identifier field:
//!
//! ```text
//! "1","name","Ann"
//! "1","name","Annie"
//! ```
//!
//! Every data field is wrapped in double quotes and embedded quotes are
//! doubled. The header line is written unquoted. Lines end with CRLF.

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::types::SearchDocument;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Keys of the exported columns, in order.
pub const COLUMN_KEYS: [&str; 3] = ["recordId", "field", "value"];

pub const CSV_MIME: &str = "text/csv";

/// UTF-8 byte-order mark; lets spreadsheet tools detect the encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const FALLBACK_BASE_NAME: &str = "export";

static UNSAFE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}_-]+").expect("static regex"));

/// One `(document, field, value)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub record_id: String,
    #[serde(rename = "field")]
    pub field_name: String,
    #[serde(rename = "value")]
    pub field_value: String,
}

impl ExportRow {
    /// Look a column up by its key from [`COLUMN_KEYS`].
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "recordId" => Some(&self.record_id),
            "field" => Some(&self.field_name),
            "value" => Some(&self.field_value),
            _ => None,
        }
    }
}

/// Flatten documents into rows, fanning out multi-valued fields.
///
/// `id_field` supplies the record id; neither it nor `id_alias` is ever
/// emitted as a row. Fields are visited in name order.
pub fn flatten_documents(
    docs: &[SearchDocument],
    id_field: &str,
    id_alias: &str,
) -> Vec<ExportRow> {
    docs.iter()
        .flat_map(|doc| {
            let record_id = doc.first_value(id_field).unwrap_or_default().to_string();
            doc.fields
                .iter()
                .filter(move |(name, _)| *name != id_field && *name != id_alias)
                .flat_map(move |(name, values)| {
                    let record_id = record_id.clone();
                    values.iter().map(move |value| ExportRow {
                        record_id: record_id.clone(),
                        field_name: name.clone(),
                        field_value: value.clone(),
                    })
                })
        })
        .collect()
}

/// Maps `(column key, raw value)` to the text written into the cell.
pub type ValueFormatter = Box<dyn Fn(&str, &str) -> String + Send + Sync>;

/// Everything needed to produce one CSV file.
pub struct CsvExportSpec {
    pub rows: Vec<ExportRow>,
    pub file_base_name: String,
    /// Empty means "use the column keys".
    pub column_titles: Vec<String>,
    pub column_keys: Vec<String>,
    pub value_formatter: Option<ValueFormatter>,
}

impl std::fmt::Debug for CsvExportSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvExportSpec")
            .field("rows", &self.rows.len())
            .field("file_base_name", &self.file_base_name)
            .field("column_titles", &self.column_titles)
            .field("column_keys", &self.column_keys)
            .field("value_formatter", &self.value_formatter.is_some())
            .finish()
    }
}

impl CsvExportSpec {
    /// Build the spec for a result set returned for `query`.
    pub fn from_documents(docs: &[SearchDocument], query: &str, cfg: &ExportConfig) -> Self {
        Self {
            rows: flatten_documents(docs, &cfg.id_field, &cfg.id_alias),
            file_base_name: sanitize_file_base_name(query),
            column_titles: cfg.column_titles.clone(),
            column_keys: COLUMN_KEYS.iter().map(|k| k.to_string()).collect(),
            value_formatter: None,
        }
    }

    pub fn with_formatter(mut self, formatter: ValueFormatter) -> Self {
        self.value_formatter = Some(formatter);
        self
    }

    /// The header line, without terminator.
    pub fn header(&self) -> Result<String, ExportError> {
        if self.column_titles.is_empty() {
            return Ok(self.column_keys.join(","));
        }
        if self.column_titles.len() != self.column_keys.len() {
            return Err(ExportError::ColumnMismatch {
                titles: self.column_titles.len(),
                keys: self.column_keys.len(),
            });
        }
        Ok(self.column_titles.join(","))
    }

    /// Serialise to CSV text. Returns `None` when there are no rows.
    pub fn to_csv(&self) -> Result<Option<String>, ExportError> {
        if self.rows.is_empty() {
            return Ok(None);
        }
        let mut out = self.header()?;
        out.push_str("\r\n");
        for row in &self.rows {
            let line = self
                .column_keys
                .iter()
                .map(|key| {
                    let raw = row.get(key).unwrap_or_default();
                    match &self.value_formatter {
                        Some(format_value) => quote(&format_value(key.as_str(), raw)),
                        None => quote(raw),
                    }
                })
                .collect::<Vec<_>>()
                .join(",");
            out.push_str(&line);
            out.push_str("\r\n");
        }
        Ok(Some(out))
    }

    /// Serialise into a deliverable artifact, or `None` for an empty export.
    pub fn into_artifact(self) -> Result<Option<CsvArtifact>, ExportError> {
        Ok(self.to_csv()?.map(|text| CsvArtifact {
            file_name: format!("{}.csv", self.file_base_name),
            rows: self.rows.len(),
            text,
        }))
    }
}

/// A serialised CSV file, ready for a [`FileDelivery`](crate::delivery::FileDelivery).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvArtifact {
    pub file_name: String,
    pub rows: usize,
    /// CSV text without the byte-order mark.
    pub text: String,
}

impl CsvArtifact {
    pub fn mime(&self) -> &'static str {
        CSV_MIME
    }

    /// File contents: BOM followed by the CSV text.
    pub fn bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(UTF8_BOM.len() + self.text.len());
        bytes.extend_from_slice(UTF8_BOM);
        bytes.extend_from_slice(self.text.as_bytes());
        bytes
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Derive a file name stem from a query string.
pub fn sanitize_file_base_name(query: &str) -> String {
    let name = UNSAFE_NAME_CHARS.replace_all(query.trim(), "_");
    let name = name.trim_matches('_');
    if name.is_empty() {
        FALLBACK_BASE_NAME.to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    /// Repeated keys append values.
    fn doc(pairs: &[(&str, &str)]) -> SearchDocument {
        let mut d = SearchDocument::default();
        for (k, v) in pairs {
            d.fields.entry(k.to_string()).or_default().push(v.to_string());
        }
        d
    }

    fn row(id: &str, field: &str, value: &str) -> ExportRow {
        ExportRow {
            record_id: id.into(),
            field_name: field.into(),
            field_value: value.into(),
        }
    }

    #[test]
    fn multi_valued_field_fans_out() {
        let docs = [doc(&[(".id", "1"), ("name", "Ann"), ("name", "Annie")])];
        assert_eq!(
            flatten_documents(&docs, ".id", "id"),
            vec![row("1", "name", "Ann"), row("1", "name", "Annie")]
        );
    }

    #[test]
    fn identifier_and_alias_never_exported() {
        let docs = [doc(&[(".id", "1"), ("id", "1"), ("title", "Oslo")])];
        let rows = flatten_documents(&docs, ".id", "id");
        assert_eq!(rows, vec![row("1", "title", "Oslo")]);
    }

    #[test]
    fn empty_fields_emit_nothing() {
        let mut d = doc(&[(".id", "1")]);
        d.fields.insert("empty".into(), vec![]);
        let docs = [d];
        assert!(flatten_documents(&docs, ".id", "id").is_empty());
    }

    #[test]
    fn header_uses_titles_without_trailing_comma() {
        let cfg = Config::defaults();
        let spec = CsvExportSpec::from_documents(&[], "q", &cfg.export);
        assert_eq!(spec.header().unwrap(), "Record ID,Field,Value");
    }

    #[test]
    fn header_falls_back_to_keys() {
        let mut cfg = Config::defaults();
        cfg.export.column_titles.clear();
        let spec = CsvExportSpec::from_documents(&[], "q", &cfg.export);
        assert_eq!(spec.header().unwrap(), "recordId,field,value");
    }

    #[test]
    fn csv_quotes_every_field_and_uses_crlf() {
        let cfg = Config::defaults();
        let docs = [doc(&[(".id", "1"), ("name", "Ann"), ("name", "Annie")])];
        let csv = CsvExportSpec::from_documents(&docs, "ann", &cfg.export)
            .to_csv()
            .unwrap()
            .unwrap();
        assert_eq!(
            csv,
            "Record ID,Field,Value\r\n\"1\",\"name\",\"Ann\"\r\n\"1\",\"name\",\"Annie\"\r\n"
        );
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let cfg = Config::defaults();
        let docs = [doc(&[(".id", "1"), ("title", "the \"big\" one")])];
        let csv = CsvExportSpec::from_documents(&docs, "q", &cfg.export)
            .to_csv()
            .unwrap()
            .unwrap();
        assert!(csv.contains("\"the \"\"big\"\" one\""));
    }

    #[test]
    fn formatter_sees_key_and_value() {
        let cfg = Config::defaults();
        let docs = [doc(&[(".id", "1"), ("name", "ann")])];
        let csv = CsvExportSpec::from_documents(&docs, "q", &cfg.export)
            .with_formatter(Box::new(|key, value| {
                if key == "value" {
                    value.to_uppercase()
                } else {
                    value.to_string()
                }
            }))
            .to_csv()
            .unwrap()
            .unwrap();
        assert!(csv.ends_with("\"1\",\"name\",\"ANN\"\r\n"));
    }

    #[test]
    fn empty_rows_produce_no_artifact() {
        let cfg = Config::defaults();
        let spec = CsvExportSpec::from_documents(&[], "q", &cfg.export);
        assert_eq!(spec.into_artifact().unwrap(), None);
    }

    #[test]
    fn artifact_has_bom_and_csv_name() {
        let cfg = Config::defaults();
        let docs = [doc(&[(".id", "1"), ("name", "Ann")])];
        let artifact = CsvExportSpec::from_documents(&docs, "new york", &cfg.export)
            .into_artifact()
            .unwrap()
            .unwrap();
        assert_eq!(artifact.file_name, "new_york.csv");
        assert_eq!(artifact.mime(), "text/csv");
        assert!(artifact.bytes().starts_with(UTF8_BOM));
        assert_eq!(artifact.rows, 1);
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_base_name("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_file_base_name("  "), "export");
        assert_eq!(sanitize_file_base_name("***"), "export");
        assert_eq!(sanitize_file_base_name("city-2024"), "city-2024");
        assert_eq!(sanitize_file_base_name("München"), "München");
        assert_eq!(sanitize_file_base_name("東京 駅"), "東京_駅");
    }

    fn arb_doc() -> impl Strategy<Value = SearchDocument> {
        (
            "[0-9]{1,4}",
            proptest::collection::btree_map(
                "[a-z]{1,6}",
                proptest::collection::vec("[ -~]{0,8}", 0..4),
                0..5,
            ),
        )
            .prop_map(|(id, mut fields): (String, BTreeMap<String, Vec<String>>)| {
                fields.insert(".id".into(), vec![id.clone()]);
                fields.insert("id".into(), vec![id]);
                SearchDocument { fields, signal: None }
            })
    }

    proptest! {
        #[test]
        fn rows_never_reference_identifier(docs in proptest::collection::vec(arb_doc(), 0..6)) {
            let rows = flatten_documents(&docs, ".id", "id");
            prop_assert!(rows.iter().all(|r| r.field_name != ".id" && r.field_name != "id"));
        }

        #[test]
        fn one_row_per_value(d in arb_doc()) {
            let rows = flatten_documents(std::slice::from_ref(&d), ".id", "id");
            for (name, values) in d.fields.iter().filter(|(n, _)| *n != ".id" && *n != "id") {
                let count = rows.iter().filter(|r| &r.field_name == name).count();
                prop_assert_eq!(count, values.len());
            }
        }
    }
}
