//! Configuration types for searchui.
//!
//! [`Config::load`] reads `~/.config/searchui/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist, then applies
//! `SEARCHUI__SECTION__KEY` environment overrides. [`Config::defaults`]
//! returns the same defaults without touching the filesystem (useful in tests).

use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[search]
protocol       = "http"
hostname       = "localhost"
port           = 17000
workflow       = "search"
query_language = "simple"
locale         = "en"
rows           = 5000
realm          = "aie"
sort           = [".score:DESC"]
field          = "title"
timeout_ms     = 30000

[export]
id_field      = ".id"
id_alias      = "id"
fields        = ["*"]
column_titles = ["Record ID", "Field", "Value"]
output_dir    = "."
agent         = ""

[webplayer]
url                = "http://localhost:8080/"
sweep_host         = "localhost"
sweep_start        = 8000
sweep_end          = 8500
attempt_timeout_ms = 250

[page]
base_uri         = ""
sortable_fields  = ["title", "table", "size", "creationdate", "date", "guid", "linkcount", "socialsecurity", "zipcode"]
relevancy_models = []
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration, loaded from `~/.config/searchui/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub webplayer: WebplayerConfig,
    #[serde(default)]
    pub page: PageConfig,
}

/// `[search]` section: where the search API lives and the fixed parts of
/// every request.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default = "default_hostname")]
    pub hostname: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_workflow")]
    pub workflow: String,
    #[serde(default = "default_query_language")]
    pub query_language: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_rows")]
    pub rows: u32,
    #[serde(default = "default_realm")]
    pub realm: String,
    #[serde(default = "default_sort")]
    pub sort: Vec<String>,
    /// Display field requested from the API and sent to the webplayer.
    #[serde(default = "default_field")]
    pub field: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Replaced wholesale (not merged) when set in a config file.
    #[serde(default = "default_rest_params")]
    pub rest_params: BTreeMap<String, Vec<String>>,
}

fn default_protocol() -> String { "http".to_string() }
fn default_hostname() -> String { "localhost".to_string() }
fn default_port() -> u16 { 17000 }
fn default_workflow() -> String { "search".to_string() }
fn default_query_language() -> String { "simple".to_string() }
fn default_locale() -> String { "en".to_string() }
fn default_rows() -> u32 { 5000 }
fn default_realm() -> String { "aie".to_string() }
fn default_sort() -> Vec<String> { vec![".score:DESC".to_string()] }
fn default_field() -> String { "title".to_string() }
fn default_timeout_ms() -> u64 { 30_000 }

/// REST parameters the search page always sent.
pub fn default_rest_params() -> BTreeMap<String, Vec<String>> {
    [
        ("offset", "0"),
        ("relevancymodelnames", "default"),
        ("includemetadatainresponse", "true"),
        ("highlight", "false"),
        ("highlight.mode", "HTML"),
        ("facet.ff", "RESULTS"),
        ("facet.ffcount", "20"),
        ("join.rollup", "tree"),
        ("abc.enabled", "true"),
        ("searchProfile", "Attivio"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), vec![v.to_string()]))
    .collect()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            protocol: default_protocol(),
            hostname: default_hostname(),
            port: default_port(),
            workflow: default_workflow(),
            query_language: default_query_language(),
            locale: default_locale(),
            rows: default_rows(),
            realm: default_realm(),
            sort: default_sort(),
            field: default_field(),
            timeout_ms: default_timeout_ms(),
            rest_params: default_rest_params(),
        }
    }
}

impl SearchConfig {
    /// `{protocol}://{hostname}:{port}`
    pub fn origin(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.hostname, self.port)
    }

    /// Full URL of the search endpoint.
    pub fn search_url(&self) -> String {
        format!("{}/rest/searchApi/search", self.origin())
    }
}

/// `[export]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_id_field")]
    pub id_field: String,
    /// Synonym of the identifier field, never exported as a row.
    #[serde(default = "default_id_alias")]
    pub id_alias: String,
    /// Fields requested for an export; `*` asks for every stored field.
    #[serde(default = "default_export_fields")]
    pub fields: Vec<String>,
    /// Empty means "use the column keys as the header".
    #[serde(default = "default_column_titles")]
    pub column_titles: Vec<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Environment identity used to pick a file delivery strategy.
    #[serde(default)]
    pub agent: String,
}

fn default_id_field() -> String { ".id".to_string() }
fn default_id_alias() -> String { "id".to_string() }
fn default_export_fields() -> Vec<String> { vec!["*".to_string()] }
fn default_column_titles() -> Vec<String> {
    vec!["Record ID".to_string(), "Field".to_string(), "Value".to_string()]
}
fn default_output_dir() -> PathBuf { PathBuf::from(".") }

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            id_field: default_id_field(),
            id_alias: default_id_alias(),
            fields: default_export_fields(),
            column_titles: default_column_titles(),
            output_dir: default_output_dir(),
            agent: String::new(),
        }
    }
}

/// `[webplayer]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WebplayerConfig {
    #[serde(default = "default_webplayer_url")]
    pub url: String,
    #[serde(default = "default_sweep_host")]
    pub sweep_host: String,
    #[serde(default = "default_sweep_start")]
    pub sweep_start: u16,
    /// Exclusive.
    #[serde(default = "default_sweep_end")]
    pub sweep_end: u16,
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,
}

fn default_webplayer_url() -> String { "http://localhost:8080/".to_string() }
fn default_sweep_host() -> String { "localhost".to_string() }
fn default_sweep_start() -> u16 { 8000 }
fn default_sweep_end() -> u16 { 8500 }
fn default_attempt_timeout_ms() -> u64 { 250 }

impl Default for WebplayerConfig {
    fn default() -> Self {
        Self {
            url: default_webplayer_url(),
            sweep_host: default_sweep_host(),
            sweep_start: default_sweep_start(),
            sweep_end: default_sweep_end(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
        }
    }
}

/// `[page]` section: search page defaults that shape requests.
#[derive(Debug, Clone, Deserialize)]
pub struct PageConfig {
    /// Base URI for signals; empty means the search API origin.
    #[serde(default)]
    pub base_uri: String,
    #[serde(default = "default_sortable_fields")]
    pub sortable_fields: Vec<String>,
    /// Empty means any model name is accepted.
    #[serde(default)]
    pub relevancy_models: Vec<String>,
}

fn default_sortable_fields() -> Vec<String> {
    [
        "title",
        "table",
        "size",
        "creationdate",
        "date",
        "guid",
        "linkcount",
        "socialsecurity",
        "zipcode",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            base_uri: String::new(),
            sortable_fields: default_sortable_fields(),
            relevancy_models: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/searchui/config.toml`, layered on top of the
    /// built-in defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::load_from(&path)
    }

    /// Load an explicit file (which must exist) over the built-in defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let cfg: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix("SEARCHUI")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    /// Reject settings no request could be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.rows == 0 {
            return Err(ConfigError::Invalid("search.rows must be positive".into()));
        }
        if self.search.field.trim().is_empty() {
            return Err(ConfigError::Invalid("search.field must not be empty".into()));
        }
        if self.webplayer.sweep_start > self.webplayer.sweep_end {
            return Err(ConfigError::Invalid(format!(
                "webplayer sweep range {}..{} is inverted",
                self.webplayer.sweep_start, self.webplayer.sweep_end
            )));
        }
        let titles = self.export.column_titles.len();
        if titles != 0 && titles != crate::export::COLUMN_KEYS.len() {
            return Err(ConfigError::Invalid(format!(
                "export.column_titles needs {} entries, got {titles}",
                crate::export::COLUMN_KEYS.len()
            )));
        }
        Ok(())
    }

    /// Base URI for signal calls.
    pub fn signals_base_uri(&self) -> String {
        if self.page.base_uri.is_empty() {
            self.search.origin()
        } else {
            self.page.base_uri.trim_end_matches('/').to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("searchui")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
