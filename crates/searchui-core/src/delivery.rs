//! File delivery — how a finished [`CsvArtifact`] reaches the user.
//!
//! Exactly one [`FileDelivery`] is selected at startup by
//! [`select_delivery`], from the environment identity string alone:
//!
//! | Identity contains                  | Strategy      | Effect                                  |
//! |------------------------------------|---------------|-----------------------------------------|
//! | `MSIE `, `Trident/`, `Edge/`       | `SaveBlob`    | stage in a temp file, persist atomically |
//! | `Safari/` without `Chrome/`        | `RawWindow`   | `sep=,` + raw CSV text to a stream       |
//! | anything else (including empty)    | `Download`    | write `<name>.csv` into the output dir   |

use crate::error::ExportError;
use crate::export::CsvArtifact;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Excel hint naming the separator; only the raw-window path writes it.
const SEPARATOR_HINT: &str = "sep=,\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStrategy {
    Download,
    SaveBlob,
    RawWindow,
}

impl DeliveryStrategy {
    /// Pick a strategy from an environment identity (user-agent style) string.
    pub fn detect(agent: &str) -> Self {
        if ["MSIE ", "Trident/", "Edge/"].iter().any(|m| agent.contains(m)) {
            DeliveryStrategy::SaveBlob
        } else if agent.contains("Safari/")
            && !agent.contains("Chrome/")
            && !agent.contains("Chromium/")
        {
            DeliveryStrategy::RawWindow
        } else {
            DeliveryStrategy::Download
        }
    }
}

impl std::fmt::Display for DeliveryStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStrategy::Download => write!(f, "download"),
            DeliveryStrategy::SaveBlob => write!(f, "save-blob"),
            DeliveryStrategy::RawWindow => write!(f, "raw-window"),
        }
    }
}

/// Receipt for a delivered artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    pub strategy: DeliveryStrategy,
    /// Where the file landed; `None` for stream delivery.
    pub path: Option<PathBuf>,
    pub bytes: usize,
}

/// A way of handing a CSV file to the user.
pub trait FileDelivery: Send + Sync {
    fn strategy(&self) -> DeliveryStrategy;
    fn deliver(&self, artifact: &CsvArtifact) -> Result<Delivered, ExportError>;
}

/// Select the delivery for `agent`. Files land in `dir`; the raw-window
/// strategy writes to stdout.
pub fn select_delivery(agent: &str, dir: &Path) -> Box<dyn FileDelivery> {
    let strategy = DeliveryStrategy::detect(agent);
    tracing::debug!(%strategy, agent, "selected file delivery");
    match strategy {
        DeliveryStrategy::Download => Box::new(DownloadDelivery::new(dir)),
        DeliveryStrategy::SaveBlob => Box::new(BlobSaveDelivery::new(dir)),
        DeliveryStrategy::RawWindow => Box::new(RawWindowDelivery::new(Box::new(std::io::stdout()))),
    }
}

// ---------------------------------------------------------------------------
// Download: write the file straight into the output directory
// ---------------------------------------------------------------------------

pub struct DownloadDelivery {
    dir: PathBuf,
}

impl DownloadDelivery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileDelivery for DownloadDelivery {
    fn strategy(&self) -> DeliveryStrategy {
        DeliveryStrategy::Download
    }

    fn deliver(&self, artifact: &CsvArtifact) -> Result<Delivered, ExportError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&artifact.file_name);
        let bytes = artifact.bytes();
        std::fs::write(&path, &bytes)?;
        tracing::info!(path = %path.display(), rows = artifact.rows, "csv written");
        Ok(Delivered {
            strategy: self.strategy(),
            path: Some(path),
            bytes: bytes.len(),
        })
    }
}

// ---------------------------------------------------------------------------
// SaveBlob: stage then persist, so a reader never sees a partial file
// ---------------------------------------------------------------------------

pub struct BlobSaveDelivery {
    dir: PathBuf,
}

impl BlobSaveDelivery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileDelivery for BlobSaveDelivery {
    fn strategy(&self) -> DeliveryStrategy {
        DeliveryStrategy::SaveBlob
    }

    fn deliver(&self, artifact: &CsvArtifact) -> Result<Delivered, ExportError> {
        std::fs::create_dir_all(&self.dir)?;
        let bytes = artifact.bytes();
        let mut staged = tempfile::NamedTempFile::new_in(&self.dir)?;
        staged.write_all(&bytes)?;
        staged.flush()?;
        let path = self.dir.join(&artifact.file_name);
        staged.persist(&path)?;
        tracing::info!(path = %path.display(), rows = artifact.rows, "csv saved");
        Ok(Delivered {
            strategy: self.strategy(),
            path: Some(path),
            bytes: bytes.len(),
        })
    }
}

// ---------------------------------------------------------------------------
// RawWindow: raw text to a stream, prefixed with the separator hint
// ---------------------------------------------------------------------------

pub struct RawWindowDelivery {
    out: Mutex<Box<dyn Write + Send>>,
}

impl RawWindowDelivery {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out: Mutex::new(out) }
    }
}

impl FileDelivery for RawWindowDelivery {
    fn strategy(&self) -> DeliveryStrategy {
        DeliveryStrategy::RawWindow
    }

    fn deliver(&self, artifact: &CsvArtifact) -> Result<Delivered, ExportError> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| std::io::Error::other("raw window writer poisoned"))?;
        out.write_all(SEPARATOR_HINT.as_bytes())?;
        out.write_all(artifact.text.as_bytes())?;
        out.flush()?;
        Ok(Delivered {
            strategy: self.strategy(),
            path: None,
            bytes: SEPARATOR_HINT.len() + artifact.text.len(),
        })
    }
}
