use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub card: CardConfig,
    pub qr: QrConfig,
    pub store: StoreConfig,
    pub document: DocumentConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    /// Family used for every text element on the card.
    pub font_family: String,
    /// Extra font files loaded next to the embedded fonts.
    pub font_files: Vec<PathBuf>,
    pub labels: CardLabels,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            font_family: "Libertinus Serif".to_string(),
            font_files: Vec::new(),
            labels: CardLabels::default(),
        }
    }
}

/// Fixed strings drawn on the share card.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CardLabels {
    pub brand: String,
    pub subtitle: String,
    pub highlights: String,
    pub scan_to_view: String,
    pub powered_by: String,
}

impl Default for CardLabels {
    fn default() -> Self {
        Self {
            brand: "TRIP OS".to_string(),
            subtitle: "AI-Powered Itinerary".to_string(),
            highlights: "Trip Highlights".to_string(),
            scan_to_view: "Scan to view full itinerary".to_string(),
            powered_by: "Planned by Trip OS AI".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct QrConfig {
    pub service_url: String,
    pub timeout_ms: u64,
}

impl QrConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            service_url: "https://api.qrserver.com/v1/create-qr-code/".to_string(),
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub capacity: usize,
    /// Directory holding one JSON file per shared plan. In-memory when unset.
    pub directory: Option<PathBuf>,
    pub share_origin: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: crate::store::DEFAULT_CAPACITY,
            directory: None,
            share_origin: "https://tripos.app".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Body font family for PDF export; Typst's default when unset.
    pub font: Option<String>,
    pub annotation_color: String,
    pub page_numbers: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            font: None,
            annotation_color: "#d97706".to_string(),
            page_numbers: false,
        }
    }
}

impl Config {
    /// The defaults compiled into the binary from `default_config.toml`.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load config from a TOML file, or return the compiled defaults if the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::compiled_default());
        }

        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}
