use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid shared plan record: {0}")]
    Record(#[from] serde_json::Error),

    #[error("Font family {0:?} is not available")]
    FontMissing(String),

    #[error("Typst compilation failed: {0}")]
    Compile(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("HTTP client setup failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
