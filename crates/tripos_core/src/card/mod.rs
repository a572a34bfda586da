//! Share card export: layout, then rasterization to PNG.

mod emoji;
mod font;
mod layout;
mod render;
mod scene;
mod text;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

pub use emoji::{DEFAULT_EMOJI, destination_emoji};
pub use font::FontBook;
pub use layout::{QrSlot, layout, qr_slot};
pub use render::{render_png, scene_to_typst};
pub use scene::{Color, Scene, Shadow, Shape};
pub use text::{TextMeasure, TextStyle, truncate_to_width, wrap_chars};

use crate::config::CardLabels;
use crate::error::Result;
use crate::qr::{QrAsset, QrFetcher};
use crate::summary::TripSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1080×1080
    #[default]
    #[serde(rename = "1x1")]
    Square,
    /// 1080×1920
    #[serde(rename = "9x16")]
    Story,
}

impl AspectRatio {
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            AspectRatio::Square => (1080, 1080),
            AspectRatio::Story => (1080, 1920),
        }
    }

    pub fn qr_size(self) -> f64 {
        match self {
            AspectRatio::Square => 160.0,
            AspectRatio::Story => 200.0,
        }
    }

    /// Extra gap between the QR block and the card's bottom padding.
    pub fn qr_lift(self) -> f64 {
        match self {
            AspectRatio::Square => 80.0,
            AspectRatio::Story => 100.0,
        }
    }

    /// Ratio as used in file names.
    pub fn tag(self) -> &'static str {
        match self {
            AspectRatio::Square => "1x1",
            AspectRatio::Story => "9x16",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1x1" | "1:1" | "square" => Ok(AspectRatio::Square),
            "9x16" | "9:16" | "story" => Ok(AspectRatio::Story),
            other => Err(format!("unknown aspect ratio {other:?}, expected 1x1 or 9x16")),
        }
    }
}

/// A finished share card.
#[derive(Debug, Clone)]
pub struct CardImage {
    pub png: Vec<u8>,
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

/// `TripOS-<destination>-<ratio>.png`, with every character outside
/// `[A-Za-z0-9]` in the destination replaced by `-`.
pub fn card_filename(destination: &str, ratio: AspectRatio) -> String {
    let sanitized: String = destination
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("TripOS-{}-{}.png", sanitized, ratio.tag())
}

/// Lay out and rasterize a card with an already resolved QR asset.
pub fn export_card(
    summary: &TripSummary,
    ratio: AspectRatio,
    labels: &CardLabels,
    fonts: &FontBook,
    qr: &QrAsset,
) -> Result<CardImage> {
    let scene = layout(summary, ratio, labels, qr.is_available(), fonts);
    let png = render_png(&scene, fonts, qr)?;
    let (width, height) = ratio.dimensions();
    let filename = card_filename(summary.destination(), ratio);
    info!(%filename, bytes = png.len(), qr = qr.is_available(), "exported share card");
    Ok(CardImage {
        png,
        filename,
        width,
        height,
    })
}

/// Fetch the QR for the summary's share URL, then export.
///
/// The fetch is the only await point. A slow or failing QR service yields the
/// placeholder tile rather than an error.
pub async fn export_share_card(
    summary: &TripSummary,
    ratio: AspectRatio,
    labels: &CardLabels,
    fonts: &FontBook,
    fetcher: &QrFetcher,
) -> Result<CardImage> {
    let qr = if summary.share_url().is_empty() {
        QrAsset::Unavailable
    } else {
        fetcher.fetch(summary.share_url(), ratio.qr_size() as u32).await
    };
    export_card(summary, ratio, labels, fonts, &qr)
}
