//! Top-to-bottom placement of every card element.

use super::AspectRatio;
use super::emoji::destination_emoji;
use super::scene::{Color, Scene, Shadow, Shape};
use super::text::{TextMeasure, TextStyle, truncate_to_width, wrap_chars};
use crate::config::CardLabels;
use crate::highlights::MAX_HIGHLIGHTS;
use crate::inline::clean_markdown;
use crate::summary::{Pace, TripSummary};

const CARD_MARGIN: f64 = 40.0;
const PADDING: f64 = 60.0;
const CARD_RADIUS: f64 = 40.0;
const GRID_STEP: f64 = 40.0;

const TITLE_MAX_LINES: usize = 2;
const TITLE_LINE_STEP: f64 = 85.0;

const BADGE_WIDTH: f64 = 200.0;
const BADGE_HEIGHT: f64 = 60.0;

const TILE_GAP: f64 = 20.0;
const TILE_HEIGHT: f64 = 100.0;

const CHIP_HEIGHT: f64 = 50.0;
const CHIP_PADDING: f64 = 24.0;
const CHIP_GAP: f64 = 16.0;
const MAX_CHIP_CHARS: usize = 50;

const QR_TILE_INSET: f64 = 20.0;

const NAVY: Color = Color::hex(0x0f172a);
const SLATE_800: Color = Color::hex(0x1e293b);
const BLUE: Color = Color::hex(0x3b82f6);
const SLATE_700: Color = Color::hex(0x334155);
const SLATE_500: Color = Color::hex(0x64748b);
const SLATE_400: Color = Color::hex(0x94a3b8);
const SLATE_200: Color = Color::hex(0xe2e8f0);
const SLATE_100: Color = Color::hex(0xf1f5f9);
const SKY_100: Color = Color::hex(0xe0f2fe);
const SKY_700: Color = Color::hex(0x0369a1);

/// Where the QR raster goes; also where the placeholder is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QrSlot {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

/// Lay out a card for `summary`.
///
/// `qr_available` selects between the QR image and the `QR Code`
/// placeholder. The result is a fresh scene owned by the caller.
pub fn layout<M: TextMeasure + ?Sized>(
    summary: &TripSummary,
    ratio: AspectRatio,
    labels: &CardLabels,
    qr_available: bool,
    measure: &M,
) -> Scene {
    let (width, height) = ratio.dimensions();
    let mut scene = Scene::new(width, height);
    let (w, h) = (width as f64, height as f64);

    draw_background(&mut scene, w, h);

    let card_width = w - CARD_MARGIN * 2.0;
    let card_height = h - CARD_MARGIN * 2.0;
    scene.push(Shape::Rect {
        x: CARD_MARGIN,
        y: CARD_MARGIN,
        width: card_width,
        height: card_height,
        radius: CARD_RADIUS,
        fill: Color::WHITE.alpha(0.95),
        shadow: Some(Shadow {
            offset_y: 10.0,
            blur: 40.0,
            color: Color::hex(0x000000).alpha(0.3),
        }),
    });

    let content_x = CARD_MARGIN + PADDING;
    let content_width = card_width - PADDING * 2.0;
    let mut y = CARD_MARGIN + PADDING;

    // Branding
    let brand_style = TextStyle::bold(28.0);
    scene.text(content_x, y, &labels.brand, brand_style, SLATE_500);
    let subtitle_x = content_x + measure.width(&labels.brand, brand_style);
    scene.text(
        subtitle_x,
        y,
        format!(" • {}", labels.subtitle),
        TextStyle::regular(24.0),
        SLATE_400,
    );
    y += 80.0;

    // Title
    let title_style = TextStyle::bold(72.0);
    let title = format!("{} {}", destination_emoji(summary.destination()), summary.destination());
    for line in wrap_chars(measure, &title, content_width, title_style, TITLE_MAX_LINES) {
        scene.text(content_x, y, line, title_style, NAVY);
        y += TITLE_LINE_STEP;
    }
    y += 20.0;

    if !summary.duration_label().is_empty() {
        scene.rect(content_x, y, BADGE_WIDTH, BADGE_HEIGHT, BADGE_HEIGHT / 2.0, BLUE);
        scene.centered_text(
            content_x + BADGE_WIDTH / 2.0,
            y + 42.0,
            &format!("📅 {}", summary.duration_label()),
            TextStyle::bold(32.0),
            Color::WHITE,
            measure,
        );
        y += 100.0;
    }

    y = draw_info_tiles(&mut scene, summary, content_x, content_width, y, measure);
    draw_highlights(&mut scene, summary, labels, content_x, content_width, y, measure);

    let slot = qr_slot(ratio);
    draw_qr_block(&mut scene, slot, qr_available, measure);

    let center_x = w / 2.0;
    scene.centered_text(
        center_x,
        slot.y + slot.size + 50.0,
        &labels.scan_to_view,
        TextStyle::regular(24.0),
        SLATE_500,
        measure,
    );
    scene.centered_text(
        center_x,
        CARD_MARGIN + card_height - 40.0,
        &labels.powered_by,
        TextStyle::regular(22.0),
        SLATE_400,
        measure,
    );

    scene
}

/// QR position, anchored to the card's bottom edge.
pub fn qr_slot(ratio: AspectRatio) -> QrSlot {
    let (width, height) = ratio.dimensions();
    let size = ratio.qr_size();
    let card_bottom = height as f64 - CARD_MARGIN;
    QrSlot {
        x: (width as f64 - size) / 2.0,
        y: card_bottom - PADDING - size - ratio.qr_lift(),
        size,
    }
}

fn draw_background(scene: &mut Scene, w: f64, h: f64) {
    scene.push(Shape::Gradient {
        stops: [NAVY, SLATE_800, NAVY],
    });

    let grid = BLUE.alpha(0.1);
    let mut x = 0.0;
    while x < w {
        scene.push(Shape::Line {
            from: (x, 0.0),
            to: (x, h),
            width: 1.0,
            color: grid,
        });
        x += GRID_STEP;
    }
    let mut y = 0.0;
    while y < h {
        scene.push(Shape::Line {
            from: (0.0, y),
            to: (w, y),
            width: 1.0,
            color: grid,
        });
        y += GRID_STEP;
    }

    let glow = BLUE.alpha(0.05);
    scene.push(Shape::Circle {
        cx: w * 0.8,
        cy: h * 0.2,
        radius: 300.0,
        fill: glow,
    });
    scene.push(Shape::Circle {
        cx: w * 0.2,
        cy: h * 0.8,
        radius: 250.0,
        fill: glow,
    });
}

fn draw_info_tiles<M: TextMeasure + ?Sized>(
    scene: &mut Scene,
    summary: &TripSummary,
    content_x: f64,
    content_width: f64,
    y: f64,
    measure: &M,
) -> f64 {
    let pace_icon = Pace::from_label(summary.pace_label())
        .unwrap_or(Pace::Moderate)
        .icon();
    let tiles: Vec<(&str, &str)> = [
        ("👥", summary.travelers()),
        ("💰", summary.budget()),
        (pace_icon, summary.pace_label()),
    ]
    .into_iter()
    .filter(|(_, label)| !label.is_empty())
    .collect();

    if tiles.is_empty() {
        return y;
    }

    let tile_width = content_width / tiles.len() as f64 - TILE_GAP;
    let label_style = TextStyle::regular(28.0);
    for (index, (icon, label)) in tiles.into_iter().enumerate() {
        let x = content_x + (tile_width + TILE_GAP) * index as f64;
        scene.rect(x, y, tile_width, TILE_HEIGHT, 20.0, SLATE_100);
        scene.text(x + 20.0, y + 55.0, icon, TextStyle::regular(40.0), SLATE_700);
        let label = truncate_to_width(measure, label, tile_width - 80.0, label_style);
        scene.text(x + 70.0, y + 60.0, label, label_style, SLATE_700);
    }
    y + 140.0
}

fn draw_highlights<M: TextMeasure + ?Sized>(
    scene: &mut Scene,
    summary: &TripSummary,
    labels: &CardLabels,
    content_x: f64,
    content_width: f64,
    y: f64,
    measure: &M,
) {
    let highlights: Vec<String> = summary
        .highlights()
        .iter()
        .map(|h| clean_markdown(h))
        .filter(|h| !h.is_empty() && h.chars().count() < MAX_CHIP_CHARS)
        .take(MAX_HIGHLIGHTS)
        .collect();

    if highlights.is_empty() {
        return;
    }

    scene.text(
        content_x,
        y,
        format!("✨ {}", labels.highlights),
        TextStyle::bold(28.0),
        SLATE_500,
    );

    let chip_style = TextStyle::regular(26.0);
    let right = content_x + content_width;
    let mut chip_x = content_x;
    let mut chip_y = y + 50.0;

    for highlight in highlights {
        let chip_width = measure.width(&highlight, chip_style) + CHIP_PADDING * 2.0;
        if chip_x + chip_width > right && chip_x > content_x {
            chip_x = content_x;
            chip_y += CHIP_HEIGHT + CHIP_GAP;
        }
        scene.rect(chip_x, chip_y, chip_width, CHIP_HEIGHT, CHIP_HEIGHT / 2.0, SKY_100);
        scene.text(chip_x + CHIP_PADDING, chip_y + 34.0, highlight, chip_style, SKY_700);
        chip_x += chip_width + CHIP_GAP;
    }
}

fn draw_qr_block<M: TextMeasure + ?Sized>(
    scene: &mut Scene,
    slot: QrSlot,
    qr_available: bool,
    measure: &M,
) {
    scene.push(Shape::Rect {
        x: slot.x - QR_TILE_INSET,
        y: slot.y - QR_TILE_INSET,
        width: slot.size + QR_TILE_INSET * 2.0,
        height: slot.size + QR_TILE_INSET * 2.0,
        radius: 20.0,
        fill: Color::WHITE,
        shadow: Some(Shadow {
            offset_y: 0.0,
            blur: 20.0,
            color: Color::hex(0x000000).alpha(0.1),
        }),
    });

    if qr_available {
        scene.push(Shape::QrImage {
            x: slot.x,
            y: slot.y,
            size: slot.size,
        });
    } else {
        scene.rect(slot.x, slot.y, slot.size, slot.size, 0.0, SLATE_200);
        scene.centered_text(
            slot.x + slot.size / 2.0,
            slot.y + slot.size / 2.0,
            "QR Code",
            TextStyle::regular(24.0),
            SLATE_400,
            measure,
        );
    }
}
