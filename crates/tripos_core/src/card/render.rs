use std::fmt::Write;
use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use tracing::debug;
use typst_as_lib::TypstEngine;
use typst_library::layout::PagedDocument;

use super::font::FontBook;
use super::scene::{Color, Scene, Shadow, Shape};
use super::text::TextStyle;
use crate::error::{Error, Result};
use crate::qr::QrAsset;

const QR_FILE: &str = "qr.png";
const SHADOW_LAYERS: u32 = 4;

/// Rasterize a scene to PNG bytes.
///
/// Every call compiles with its own engine and page, so concurrent exports
/// never share a drawing surface.
pub fn render_png(scene: &Scene, fonts: &FontBook, qr: &QrAsset) -> Result<Vec<u8>> {
    let markup = scene_to_typst(scene, fonts.family());
    let files: Vec<(&str, Vec<u8>)> = qr.png().map(|png| (QR_FILE, png.to_vec())).into_iter().collect();

    let doc = compile_page(markup, fonts, files)?;

    let page = doc
        .pages
        .first()
        .ok_or_else(|| Error::Compile("card produced no page".to_string()))?;
    let pixmap = typst_render::render(page, 1.0);
    debug!(width = pixmap.width(), height = pixmap.height(), "rasterized card");

    // The page fill is opaque, so premultiplied pixels equal straight RGBA.
    let raster = RgbaImage::from_raw(pixmap.width(), pixmap.height(), pixmap.data().to_vec())
        .ok_or_else(|| Error::Compile("raster size mismatch".to_string()))?;

    let mut png = Cursor::new(Vec::new());
    raster.write_to(&mut png, ImageFormat::Png)?;
    Ok(png.into_inner())
}

/// Compile single-page markup against exactly the fonts in `fonts`.
pub(super) fn compile_page(
    markup: String,
    fonts: &FontBook,
    files: Vec<(&str, Vec<u8>)>,
) -> Result<PagedDocument> {
    let engine = TypstEngine::builder()
        .main_file(markup)
        .fonts(fonts.fonts().iter().cloned())
        .with_static_file_resolver(files)
        .build();

    engine
        .compile()
        .output
        .map_err(|e| Error::Compile(format!("{:?}", e)))
}

/// `#set text(..)` rule every card document starts with.
pub(super) fn text_defaults(family: &str) -> String {
    format!(
        "#set text(font: \"{}\", top-edge: \"baseline\", bottom-edge: \"baseline\")",
        escape_str(family)
    )
}

/// `text(..)` call for one run of card text. Spaces become no-break spaces so
/// Typst neither trims nor wraps them.
pub(super) fn text_call(text: &str, style: TextStyle, fill: Option<Color>) -> String {
    let weight = if style.bold { "bold" } else { "regular" };
    let fill = fill.map(|c| format!(", fill: {}", rgb(c))).unwrap_or_default();
    format!(
        "text(size: {}, weight: \"{}\"{}, \"{}\")",
        pt(style.size),
        weight,
        fill,
        escape_str(&text.replace(' ', "\u{a0}"))
    )
}

/// Typst markup drawing `scene` with absolute placement, one point per pixel.
pub fn scene_to_typst(scene: &Scene, family: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "#set page(width: {}pt, height: {}pt, margin: 0pt)",
        scene.width, scene.height
    );
    let _ = writeln!(out, "{}", text_defaults(family));

    for shape in &scene.shapes {
        write_shape(&mut out, shape, scene);
    }
    out
}

fn write_shape(out: &mut String, shape: &Shape, scene: &Scene) {
    match shape {
        Shape::Gradient { stops } => {
            let angle = (scene.height as f64).atan2(scene.width as f64).to_degrees();
            let _ = writeln!(
                out,
                "#place(top + left, rect(width: 100%, height: 100%, fill: gradient.linear({}, {}, {}, angle: {:.2}deg)))",
                rgb(stops[0]),
                rgb(stops[1]),
                rgb(stops[2]),
                angle
            );
        }
        Shape::Line { from, to, width, color } => {
            let _ = writeln!(
                out,
                "#place(top + left, line(start: ({}, {}), end: ({}, {}), stroke: {} + {}))",
                pt(from.0),
                pt(from.1),
                pt(to.0),
                pt(to.1),
                pt(*width),
                rgb(*color)
            );
        }
        Shape::Circle { cx, cy, radius, fill } => {
            let _ = writeln!(
                out,
                "#place(top + left, dx: {}, dy: {}, circle(radius: {}, fill: {}))",
                pt(cx - radius),
                pt(cy - radius),
                pt(*radius),
                rgb(*fill)
            );
        }
        Shape::Rect {
            x,
            y,
            width,
            height,
            radius,
            fill,
            shadow,
        } => {
            if let Some(shadow) = shadow {
                write_shadow(out, *x, *y, *width, *height, *radius, shadow);
            }
            write_rect(out, *x, *y, *width, *height, *radius, *fill);
        }
        Shape::Text {
            x,
            baseline,
            text,
            style,
            fill,
        } => {
            let _ = writeln!(
                out,
                "#place(top + left, dx: {}, dy: {}, {})",
                pt(*x),
                pt(*baseline),
                text_call(text, *style, Some(*fill))
            );
        }
        Shape::QrImage { x, y, size } => {
            let _ = writeln!(
                out,
                "#place(top + left, dx: {}, dy: {}, image(\"{}\", width: {}, height: {}))",
                pt(*x),
                pt(*y),
                QR_FILE,
                pt(*size),
                pt(*size)
            );
        }
    }
}

fn write_rect(out: &mut String, x: f64, y: f64, width: f64, height: f64, radius: f64, fill: Color) {
    let _ = writeln!(
        out,
        "#place(top + left, dx: {}, dy: {}, rect(width: {}, height: {}, radius: {}, fill: {}))",
        pt(x),
        pt(y),
        pt(width),
        pt(height),
        pt(radius),
        rgb(fill)
    );
}

// Typst has no blur, so a shadow is a stack of widening translucent rects.
fn write_shadow(out: &mut String, x: f64, y: f64, width: f64, height: f64, radius: f64, shadow: &Shadow) {
    let layer_alpha = (shadow.color.a as u32 / SHADOW_LAYERS) as u8;
    for layer in (1..=SHADOW_LAYERS).rev() {
        let spread = shadow.blur / 2.0 * layer as f64 / SHADOW_LAYERS as f64;
        write_rect(
            out,
            x - spread,
            y - spread + shadow.offset_y,
            width + spread * 2.0,
            height + spread * 2.0,
            radius + spread,
            Color {
                a: layer_alpha,
                ..shadow.color
            },
        );
    }
}

fn pt(value: f64) -> String {
    format!("{:.2}pt", value)
}

fn rgb(color: Color) -> String {
    format!("rgb({}, {}, {}, {})", color.r, color.g, color.b, color.a)
}

fn escape_str(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
