//! Display list for one share card.
//!
//! A [`Scene`] is built fresh for every export and owned by that export until
//! it is rasterized, so no two exports ever draw into the same surface.

use super::text::{TextMeasure, TextStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::hex(0xffffff);

    pub const fn hex(rgb: u32) -> Self {
        Color {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
            a: 255,
        }
    }

    /// Same color at `alpha` opacity (0.0 to 1.0).
    pub fn alpha(self, alpha: f64) -> Self {
        Color {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub offset_y: f64,
    pub blur: f64,
    pub color: Color,
}

/// Drawing primitives in pixel coordinates, origin top-left.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Diagonal linear gradient filling the whole canvas.
    Gradient { stops: [Color; 3] },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        width: f64,
        color: Color,
    },
    Circle {
        cx: f64,
        cy: f64,
        radius: f64,
        fill: Color,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        fill: Color,
        shadow: Option<Shadow>,
    },
    /// Left-aligned text; `baseline` is the y of the alphabetic baseline.
    Text {
        x: f64,
        baseline: f64,
        text: String,
        style: TextStyle,
        fill: Color,
    },
    /// The QR raster, drawn as a `size`×`size` square.
    QrImage { x: f64, y: f64, size: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub shapes: Vec<Shape>,
}

impl Scene {
    pub fn new(width: u32, height: u32) -> Self {
        Scene {
            width,
            height,
            shapes: Vec::new(),
        }
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, radius: f64, fill: Color) {
        self.push(Shape::Rect {
            x,
            y,
            width,
            height,
            radius,
            fill,
            shadow: None,
        });
    }

    pub fn text(&mut self, x: f64, baseline: f64, text: impl Into<String>, style: TextStyle, fill: Color) {
        self.push(Shape::Text {
            x,
            baseline,
            text: text.into(),
            style,
            fill,
        });
    }

    /// Text horizontally centered on `center_x`.
    pub fn centered_text<M: TextMeasure + ?Sized>(
        &mut self,
        center_x: f64,
        baseline: f64,
        text: &str,
        style: TextStyle,
        fill: Color,
        measure: &M,
    ) {
        let x = center_x - measure.width(text, style) / 2.0;
        self.text(x, baseline, text, style, fill);
    }

    /// Every text string in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().filter_map(|shape| match shape {
            Shape::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Every filled rectangle of the given color, in drawing order.
    pub fn rects_filled(&self, color: Color) -> impl Iterator<Item = &Shape> {
        self.shapes
            .iter()
            .filter(move |shape| matches!(shape, Shape::Rect { fill, .. } if *fill == color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_and_alpha() {
        let blue = Color::hex(0x3b82f6);
        assert_eq!((blue.r, blue.g, blue.b, blue.a), (0x3b, 0x82, 0xf6, 255));
        assert_eq!(blue.alpha(0.1).a, 26);
        assert_eq!(blue.alpha(2.0).a, 255);
    }
}
