/// Size and weight of a piece of card text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub bold: bool,
}

impl TextStyle {
    pub const fn regular(size: f64) -> Self {
        TextStyle { size, bold: false }
    }

    pub const fn bold(size: f64) -> Self {
        TextStyle { size, bold: true }
    }
}

/// Horizontal advance of a string, in pixels.
///
/// Implementations must be pure and must agree with the fonts the card is
/// finally drawn with.
pub trait TextMeasure {
    fn width(&self, text: &str, style: TextStyle) -> f64;
}

/// Break `text` into at most `max_lines` lines, character by character.
///
/// A line takes characters until the next one would push it past
/// `max_width`. Whatever does not fit into the last line is dropped.
pub fn wrap_chars<M: TextMeasure + ?Sized>(
    measure: &M,
    text: &str,
    max_width: f64,
    style: TextStyle,
    max_lines: usize,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        let mut candidate = current.clone();
        candidate.push(c);
        if measure.width(&candidate, style) > max_width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            if lines.len() == max_lines {
                return lines;
            }
            current.push(c);
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() && lines.len() < max_lines {
        lines.push(current);
    }
    lines
}

/// Longest prefix of `text` that fits `max_width` with `...` appended.
///
/// Text that already fits is returned unchanged.
pub fn truncate_to_width<M: TextMeasure + ?Sized>(
    measure: &M,
    text: &str,
    max_width: f64,
    style: TextStyle,
) -> String {
    if measure.width(text, style) <= max_width {
        return text.to_string();
    }

    let mut prefix = text.to_string();
    while prefix.pop().is_some() {
        let candidate = format!("{prefix}...");
        if measure.width(&candidate, style) <= max_width {
            return candidate;
        }
    }
    "...".to_string()
}

/// Every character is `size / 2` wide. Used by layout tests.
#[cfg(test)]
pub(crate) struct Monospace;

#[cfg(test)]
impl TextMeasure for Monospace {
    fn width(&self, text: &str, style: TextStyle) -> f64 {
        text.chars().count() as f64 * style.size / 2.0
    }
}
