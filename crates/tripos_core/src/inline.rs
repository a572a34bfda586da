use std::sync::LazyLock;

use regex::Regex;

use crate::block::StyledRun;

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("Invalid line break regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("Invalid link regex"));
static STRIKETHROUGH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~~([^~]+)~~").expect("Invalid strikethrough regex"));
static HEADING_MARKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#{1,6}\s*").expect("Invalid heading regex"));
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*[-*+]\s*").expect("Invalid list marker regex"));
static NUMBER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\d+\.\s*").expect("Invalid number marker regex"));

/// One formatting rule of the pipeline, applied in declaration order.
#[derive(Clone, Copy)]
enum Rule {
    Bold,
    Italic,
    Code,
    Annotation,
}

const PIPELINE: [Rule; 4] = [Rule::Bold, Rule::Italic, Rule::Code, Rule::Annotation];

impl Rule {
    fn delimiters(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Rule::Bold => &[("**", "**"), ("__", "__")],
            Rule::Italic => &[("*", "*"), ("_", "_")],
            Rule::Code => &[("`", "`")],
            Rule::Annotation => &[("[", "]")],
        }
    }

    /// Annotations stay visible with their brackets; other delimiters are
    /// consumed.
    fn keeps_delimiters(self) -> bool {
        matches!(self, Rule::Annotation)
    }

    fn allows_empty(self) -> bool {
        matches!(self, Rule::Annotation)
    }
}

#[derive(Clone, Default)]
struct Piece {
    text: String,
    bold: bool,
    italic: bool,
    code: bool,
    annotated: bool,
}

impl Piece {
    fn mark(&mut self, rule: Rule) {
        match rule {
            Rule::Bold => self.bold = true,
            Rule::Italic => self.italic = true,
            Rule::Code => self.code = true,
            Rule::Annotation => self.annotated = true,
        }
    }
}

/// Convert one line (or table cell) into styled runs.
///
/// Rules resolve by strict precedence: bold, then italic over what bold left,
/// then inline code, then `[annotation]` spans. Each rule only sees the text
/// of pieces produced so far, so a later rule can never pair delimiters across
/// an earlier match. `<br>` tags become explicit line breaks.
pub fn format(line: &str) -> Vec<StyledRun> {
    let mut runs = Vec::new();

    for (index, segment) in LINE_BREAK.split(line).enumerate() {
        if index > 0 {
            runs.push(StyledRun::LineBreak);
        }

        let mut pieces = vec![Piece {
            text: segment.to_string(),
            ..Piece::default()
        }];
        for rule in PIPELINE {
            pieces = pieces
                .into_iter()
                .flat_map(|piece| apply_rule(piece, rule))
                .collect();
        }

        runs.extend(pieces.into_iter().filter(|p| !p.text.is_empty()).map(|p| {
            StyledRun::Text {
                text: p.text,
                bold: p.bold,
                italic: p.italic,
                code: p.code,
                annotated: p.annotated,
            }
        }));
    }

    runs
}

fn apply_rule(piece: Piece, rule: Rule) -> Vec<Piece> {
    split_delimited(&piece.text, rule)
        .into_iter()
        .map(|(text, matched)| {
            let mut out = Piece {
                text,
                ..piece.clone()
            };
            if matched {
                out.mark(rule);
            }
            out
        })
        .collect()
}

/// Split `text` into `(fragment, matched)` pairs with a single left-to-right
/// pass, pairing each opening delimiter with the nearest closing one.
fn split_delimited(text: &str, rule: Rule) -> Vec<(String, bool)> {
    let mut out = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    'scan: while i < text.len() {
        for (open, close) in rule.delimiters() {
            if !text[i..].starts_with(open) {
                continue;
            }
            let start = i + open.len();
            let Some(len) = text[start..].find(close) else {
                continue;
            };
            if len == 0 && !rule.allows_empty() {
                continue;
            }

            if !plain.is_empty() {
                out.push((std::mem::take(&mut plain), false));
            }
            let inner = &text[start..start + len];
            let fragment = if rule.keeps_delimiters() {
                format!("{open}{inner}{close}")
            } else {
                inner.to_string()
            };
            out.push((fragment, true));
            i = start + len + close.len();
            continue 'scan;
        }

        let Some(ch) = text[i..].chars().next() else {
            break;
        };
        plain.push(ch);
        i += ch.len_utf8();
    }

    if !plain.is_empty() {
        out.push((plain, false));
    }
    out
}

/// Visible text of a line with all styling stripped; line breaks become
/// spaces.
pub fn plain_text(line: &str) -> String {
    format(line)
        .iter()
        .map(|run| match run {
            StyledRun::LineBreak => " ",
            run => run.text(),
        })
        .collect()
}

/// Strip markdown syntax from a short fragment for display on the share card.
pub fn clean_markdown(text: &str) -> String {
    let text = LINK.replace_all(text, "$1");
    let text = plain_text(&text);
    let text = STRIKETHROUGH.replace_all(&text, "$1");
    let text = HEADING_MARKS.replace_all(&text, "");
    let text = LIST_MARKER.replace_all(&text, "");
    let text = NUMBER_MARKER.replace_all(&text, "");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(text: &str, bold: bool, italic: bool, code: bool, annotated: bool) -> StyledRun {
        StyledRun::Text {
            text: text.to_string(),
            bold,
            italic,
            code,
            annotated,
        }
    }

    fn visible(runs: &[StyledRun]) -> String {
        runs.iter().map(StyledRun::text).collect()
    }

    #[test]
    fn bold_and_italic_stay_independent() {
        assert_eq!(
            format("**a** *b*"),
            vec![
                run("a", true, false, false, false),
                StyledRun::plain(" "),
                run("b", false, true, false, false),
            ]
        );
    }

    #[test]
    fn underscore_delimiters() {
        assert_eq!(
            format("__bold__ and _it_"),
            vec![
                run("bold", true, false, false, false),
                StyledRun::plain(" and "),
                run("it", false, true, false, false),
            ]
        );
    }

    #[test]
    fn italic_inside_bold_is_nested() {
        assert_eq!(
            format("**see *this* now**"),
            vec![
                run("see ", true, false, false, false),
                run("this", true, true, false, false),
                run(" now", true, false, false, false),
            ]
        );
    }

    #[test]
    fn inline_code() {
        assert_eq!(
            format("Take `Line 3` north"),
            vec![
                StyledRun::plain("Take "),
                run("Line 3", false, false, true, false),
                StyledRun::plain(" north"),
            ]
        );
    }

    #[test]
    fn annotation_keeps_brackets() {
        assert_eq!(
            format("Lunch [Booked] at noon"),
            vec![
                StyledRun::plain("Lunch "),
                run("[Booked]", false, false, false, true),
                StyledRun::plain(" at noon"),
            ]
        );
    }

    #[test]
    fn annotation_is_not_a_link() {
        let runs = format("[Map](https://example.com)");
        assert_eq!(runs[0], run("[Map]", false, false, false, true));
        assert_eq!(visible(&runs), "[Map](https://example.com)");
    }

    #[test]
    fn line_breaks() {
        assert_eq!(
            format("Morning<br>Afternoon<BR />Evening"),
            vec![
                StyledRun::plain("Morning"),
                StyledRun::LineBreak,
                StyledRun::plain("Afternoon"),
                StyledRun::LineBreak,
                StyledRun::plain("Evening"),
            ]
        );
    }

    #[test]
    fn unmatched_delimiters_stay_literal() {
        assert_eq!(format("5 * 3 = 15"), vec![StyledRun::plain("5 * 3 = 15")]);
        assert_eq!(format("**open"), vec![StyledRun::plain("**open")]);
    }

    #[test]
    fn markup_characters_are_plain_text() {
        let runs = format("<script>alert(1)</script>");
        assert_eq!(runs, vec![StyledRun::plain("<script>alert(1)</script>")]);
    }

    #[test]
    fn multibyte_text() {
        assert_eq!(
            format("**東京**タワー"),
            vec![
                run("東京", true, false, false, false),
                StyledRun::plain("タワー"),
            ]
        );
    }

    #[test]
    fn plain_text_strips_styling() {
        assert_eq!(plain_text("**Senso-ji** at `6am`<br>[Free]"), "Senso-ji at 6am [Free]");
    }

    #[test]
    fn clean_markdown_fragments() {
        assert_eq!(clean_markdown("- **Shibuya** crossing"), "Shibuya crossing");
        assert_eq!(clean_markdown("### Day trip"), "Day trip");
        assert_eq!(clean_markdown("2. ~~Skip~~ Visit"), "Skip Visit");
        assert_eq!(clean_markdown("[Louvre](https://louvre.fr)"), "Louvre");
        assert_eq!(clean_markdown("   "), "");
    }
}
