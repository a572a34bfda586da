use serde::Serialize;

/// A styled fragment of one line of text.
///
/// Runs are produced by [`crate::inline::format`]; concatenating the visible
/// text of every run reconstructs the line with its delimiters removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StyledRun {
    Text {
        text: String,
        bold: bool,
        italic: bool,
        code: bool,
        annotated: bool,
    },
    LineBreak,
}

impl StyledRun {
    /// Unstyled text run.
    pub fn plain(text: impl Into<String>) -> Self {
        StyledRun::Text {
            text: text.into(),
            bold: false,
            italic: false,
            code: false,
            annotated: false,
        }
    }

    /// Visible text of the run; a line break is `"\n"`.
    pub fn text(&self) -> &str {
        match self {
            StyledRun::Text { text, .. } => text,
            StyledRun::LineBreak => "\n",
        }
    }
}

/// Block-level elements parsed from an itinerary document.
///
/// Block text is kept raw; inline formatting is applied at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
    },
    ListItem {
        text: String,
        ordered: bool,
    },
    CheckboxItem {
        text: String,
        checked: bool,
    },
    Blockquote {
        text: String,
    },
    /// Rows may be ragged: a row's cell count need not match the header.
    Table {
        header: Vec<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        alignments: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}
