use crate::block::{Block, StyledRun};
use crate::config::DocumentConfig;
use crate::inline;

/// Convert blocks to Typst markup
pub fn blocks_to_typst(blocks: &[Block], config: &DocumentConfig) -> String {
    let mut out = String::new();

    // Set up paragraph settings to prevent widows/orphans
    out.push_str("#set par(linebreaks: \"optimized\")\n");
    if let Some(font) = &config.font {
        out.push_str(&format!("#set text(font: \"{}\")\n", escape_str(font)));
    }
    if config.page_numbers {
        out.push_str("#set page(numbering: \"1\")\n");
    }
    out.push('\n');

    let mut i = 0;
    while i < blocks.len() {
        let block = &blocks[i];

        match block {
            Block::Heading { .. } => {
                // Keep heading with following content using a block that prevents breaks
                out.push_str("#block(breakable: false)[\n");
                emit_block(block, &mut out, config);

                if i + 1 < blocks.len() {
                    i += 1;
                    emit_block(&blocks[i], &mut out, config);
                    close_list(&blocks[i], blocks.get(i + 1), &mut out);
                }
                out.push_str("]\n\n");
            }
            _ => {
                emit_block(block, &mut out, config);
                close_list(block, blocks.get(i + 1), &mut out);
            }
        }

        i += 1;
    }

    out
}

fn emit_block(block: &Block, out: &mut String, config: &DocumentConfig) {
    match block {
        Block::Heading { level, text } => {
            for _ in 0..*level {
                out.push('=');
            }
            out.push(' ');
            inline_to_typst(text, out, config);
            out.push_str("\n\n");
        }
        Block::Paragraph { text } => {
            inline_to_typst(text, out, config);
            out.push_str("\n\n");
        }
        Block::ListItem { text, ordered } => {
            out.push_str(if *ordered { "+ " } else { "- " });
            inline_to_typst(text, out, config);
            out.push('\n');
        }
        Block::CheckboxItem { text, checked } => {
            if *checked {
                out.push_str("- ☑ #strike[");
                inline_to_typst(text, out, config);
                out.push_str("];\n");
            } else {
                out.push_str("- ☐ ");
                inline_to_typst(text, out, config);
                out.push('\n');
            }
        }
        Block::Blockquote { text } => {
            out.push_str("#quote(block: true)[");
            inline_to_typst(text, out, config);
            out.push_str("]\n\n");
        }
        Block::Table { header, rows, .. } => {
            // Keep tables together when possible
            out.push_str("#block(breakable: false)[\n");
            table_to_typst(header, rows, out, config);
            out.push_str("]\n\n");
        }
    }
}

/// A run of list items ends with a blank line.
fn close_list(block: &Block, next: Option<&Block>, out: &mut String) {
    let is_item = |b: &Block| matches!(b, Block::ListItem { .. } | Block::CheckboxItem { .. });
    if is_item(block) && !next.is_some_and(is_item) {
        out.push('\n');
    }
}

fn inline_to_typst(line: &str, out: &mut String, config: &DocumentConfig) {
    for run in inline::format(line) {
        run_to_typst(&run, out, config);
    }
}

fn run_to_typst(run: &StyledRun, out: &mut String, config: &DocumentConfig) {
    let StyledRun::Text {
        text,
        bold,
        italic,
        code,
        annotated,
    } = run
    else {
        out.push_str(" \\\n");
        return;
    };

    let mut body = if *code {
        format!("#raw(\"{}\");", escape_str(text))
    } else {
        escape_markup(text)
    };
    if *bold {
        body = format!("#strong[{body}];");
    }
    if *italic {
        body = format!("#emph[{body}];");
    }
    if *annotated {
        body = format!(
            "#text(fill: rgb(\"{}\"))[{body}];",
            escape_str(&config.annotation_color)
        );
    }
    out.push_str(&body);
}

/// Escape characters Typst would read as markup.
fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let leading_digits = text.chars().take_while(|c| c.is_ascii_digit()).count();
    for (i, ch) in text.chars().enumerate() {
        match ch {
            '#' | '*' | '_' | '@' | '$' | '\\' | '`' | '<' | '>' | '[' | ']' | '/' | '~' | '='
            | '-' | '+' => {
                out.push('\\');
                out.push(ch);
            }
            // "1." at the start of a line would become an enum item
            '.' if leading_digits > 0 && i == leading_digits => {
                out.push_str("\\.");
            }
            _ => out.push(ch),
        }
    }
    out
}

fn escape_str(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn table_to_typst(header: &[String], rows: &[Vec<String>], out: &mut String, config: &DocumentConfig) {
    let col_count = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);
    if col_count == 0 {
        return;
    }

    out.push_str("#table(\n");
    out.push_str(&format!("  columns: {},\n", col_count));

    // Header cells (bold)
    if !header.is_empty() {
        for i in 0..col_count {
            out.push_str("  [#strong[");
            if let Some(cell) = header.get(i) {
                inline_to_typst(cell, out, config);
            }
            out.push_str("];],\n");
        }
    }

    // Ragged rows are padded with empty cells
    for row in rows {
        for i in 0..col_count {
            out.push_str("  [");
            if let Some(cell) = row.get(i) {
                inline_to_typst(cell, out, config);
            }
            out.push_str("],\n");
        }
    }

    out.push_str(")\n");
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::markdown_to_typst;
    use crate::markdown_to_typst_with_config;
    use pretty_assertions::assert_eq;

    const PREAMBLE: &str = "#set par(linebreaks: \"optimized\")\n\n";

    #[test]
    fn heading() {
        assert_eq!(
            markdown_to_typst("## Hello"),
            format!("{PREAMBLE}#block(breakable: false)[\n== Hello\n\n]\n\n")
        );
    }

    #[test]
    fn heading_with_following_content() {
        // Heading should be grouped with following paragraph
        let result = markdown_to_typst("### Day 1\n\nSome text.");
        assert!(result.contains("#block(breakable: false)[\n=== Day 1\n\nSome text.\n\n]\n\n"));
    }

    #[test]
    fn paragraph() {
        assert_eq!(
            markdown_to_typst("Hello world"),
            format!("{PREAMBLE}Hello world\n\n")
        );
    }

    #[test]
    fn bold_and_italic() {
        assert_eq!(
            markdown_to_typst("**bold**"),
            format!("{PREAMBLE}#strong[bold];\n\n")
        );
        assert_eq!(
            markdown_to_typst("*italic*"),
            format!("{PREAMBLE}#emph[italic];\n\n")
        );
    }

    #[test]
    fn inline_code() {
        assert_eq!(
            markdown_to_typst("take `JR \"Nozomi\"`"),
            format!("{PREAMBLE}take #raw(\"JR \\\"Nozomi\\\"\");\n\n")
        );
    }

    #[test]
    fn annotation_uses_configured_color() {
        let mut config = Config::default();
        config.document.annotation_color = "#ff0000".to_string();
        assert_eq!(
            markdown_to_typst_with_config("Lunch [reserve ahead]", &config),
            format!("{PREAMBLE}Lunch #text(fill: rgb(\"#ff0000\"))[\\[reserve ahead\\]];\n\n")
        );
    }

    #[test]
    fn unordered_list() {
        assert_eq!(
            markdown_to_typst("- one\n- two"),
            format!("{PREAMBLE}- one\n- two\n\n")
        );
    }

    #[test]
    fn ordered_list() {
        assert_eq!(
            markdown_to_typst("1. one\n2. two"),
            format!("{PREAMBLE}+ one\n+ two\n\n")
        );
    }

    #[test]
    fn checkboxes() {
        assert_eq!(
            markdown_to_typst("- [ ] Passport\n- [x] Visa"),
            format!("{PREAMBLE}- ☐ Passport\n- ☑ #strike[Visa];\n\n")
        );
    }

    #[test]
    fn blockquote() {
        assert_eq!(
            markdown_to_typst("> Bring cash"),
            format!("{PREAMBLE}#quote(block: true)[Bring cash]\n\n")
        );
    }

    #[test]
    fn hard_break() {
        assert_eq!(
            markdown_to_typst("line one<br>line two"),
            format!("{PREAMBLE}line one \\\nline two\n\n")
        );
    }

    #[test]
    fn escapes_special_chars() {
        assert_eq!(markdown_to_typst("a # b"), format!("{PREAMBLE}a \\# b\n\n"));
        assert_eq!(markdown_to_typst("a @b"), format!("{PREAMBLE}a \\@b\n\n"));
        assert_eq!(
            markdown_to_typst("09:00 - 10:30"),
            format!("{PREAMBLE}09:00 \\- 10:30\n\n")
        );
        assert_eq!(markdown_to_typst("https://x"), format!("{PREAMBLE}https:\\/\\/x\n\n"));
    }

    #[test]
    fn table() {
        let md = "| A | B |\n|---|---|\n| 1 | 2 |";
        let expected = format!(
            "{PREAMBLE}#block(breakable: false)[\n#table(\n  columns: 2,\n  [#strong[A];],\n  [#strong[B];],\n  [1],\n  [2],\n)\n]\n\n"
        );
        assert_eq!(markdown_to_typst(md), expected);
    }

    #[test]
    fn ragged_table_is_padded() {
        let md = "| Time | Place |\n|---|---|\n| 9am |\n| 1pm | Gion | extra |";
        let out = markdown_to_typst(md);
        assert!(out.contains("  columns: 3,\n"));
        assert!(out.contains("  [#strong[Place];],\n  [#strong[];],\n"));
        assert!(out.contains("  [9am],\n  [],\n  [],\n"));
    }

    #[test]
    fn preamble_follows_config() {
        let mut config = Config::default();
        config.document.font = Some("Libertinus Serif".to_string());
        config.document.page_numbers = true;
        let out = markdown_to_typst_with_config("x", &config);
        assert!(out.starts_with(
            "#set par(linebreaks: \"optimized\")\n#set text(font: \"Libertinus Serif\")\n#set page(numbering: \"1\")\n\n"
        ));
    }
}
