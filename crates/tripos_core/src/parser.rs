use tracing::debug;

use crate::block::Block;

/// Parse an itinerary document into a list of blocks.
///
/// Never fails: every line either becomes a block or, when blank, is skipped.
pub fn parse(markdown: &str) -> Vec<Block> {
    let lines: Vec<&str> = markdown.split('\n').collect();
    let mut blocks = Vec::new();
    let mut state = ParseState::default();

    for (index, line) in lines.iter().enumerate() {
        let next = lines.get(index + 1).copied();
        process_line(line, next, &mut state, &mut blocks);
    }

    debug!(lines = lines.len(), blocks = blocks.len(), "parsed itinerary");
    blocks
}

#[derive(Default)]
struct ParseState {
    in_table: bool,
    table_header: Vec<String>,
    table_alignments: Vec<String>,
    table_rows: Vec<Vec<String>>,
}

impl ParseState {
    fn take_table(&mut self) -> Block {
        self.in_table = false;
        Block::Table {
            header: std::mem::take(&mut self.table_header),
            alignments: std::mem::take(&mut self.table_alignments),
            rows: std::mem::take(&mut self.table_rows),
        }
    }
}

fn process_line(line: &str, next: Option<&str>, state: &mut ParseState, blocks: &mut Vec<Block>) {
    let trimmed = line.trim();

    if trimmed.starts_with('|') {
        process_table_line(trimmed, state);

        // A table spans pipe lines greedily; the first non-pipe line (or the
        // end of input) closes it.
        let continues = next.is_some_and(|n| n.trim().starts_with('|'));
        if !continues {
            blocks.push(state.take_table());
        }
        return;
    }

    if let Some(block) = classify_line(trimmed) {
        blocks.push(block);
    }
}

fn process_table_line(trimmed: &str, state: &mut ParseState) {
    let cells = split_cells(trimmed);
    if !state.in_table {
        state.in_table = true;
        state.table_header = cells;
        state.table_alignments.clear();
        state.table_rows.clear();
    } else if trimmed.contains("---") {
        state.table_alignments = cells;
    } else {
        state.table_rows.push(cells);
    }
}

/// Split a pipe row into trimmed cells, dropping the empty cells produced by
/// the boundary pipes.
fn split_cells(trimmed: &str) -> Vec<String> {
    let mut parts: Vec<&str> = trimmed.split('|').collect();
    if trimmed.starts_with('|') && !parts.is_empty() {
        parts.remove(0);
    }
    if trimmed.ends_with('|') && !parts.is_empty() {
        parts.pop();
    }
    parts.into_iter().map(|cell| cell.trim().to_string()).collect()
}

/// Classify a non-table line. Longer heading prefixes are tested first so
/// `#### x` is never read as a level-2 heading.
fn classify_line(trimmed: &str) -> Option<Block> {
    if trimmed.is_empty() {
        return None;
    }

    for (prefix, level) in [("#### ", 4), ("### ", 3), ("## ", 2)] {
        if let Some(text) = trimmed.strip_prefix(prefix) {
            return Some(Block::Heading {
                level,
                text: text.trim().to_string(),
            });
        }
    }

    if let Some(content) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        return Some(list_item(content));
    }

    if let Some(text) = ordered_item_text(trimmed) {
        return Some(Block::ListItem {
            text: text.trim().to_string(),
            ordered: true,
        });
    }

    if let Some(text) = trimmed.strip_prefix("> ") {
        return Some(Block::Blockquote {
            text: text.to_string(),
        });
    }

    Some(Block::Paragraph {
        text: trimmed.to_string(),
    })
}

fn list_item(content: &str) -> Block {
    if let Some(rest) = content.strip_prefix("[ ]") {
        return Block::CheckboxItem {
            text: rest.trim().to_string(),
            checked: false,
        };
    }
    if let Some(rest) = content.strip_prefix("[x]") {
        return Block::CheckboxItem {
            text: rest.trim().to_string(),
            checked: true,
        };
    }
    Block::ListItem {
        text: content.to_string(),
        ordered: false,
    }
}

/// Text after the first `.` when the line starts with `\d+\.`.
fn ordered_item_text(trimmed: &str) -> Option<&str> {
    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    trimmed[digits..].strip_prefix('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn heading(level: u8, text: &str) -> Block {
        Block::Heading {
            level,
            text: text.to_string(),
        }
    }

    fn paragraph(text: &str) -> Block {
        Block::Paragraph {
            text: text.to_string(),
        }
    }

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn day_heading_with_table() {
        let md = "## Day 1\n| Time | Activity |\n|---|---|\n| 9am | Museum |\n";
        assert_eq!(
            parse(md),
            vec![
                heading(2, "Day 1"),
                Block::Table {
                    header: cells(&["Time", "Activity"]),
                    alignments: cells(&["---", "---"]),
                    rows: vec![cells(&["9am", "Museum"])],
                },
            ]
        );
    }

    #[rstest]
    #[case("## Two", Some(2))]
    #[case("### Three", Some(3))]
    #[case("#### Four", Some(4))]
    #[case("# One", None)]
    #[case("##### Five", None)]
    #[case("###### Six", None)]
    fn heading_levels(#[case] line: &str, #[case] level: Option<u8>) {
        let blocks = parse(line);
        match level {
            Some(level) => {
                let text = line.trim_start_matches('#').trim();
                assert_eq!(blocks, vec![heading(level, text)]);
            }
            None => assert_eq!(blocks, vec![paragraph(line)]),
        }
    }

    #[test]
    fn table_row_count_matches_data_rows() {
        let md = "| A | B | C |\n| --- | --- | --- |\n| 1 | 2 | 3 |\n| 4 | 5 | 6 |\n| 7 | 8 | 9 |";
        let blocks = parse(md);
        assert_eq!(blocks.len(), 1);
        let Block::Table { header, rows, .. } = &blocks[0] else {
            panic!("expected a table, got {:?}", blocks[0]);
        };
        assert_eq!(header.len(), 3);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], cells(&["1", "2", "3"]));
        assert_eq!(rows[2], cells(&["7", "8", "9"]));
    }

    #[test]
    fn ragged_rows_are_kept_as_is() {
        let md = "| A | B |\n|---|---|\n| only |\n| 1 | 2 | 3 |";
        let Block::Table { rows, .. } = &parse(md)[0] else {
            panic!("expected a table");
        };
        assert_eq!(rows, &vec![cells(&["only"]), cells(&["1", "2", "3"])]);
    }

    #[test]
    fn table_closes_on_non_pipe_line() {
        let md = "| A |\n| 1 |\nAfter the table";
        assert_eq!(
            parse(md),
            vec![
                Block::Table {
                    header: cells(&["A"]),
                    alignments: vec![],
                    rows: vec![cells(&["1"])],
                },
                paragraph("After the table"),
            ]
        );
    }

    #[test]
    fn blank_line_splits_tables() {
        let md = "| A |\n\n| B |";
        let blocks = parse(md);
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| matches!(b, Block::Table { .. })));
    }

    #[test]
    fn indented_pipe_rows_continue_table() {
        let md = "  | A | B |\n  |---|---|\n  | 1 | 2 |";
        let Block::Table { header, rows, .. } = &parse(md)[0] else {
            panic!("expected a table");
        };
        assert_eq!(header, &cells(&["A", "B"]));
        assert_eq!(rows.len(), 1);
    }

    #[rstest]
    #[case("|", &[])]
    #[case("||", &[""])]
    #[case("| a |", &["a"])]
    #[case("| a | |", &["a", ""])]
    #[case("| a", &["a"])]
    fn boundary_pipes_are_dropped(#[case] row: &str, #[case] expected: &[&str]) {
        assert_eq!(split_cells(row), cells(expected));
    }

    #[test]
    fn lone_pipe_row_is_an_empty_table() {
        assert_eq!(
            parse("|"),
            vec![Block::Table {
                header: vec![],
                alignments: vec![],
                rows: vec![],
            }]
        );
    }

    #[test]
    fn checkbox_items() {
        assert_eq!(
            parse("- [x] Done\n- [ ] Todo\n- Plain"),
            vec![
                Block::CheckboxItem {
                    text: "Done".to_string(),
                    checked: true,
                },
                Block::CheckboxItem {
                    text: "Todo".to_string(),
                    checked: false,
                },
                Block::ListItem {
                    text: "Plain".to_string(),
                    ordered: false,
                },
            ]
        );
    }

    #[test]
    fn uppercase_x_is_not_a_checkbox() {
        assert_eq!(
            parse("* [X] Shout"),
            vec![Block::ListItem {
                text: "[X] Shout".to_string(),
                ordered: false,
            }]
        );
    }

    #[test]
    fn ordered_items_keep_text_after_first_dot() {
        assert_eq!(
            parse("1. Check in\n12. Dinner at 7.30"),
            vec![
                Block::ListItem {
                    text: "Check in".to_string(),
                    ordered: true,
                },
                Block::ListItem {
                    text: "Dinner at 7.30".to_string(),
                    ordered: true,
                },
            ]
        );
    }

    #[test]
    fn blockquote_and_paragraphs() {
        assert_eq!(
            parse("> Pack an umbrella\n\n\nJust text\n>no space"),
            vec![
                Block::Blockquote {
                    text: "Pack an umbrella".to_string(),
                },
                paragraph("Just text"),
                paragraph(">no space"),
            ]
        );
    }

    #[test]
    fn empty_input_has_no_blocks() {
        assert!(parse("").is_empty());
        assert!(parse("\n  \n\t\n").is_empty());
    }

    #[test]
    fn preserves_source_order() {
        let md = "Intro\n## Day 1\n- Walk\n### Lunch\n1. Eat";
        let kinds: Vec<&str> = parse(md)
            .iter()
            .map(|b| match b {
                Block::Heading { .. } => "heading",
                Block::Paragraph { .. } => "paragraph",
                Block::ListItem { .. } => "list",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["paragraph", "heading", "list", "heading", "list"]);
    }
}
