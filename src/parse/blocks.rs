use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static TABLE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\|?\s*[-:]+").unwrap());
static CHECKBOX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[([ xX])\]\s+(.*)$").unwrap());
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-*]\s+(.*)$").unwrap());

/// A block of description text, as a renderer would lay it out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        text: String,
    },
    Blank,
    /// Consecutive `-`/`*` items
    List {
        items: Vec<String>,
    },
    /// `[ ] text` or `[x] text`; `line` is the source line when known
    Checkbox {
        checked: bool,
        text: String,
        line: Option<usize>,
    },
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

/// Group description lines into blocks.
///
/// `line_indexes` maps each input line to its source line (pass
/// `Task::description_line_indexes`, or an empty slice when unknown); only
/// checkboxes carry it, since they are the one block a UI edits in place.
pub fn classify_blocks<S: AsRef<str>>(lines: &[S], line_indexes: &[usize]) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut list: Option<Vec<String>> = None;
    let mut table: Option<(Vec<String>, Vec<Vec<String>>)> = None;

    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.as_ref().trim();
        let next = lines.get(index + 1).map(|l| l.as_ref().trim()).unwrap_or("");

        if table.is_none() && trimmed.contains('|') && is_table_separator(next) {
            close_list(&mut list, &mut blocks);
            table = Some((to_cells(trimmed), Vec::new()));
            continue;
        }

        if let Some((_, rows)) = table.as_mut() {
            if trimmed.contains('|') {
                if !TABLE_SEPARATOR.is_match(trimmed) {
                    let cells = to_cells(trimmed);
                    if !cells.is_empty() {
                        rows.push(cells);
                    }
                }
                continue;
            }
            close_table(&mut table, &mut blocks);
        }

        if let Some(caps) = CHECKBOX.captures(trimmed) {
            close_list(&mut list, &mut blocks);
            blocks.push(Block::Checkbox {
                checked: caps[1].eq_ignore_ascii_case("x"),
                text: caps[2].to_string(),
                line: line_indexes.get(index).copied(),
            });
            continue;
        }

        if let Some(caps) = LIST_ITEM.captures(trimmed) {
            list.get_or_insert_with(Vec::new).push(caps[1].to_string());
            continue;
        }

        close_list(&mut list, &mut blocks);
        if trimmed.is_empty() {
            blocks.push(Block::Blank);
        } else {
            blocks.push(Block::Paragraph {
                text: trimmed.to_string(),
            });
        }
    }

    close_list(&mut list, &mut blocks);
    close_table(&mut table, &mut blocks);
    blocks
}

fn is_table_separator(line: &str) -> bool {
    line.contains('|') && TABLE_SEPARATOR.is_match(line)
}

fn to_cells(line: &str) -> Vec<String> {
    line.split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect()
}

fn close_list(list: &mut Option<Vec<String>>, blocks: &mut Vec<Block>) {
    if let Some(items) = list.take() {
        blocks.push(Block::List { items });
    }
}

fn close_table(table: &mut Option<(Vec<String>, Vec<Vec<String>>)>, blocks: &mut Vec<Block>) {
    if let Some((header, rows)) = table.take() {
        blocks.push(Block::Table { header, rows });
    }
}
