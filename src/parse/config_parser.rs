use crate::model::header::{BoardConfig, Entry};
use crate::parse::syntax::{Syntax, split_indent};
use crate::util::color::color_from_string;

/// Header sections that declare entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    States,
    People,
    Tags,
    /// Any other `name:` line; its entries are dropped
    Unknown,
}

impl Section {
    fn from_name(name: &str) -> Section {
        match name.trim().to_lowercase().as_str() {
            "states" => Section::States,
            "people" => Section::People,
            "tags" => Section::Tags,
            _ => Section::Unknown,
        }
    }
}

/// Parse the optional header at the top of a script.
///
/// Scans from line 0 up to the first task declaration and returns the config
/// together with the index of that declaration (`lines.len()` if there is
/// none), which is where task parsing resumes.
pub fn parse_config<S: AsRef<str>>(syntax: &Syntax, lines: &[S]) -> (BoardConfig, usize) {
    let mut config = BoardConfig::default();
    let mut idx = 0;

    // Board name: `Name:` on the very first line
    if let Some(first) = lines.first() {
        let first = first.as_ref().trim();
        if !first.is_empty() && !first.starts_with(syntax.marker) && first.ends_with(':') {
            let name = first[..first.len() - 1].trim();
            if !name.is_empty() {
                config.board_name = name.to_string();
            }
            idx = 1;
        }
    }

    let section_indent = syntax.indent_of(1);
    let entry_indent = syntax.indent_of(2);
    let property_indent = syntax.indent_of(3);

    let mut states_overridden = false;
    let mut section: Option<Section> = None;
    // (section, position) of the entry that property lines apply to
    let mut current_entry: Option<(Section, usize)> = None;

    while idx < lines.len() {
        let raw = lines[idx].as_ref();
        if raw.trim().is_empty() {
            idx += 1;
            continue;
        }
        if syntax.is_task_line(raw) {
            break;
        }

        let (indent, trimmed) = split_indent(raw);
        let trimmed = trimmed.trim_end();
        let indent = indent.chars().count();

        if indent == section_indent && trimmed.ends_with(':') {
            let kind = Section::from_name(&trimmed[..trimmed.len() - 1]);
            if kind == Section::States && !states_overridden {
                config.states.clear();
                states_overridden = true;
            }
            section = Some(kind);
            current_entry = None;
        } else if indent == entry_indent
            && let Some(kind) = section
        {
            current_entry = entries_mut(&mut config, kind).map(|entries| {
                entries.push(parse_entry(trimmed));
                (kind, entries.len() - 1)
            });
        } else if indent == property_indent
            && let Some((kind, pos)) = current_entry
            && let Some(entry) = entries_mut(&mut config, kind).and_then(|e| e.get_mut(pos))
        {
            apply_property(entry, trimmed);
        }

        idx += 1;
    }

    (config, idx)
}

fn entries_mut(config: &mut BoardConfig, kind: Section) -> Option<&mut Vec<Entry>> {
    match kind {
        Section::States => Some(&mut config.states),
        Section::People => Some(&mut config.people),
        Section::Tags => Some(&mut config.tags),
        Section::Unknown => None,
    }
}

/// `key` or `key: Display Name`. A line that does not fit (whitespace in the
/// key, no colon) uses the whole trimmed text as the key.
fn parse_entry(text: &str) -> Entry {
    let (key, display) = match split_key_value(text) {
        Some((key, value)) if !key.chars().any(|c| c.is_whitespace()) => (key, value.trim()),
        _ => (text, ""),
    };
    let name = if display.is_empty() { key } else { display };
    Entry::new(key, name, &color_from_string(key))
}

/// Split `key: value` at the first colon, requiring a non-empty key.
fn split_key_value(text: &str) -> Option<(&str, &str)> {
    let (key, value) = text.split_once(':')?;
    let key = key.trim_end();
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

/// `name: value` or `color: value`, property name case-insensitive.
fn apply_property(entry: &mut Entry, text: &str) {
    let Some((prop, value)) = split_key_value(text) else {
        return;
    };
    if !prop.chars().all(|c| c.is_ascii_alphabetic()) {
        return;
    }
    let value = value.trim();
    match prop.to_ascii_lowercase().as_str() {
        "name" => {
            if !value.is_empty() {
                entry.name = value.to_string();
            }
        }
        "color" => entry.color = value.to_string(),
        _ => {}
    }
}
