use std::sync::LazyLock;

use regex::Regex;

use crate::model::script::Script;
use crate::model::token::TokenKind;

static TRIGGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([#@{!])([^\s}]*)$").unwrap());

/// Completion candidates for the token being typed at the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestions {
    /// `#`, `@`, `!` or `{`
    pub trigger: char,
    /// What has been typed after the trigger
    pub partial: String,
    /// Prefixed tokens, or bare task names for `{`
    pub items: Vec<String>,
}

/// Text edit that applies one suggestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Characters to delete before the cursor
    pub delete_before: usize,
    pub insert: String,
}

/// Suggestions for the text left of the cursor, or `None` when no trigger
/// is being typed or nothing matches.
pub fn suggest(script: &Script, before_cursor: &str) -> Option<Suggestions> {
    let caps = TRIGGER.captures(before_cursor)?;
    let trigger = caps[1].chars().next()?;
    let partial = caps[2].to_string();
    let needle = partial.to_lowercase();

    let pool: Vec<String> = match TokenKind::from_prefix(trigger) {
        Some(kind) => script.registry(kind).iter().cloned().collect(),
        None => script.all_tasks().into_iter().map(|t| t.name.clone()).collect(),
    };
    let items: Vec<String> = pool
        .into_iter()
        .filter(|item| item.to_lowercase().contains(&needle))
        .collect();

    if items.is_empty() {
        return None;
    }
    Some(Suggestions {
        trigger,
        partial,
        items,
    })
}

impl Suggestions {
    /// Edit that turns the typed partial into `item`.
    ///
    /// When the item starts with what was typed only the rest is inserted,
    /// otherwise the partial is replaced. Task references get a closing `}`.
    pub fn completion(&self, item: &str) -> Completion {
        let value = if self.trigger == '{' {
            item
        } else {
            item.strip_prefix(self.trigger).unwrap_or(item)
        };
        let typed = self.partial.chars().count();
        let extends = value.to_lowercase().starts_with(&self.partial.to_lowercase());

        let mut insert: String = if extends {
            value.chars().skip(typed).collect()
        } else {
            value.to_string()
        };
        if self.trigger == '{' {
            insert.push('}');
        }
        Completion {
            delete_before: if extends { 0 } else { typed },
            insert,
        }
    }
}

impl Completion {
    /// Apply at byte offset `cursor`; returns the new text and cursor. A
    /// cursor inside a multi-byte character moves back to its start.
    pub fn apply(&self, text: &str, cursor: usize) -> (String, usize) {
        let mut cursor = cursor.min(text.len());
        while !text.is_char_boundary(cursor) {
            cursor -= 1;
        }
        let start = text[..cursor]
            .char_indices()
            .rev()
            .nth(self.delete_before.saturating_sub(1))
            .map(|(i, _)| i)
            .filter(|_| self.delete_before > 0)
            .unwrap_or(cursor);
        let updated = format!("{}{}{}", &text[..start], self.insert, &text[cursor..]);
        (updated, start + self.insert.len())
    }
}
