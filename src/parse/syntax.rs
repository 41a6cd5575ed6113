use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::token::{TokenKind, is_token_char};

pub const DEFAULT_MARKER: char = '%';
pub const DEFAULT_INDENT_WIDTH: usize = 4;

static MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// The two knobs of the task script grammar: which character opens a task
/// declaration and how many whitespace characters make one nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Syntax {
    #[serde(default = "default_marker")]
    pub marker: char,
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,
}

fn default_marker() -> char {
    DEFAULT_MARKER
}

fn default_indent_width() -> usize {
    DEFAULT_INDENT_WIDTH
}

impl Default for Syntax {
    fn default() -> Self {
        Syntax {
            marker: DEFAULT_MARKER,
            indent_width: DEFAULT_INDENT_WIDTH,
        }
    }
}

/// A recognized task declaration line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskDecl<'a> {
    /// Leading whitespace, in characters
    pub indent: usize,
    pub depth: usize,
    pub name: &'a str,
}

impl Syntax {
    /// Match `<indent><marker><whitespace+><name>`.
    pub fn task_decl<'a>(&self, line: &'a str) -> Option<TaskDecl<'a>> {
        let (indent, content) = split_indent(line);
        let rest = content.strip_prefix(self.marker)?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let indent = indent.chars().count();
        Some(TaskDecl {
            indent,
            depth: self.depth(indent),
            name: rest.trim(),
        })
    }

    pub fn is_task_line(&self, line: &str) -> bool {
        self.task_decl(line).is_some()
    }

    /// Nesting depth for an indentation of `indent` characters (floored).
    pub fn depth(&self, indent: usize) -> usize {
        indent / self.indent_width.max(1)
    }

    /// Indentation in characters of `levels` nesting levels.
    pub fn indent_of(&self, levels: usize) -> usize {
        levels * self.indent_width
    }
}

/// Split a line into its leading whitespace and the rest.
pub fn split_indent(line: &str) -> (&str, &str) {
    let content = line.trim_start();
    (&line[..line.len() - content.len()], content)
}

/// Count leading whitespace characters.
pub fn count_indent(line: &str) -> usize {
    split_indent(line).0.chars().count()
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Collapse whitespace runs of two or more into one space and trim the ends.
pub fn normalize_content(content: &str) -> String {
    MULTI_SPACE.replace_all(content, " ").trim().to_string()
}

/// Remove every whitespace-delimited word matching `pred`.
///
/// Returns `None` when nothing matched, so callers can leave the line
/// byte-for-byte alone. Otherwise the remaining content comes back normalized.
pub fn remove_words(content: &str, mut pred: impl FnMut(&str) -> bool) -> Option<String> {
    replace_words(content, |word| pred(word).then(String::new))
}

/// Rewrite whitespace-delimited words: `f` returns the replacement for a word
/// it changes (empty to drop it). Same `None` contract as [`remove_words`].
pub fn replace_words(content: &str, mut f: impl FnMut(&str) -> Option<String>) -> Option<String> {
    let mut kept = String::with_capacity(content.len());
    let mut removed = false;
    let mut rest = content;
    while !rest.is_empty() {
        let ws_len = rest.len() - rest.trim_start().len();
        if ws_len > 0 {
            kept.push_str(&rest[..ws_len]);
            rest = &rest[ws_len..];
            continue;
        }
        let word_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let word = &rest[..word_len];
        match f(word) {
            Some(replacement) => {
                removed = true;
                kept.push_str(&replacement);
            }
            None => kept.push_str(word),
        }
        rest = &rest[word_len..];
    }
    removed.then(|| normalize_content(&kept))
}

/// The state token a word starts with, as the body parser reads it: `!`
/// followed by token characters, so `!todo#x` yields `!todo`.
pub fn state_prefix(word: &str) -> Option<&str> {
    let body = word.strip_prefix('!')?;
    let len = body.find(|c: char| !is_token_char(c)).unwrap_or(body.len());
    (len > 0).then(|| &word[..len + 1])
}

/// First state token on a line's content.
pub fn first_state_word(content: &str) -> Option<&str> {
    content.split_whitespace().find_map(state_prefix)
}

/// Strip every state token from a line's content, keeping any `#`/`@` tail
/// glued to it. `None` when the content carries no state.
pub fn strip_states(content: &str) -> Option<String> {
    replace_words(content, |word| {
        state_prefix(word).map(|state| word[state.len()..].to_string())
    })
}

/// Whether the content carries anything the body parser would read as a
/// tag, person or state.
pub fn has_token_word(content: &str) -> bool {
    content.split_whitespace().any(|w| {
        let mut chars = w.chars();
        matches!(
            (chars.next().and_then(TokenKind::from_prefix), chars.next()),
            (Some(_), Some(c)) if is_token_char(c)
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_decl_default_marker() {
        let syntax = Syntax::default();
        let decl = syntax.task_decl("% Ship it").unwrap();
        assert_eq!(decl.indent, 0);
        assert_eq!(decl.depth, 0);
        assert_eq!(decl.name, "Ship it");

        let decl = syntax.task_decl("        %   Nested  ").unwrap();
        assert_eq!(decl.indent, 8);
        assert_eq!(decl.depth, 2);
        assert_eq!(decl.name, "Nested");
    }

    #[test]
    fn test_task_decl_requires_space_after_marker() {
        let syntax = Syntax::default();
        assert!(syntax.task_decl("%done").is_none());
        assert!(syntax.task_decl("%").is_none());
        assert!(syntax.task_decl("text % not a task").is_none());
        // A bare marker followed by whitespace is an (unnamed) task
        assert_eq!(syntax.task_decl("% ").unwrap().name, "");
    }

    #[test]
    fn test_depth_floors_partial_indent() {
        let syntax = Syntax::default();
        assert_eq!(syntax.task_decl("   % Three spaces").unwrap().depth, 0);
        assert_eq!(syntax.task_decl("      % Six spaces").unwrap().depth, 1);
    }

    #[test]
    fn test_custom_syntax() {
        let syntax = Syntax {
            marker: '*',
            indent_width: 2,
        };
        assert!(syntax.task_decl("% Not a task").is_none());
        let decl = syntax.task_decl("    * Deep").unwrap();
        assert_eq!(decl.depth, 2);
        assert_eq!(syntax.indent_of(3), 6);
    }

    #[test]
    fn test_split_indent() {
        assert_eq!(split_indent("    #tag text"), ("    ", "#tag text"));
        assert_eq!(split_indent("plain"), ("", "plain"));
        assert_eq!(split_indent("   "), ("   ", ""));
        assert_eq!(count_indent("\t  x"), 3);
    }

    #[test]
    fn test_normalize_content() {
        assert_eq!(normalize_content("  a   b  c "), "a b c");
        assert_eq!(normalize_content("a b"), "a b");
        assert_eq!(normalize_content("   "), "");
    }

    #[test]
    fn test_remove_words() {
        assert_eq!(
            remove_words("#urgent fix  the #urgent bug", |w| w == "#urgent"),
            Some("fix the bug".to_string())
        );
        assert_eq!(remove_words("#urgent", |w| w == "#urgent"), Some(String::new()));
        assert_eq!(remove_words("#urgently", |w| w == "#urgent"), None);
    }

    #[test]
    fn test_state_prefix_matches_parser() {
        assert_eq!(state_prefix("!todo"), Some("!todo"));
        assert_eq!(state_prefix("!todo#x"), Some("!todo"));
        assert_eq!(state_prefix("!done@sam"), Some("!done"));
        assert_eq!(state_prefix("!"), None);
        assert_eq!(state_prefix("!#x"), None);
        assert_eq!(state_prefix("wow!"), None);
    }

    #[test]
    fn test_strip_states_keeps_glued_tail() {
        assert_eq!(strip_states("!todo#x notes"), Some("#x notes".to_string()));
        assert_eq!(strip_states("a !todo b !done"), Some("a b".to_string()));
        assert_eq!(strip_states("!todo"), Some(String::new()));
        assert_eq!(strip_states("no state here!"), None);
    }

    #[test]
    fn test_word_predicates() {
        assert_eq!(first_state_word("fix !todo !done"), Some("!todo"));
        assert_eq!(first_state_word("wow! nice"), None);
        assert_eq!(first_state_word("see !todo#x"), Some("!todo"));
        assert!(has_token_word("see @maya"));
        assert!(has_token_word("#a#b"));
        assert!(!has_token_word("# heading and ! bang"));
        assert!(!has_token_word("plain text"));
    }
}
