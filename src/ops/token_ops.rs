use std::ops::Range;

use tracing::debug;

use crate::model::task::Task;
use crate::model::token::TokenKind;
use crate::parse::syntax::{
    Syntax, count_indent, first_state_word, has_token_word, is_blank, normalize_content,
    remove_words, split_indent, strip_states,
};

// ---------------------------------------------------------------------------
// Ranges
// ---------------------------------------------------------------------------

/// Body range of the task declared on `decl_line`: from the next line up to
/// the next declaration indented no deeper than this one (or end of document).
/// Subtasks and their bodies fall inside this range.
pub fn locate_body_range<S: AsRef<str>>(syntax: &Syntax, lines: &[S], decl_line: usize) -> Range<usize> {
    let start = (decl_line + 1).min(lines.len());
    let own_indent = lines
        .get(decl_line)
        .map(|line| count_indent(line.as_ref()))
        .unwrap_or(0);
    let end = (start..lines.len())
        .find(|&i| {
            syntax
                .task_decl(lines[i].as_ref())
                .is_some_and(|decl| decl.indent <= own_indent)
        })
        .unwrap_or(lines.len());
    start..end
}

/// The lines a task owns directly: its body range cut at the first nested
/// declaration, since everything after that belongs to the subtask.
pub fn own_lines_range<S: AsRef<str>>(syntax: &Syntax, lines: &[S], decl_line: usize) -> Range<usize> {
    let range = locate_body_range(syntax, lines, decl_line);
    let end = range
        .clone()
        .find(|&i| syntax.is_task_line(lines[i].as_ref()))
        .unwrap_or(range.end);
    range.start..end
}

// ---------------------------------------------------------------------------
// Line helpers
// ---------------------------------------------------------------------------

/// Put `token` at the front of a line's content, keeping its indentation.
pub fn prepend_token(line: &str, token: &str) -> String {
    let (indent, content) = split_indent(line);
    if content.is_empty() {
        format!("{}{}", indent, token)
    } else {
        format!("{}{} {}", indent, token, content)
    }
}

/// Insert a tag or person token so that a leading state stays first:
/// `!state <token> <rest>`.
pub fn insert_token_respect_state(line: &str, token: &str) -> String {
    let (indent, content) = split_indent(line);
    let content = content.trim();
    if content.is_empty() {
        return format!("{}{}", indent, token);
    }
    let combined = match first_state_word(content) {
        Some(state) => {
            let rest = strip_states(content).unwrap_or_default();
            format!("{} {} {}", state, token, rest)
        }
        None => format!("{} {}", token, content),
    };
    format!("{}{}", indent, normalize_content(&combined))
}

/// Working copy of a script's lines scoped to one task's own lines
struct Edit {
    lines: Vec<String>,
    task_indent: String,
    range: Range<usize>,
}

impl Edit {
    /// `None` when the task reference points past the end of the text.
    fn open(syntax: &Syntax, text: &str, task: &Task) -> Option<Edit> {
        let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        let decl = lines.get(task.line_index)?;
        let task_indent = split_indent(decl).0.to_string();
        let range = own_lines_range(syntax, &lines, task.line_index);
        Some(Edit {
            lines,
            task_indent,
            range,
        })
    }

    /// Run `clean` over every own line's content (`None` leaves a line alone).
    /// Returns the lines that had content and are now empty.
    fn strip(&mut self, mut clean: impl FnMut(&str) -> Option<String>) -> Vec<usize> {
        let mut emptied = Vec::new();
        for i in self.range.clone() {
            let (indent, content) = split_indent(&self.lines[i]);
            if let Some(cleaned) = clean(content) {
                if cleaned.is_empty() {
                    self.lines[i] = String::new();
                    emptied.push(i);
                } else {
                    self.lines[i] = format!("{}{}", indent, cleaned);
                }
            }
        }
        emptied
    }

    /// Indentation to use when a token takes over an empty line: the line's
    /// own whitespace if it has any, else the task's.
    fn indent_for<'a>(&'a self, original_indent: &'a str) -> &'a str {
        if original_indent.is_empty() {
            &self.task_indent
        } else {
            original_indent
        }
    }

    fn own_lines_blank(&self) -> bool {
        self.range.clone().all(|i| is_blank(&self.lines[i]))
    }

    fn remove_lines(&mut self, indexes: &[usize]) {
        for &i in indexes.iter().rev() {
            self.lines.remove(i);
        }
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

fn line_indent(line: &str) -> String {
    split_indent(line).0.to_string()
}

fn drop_word(content: &str, token: &str) -> Option<String> {
    remove_words(content, |word| word == token)
}

// ---------------------------------------------------------------------------
// Token operations
// ---------------------------------------------------------------------------

/// Add a tag, person or state token to a task's own lines.
///
/// An existing occurrence is moved rather than duplicated. The token joins the
/// first line that already carries tokens, after any leading state. Without
/// one, a blank first body line is taken over by the token, else the token
/// leads the first non-blank line. A task with no body gets a new line under
/// the declaration. State tokens go through [`update_task_state`].
pub fn add_token(syntax: &Syntax, text: &str, task: &Task, token: &str) -> String {
    if TokenKind::of(token) == Some(TokenKind::State) {
        return update_task_state(syntax, text, task, Some(token));
    }
    let Some(mut edit) = Edit::open(syntax, text, task) else {
        return text.to_string();
    };
    debug!(task = %task.name, line = task.line_index, token, "add token");

    let range = edit.range.clone();
    let target = range
        .clone()
        .find(|&i| has_token_word(&edit.lines[i]))
        .or_else(|| {
            let first = range.start;
            let first_blank = range.contains(&first) && is_blank(&edit.lines[first]);
            if first_blank {
                Some(first)
            } else {
                range.clone().find(|&i| !is_blank(&edit.lines[i]))
            }
        });
    let target_indent = target.map(|t| line_indent(&edit.lines[t]));

    let mut emptied = edit.strip(|content| drop_word(content, token));

    match (target, target_indent) {
        (Some(t), Some(indent)) => {
            if is_blank(&edit.lines[t]) {
                edit.lines[t] = format!("{}{}", edit.indent_for(&indent), token);
                emptied.retain(|&i| i != t);
            } else {
                edit.lines[t] = insert_token_respect_state(&edit.lines[t], token);
            }
        }
        _ => {
            let line = format!("{}{}", edit.task_indent, token);
            edit.lines.insert(range.start, line);
        }
    }

    edit.remove_lines(&emptied);
    edit.finish()
}

/// Remove every whole-word occurrence of `token` from a task's own lines.
///
/// Lines left empty by the removal are deleted; lines that were already blank
/// stay.
pub fn remove_token(syntax: &Syntax, text: &str, task: &Task, token: &str) -> String {
    let Some(mut edit) = Edit::open(syntax, text, task) else {
        return text.to_string();
    };
    if edit.range.is_empty() {
        return text.to_string();
    }
    debug!(task = %task.name, line = task.line_index, token, "remove token");

    let emptied = edit.strip(|content| drop_word(content, token));
    edit.remove_lines(&emptied);
    edit.finish()
}

/// Replace (or with `None`, clear) a task's state.
///
/// Every state token on the task's own lines is removed first, including one
/// glued to a tag such as `!todo#x`. The new state leads the first line that
/// had content; lines emptied by the clearing are deleted. Clearing a state
/// out of a body that is then only blank lines removes the body entirely.
pub fn update_task_state(syntax: &Syntax, text: &str, task: &Task, new_state: Option<&str>) -> String {
    let Some(mut edit) = Edit::open(syntax, text, task) else {
        return text.to_string();
    };
    debug!(task = %task.name, line = task.line_index, state = ?new_state, "update state");

    let range = edit.range.clone();
    if range.is_empty() {
        if let Some(state) = new_state {
            let line = format!("{}{}", edit.task_indent, state);
            edit.lines.insert(range.start, line);
        }
        return edit.finish();
    }

    let target = range.clone().find(|&i| !is_blank(&edit.lines[i]));
    let target_indent = target.map(|t| line_indent(&edit.lines[t]));

    let mut emptied = edit.strip(strip_states);

    if new_state.is_none() && !emptied.is_empty() && edit.own_lines_blank() {
        let body: Vec<usize> = range.collect();
        edit.remove_lines(&body);
        return edit.finish();
    }

    if let Some(state) = new_state {
        match (target, target_indent) {
            (Some(t), Some(indent)) => {
                if is_blank(&edit.lines[t]) {
                    edit.lines[t] = format!("{}{}", edit.indent_for(&indent), state);
                    emptied.retain(|&i| i != t);
                } else {
                    edit.lines[t] = prepend_token(&edit.lines[t], state);
                }
            }
            _ => {
                let blank_indent = line_indent(&edit.lines[range.start]);
                edit.lines[range.start] = format!("{}{}", edit.indent_for(&blank_indent), state);
            }
        }
    }

    edit.remove_lines(&emptied);
    edit.finish()
}
