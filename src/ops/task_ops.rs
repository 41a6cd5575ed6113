use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::ops::token_ops::locate_body_range;
use crate::parse::syntax::{Syntax, is_blank, split_indent};

static CHECKBOX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s*\[)([ xX])(\])").unwrap());

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskOpError {
    #[error("line {0} is not a task declaration")]
    NotATask(usize),
    #[error("cannot move a task under itself")]
    SameTask,
    #[error("cannot move a task under one of its own subtasks")]
    TargetInsideSource,
    #[error("line {0} is not a checkbox")]
    NotACheckbox(usize),
}

/// A task declaration together with everything nested under it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskBlock {
    /// Declaration line
    pub start: usize,
    /// One past the last line of the block
    pub end: usize,
    pub depth: usize,
    /// Leading whitespace of the declaration, in characters
    pub indent: usize,
}

impl TaskBlock {
    pub fn contains(&self, line: usize) -> bool {
        (self.start..self.end).contains(&line)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// The block of the task declared on `decl_line`, subtasks included.
pub fn find_task_block<S: AsRef<str>>(syntax: &Syntax, lines: &[S], decl_line: usize) -> Option<TaskBlock> {
    let decl = syntax.task_decl(lines.get(decl_line)?.as_ref())?;
    let body = locate_body_range(syntax, lines, decl_line);
    Some(TaskBlock {
        start: decl_line,
        end: body.end,
        depth: decl.depth,
        indent: decl.indent,
    })
}

// ---------------------------------------------------------------------------
// Moving
// ---------------------------------------------------------------------------

/// Make the task on `source_line` the last subtask of the task on
/// `target_line`, re-indenting its whole block to sit one level deeper than
/// the target.
pub fn move_task_as_subtask(
    syntax: &Syntax,
    text: &str,
    source_line: usize,
    target_line: usize,
) -> Result<String, TaskOpError> {
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    let source =
        find_task_block(syntax, &lines, source_line).ok_or(TaskOpError::NotATask(source_line))?;
    let target =
        find_task_block(syntax, &lines, target_line).ok_or(TaskOpError::NotATask(target_line))?;

    if source_line == target_line {
        return Err(TaskOpError::SameTask);
    }
    if source.contains(target_line) {
        return Err(TaskOpError::TargetInsideSource);
    }

    let shift = syntax.indent_of(target.depth + 1) as isize - syntax.indent_of(source.depth) as isize;
    debug!(source = source_line, target = target_line, shift, "moving task block");

    let block: Vec<String> = lines
        .drain(source.start..source.end)
        .map(|line| shift_indent(&line, shift))
        .collect();

    let mut insert_at = target.end;
    if source.start < insert_at {
        insert_at -= source.len();
    }
    lines.splice(insert_at..insert_at, block);

    Ok(lines.join("\n"))
}

/// Shift a line's indentation by `delta` characters. Blank lines are left
/// alone and a negative shift never removes more than the existing indent.
fn shift_indent(line: &str, delta: isize) -> String {
    if delta == 0 || is_blank(line) {
        return line.to_string();
    }
    if delta > 0 {
        return format!("{}{}", " ".repeat(delta.unsigned_abs()), line);
    }
    let (indent, content) = split_indent(line);
    let keep: String = indent.chars().skip(delta.unsigned_abs()).collect();
    format!("{}{}", keep, content)
}

// ---------------------------------------------------------------------------
// Checkboxes
// ---------------------------------------------------------------------------

/// Flip the `[ ]`/`[x]` box at the start of `line`, or force it with
/// `checked`.
pub fn toggle_checkbox(text: &str, line: usize, checked: Option<bool>) -> Result<String, TaskOpError> {
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    let current = lines.get(line).ok_or(TaskOpError::NotACheckbox(line))?.clone();
    let caps = CHECKBOX
        .captures(&current)
        .ok_or(TaskOpError::NotACheckbox(line))?;

    let was_checked = !caps[2].trim().is_empty();
    let mark = if checked.unwrap_or(!was_checked) { "x" } else { " " };
    let head_len = caps[0].len();
    let updated = format!("{}{}{}{}", &caps[1], mark, &caps[3], &current[head_len..]);
    lines[line] = updated;

    Ok(lines.join("\n"))
}
