use tracing::trace;

use crate::ops::token_ops::own_lines_range;
use crate::parse::syntax::{
    Syntax, first_state_word, is_blank, normalize_content, split_indent, strip_states,
};

/// Canonical layout for a task script.
///
/// Line endings become `\n`, trailing spaces and tabs are stripped, runs of
/// blank lines collapse to one and the document loses its leading and
/// trailing blank lines. Each task's state token moves to the front of its
/// first body line. Formatting formatted output changes nothing.
pub fn format_task_script(syntax: &Syntax, text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let stripped: Vec<String> = normalized
        .split('\n')
        .map(|line| line.trim_end_matches([' ', '\t']).to_string())
        .collect();

    let mut lines = compact_blank_lines(stripped);
    let mut idx = 0;
    while idx < lines.len() {
        if syntax.is_task_line(&lines[idx]) {
            hoist_state(syntax, &mut lines, idx);
        }
        idx += 1;
    }

    compact_blank_lines(lines).join("\n")
}

fn compact_blank_lines(lines: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut previous_blank = false;
    for line in lines {
        if is_blank(&line) {
            if !out.is_empty() && !previous_blank {
                out.push(String::new());
            }
            previous_blank = true;
        } else {
            out.push(line);
            previous_blank = false;
        }
    }
    while out.last().is_some_and(|line| line.is_empty()) {
        out.pop();
    }
    out
}

/// Move the first state token in the task's own body to the front of its
/// first non-blank body line, dropping every other state token.
fn hoist_state(syntax: &Syntax, lines: &mut Vec<String>, decl_line: usize) {
    let range = own_lines_range(syntax, lines.as_slice(), decl_line);
    let Some(first) = range.clone().find(|&i| !is_blank(&lines[i])) else {
        return;
    };
    let Some(state) = range
        .clone()
        .find_map(|i| first_state_word(&lines[i]).map(str::to_string))
    else {
        return;
    };
    trace!(line = decl_line, state = %state, "hoisting state");

    let target_indent = split_indent(&lines[first]).0.to_string();
    let mut emptied = Vec::new();
    for i in range {
        let (indent, content) = split_indent(&lines[i]);
        let Some(cleaned) = strip_states(content) else {
            continue;
        };
        if cleaned.is_empty() {
            lines[i] = String::new();
            if i != first {
                emptied.push(i);
            }
        } else {
            lines[i] = format!("{}{}", indent, cleaned);
        }
    }

    let content = split_indent(&lines[first]).1;
    let hoisted = normalize_content(&format!("{} {}", state, content));
    lines[first] = format!("{}{}", target_indent, hoisted);

    for i in emptied.into_iter().rev() {
        lines.remove(i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn format(text: &str) -> String {
        format_task_script(&Syntax::default(), text)
    }

    fn assert_idempotent(text: &str) {
        let once = format(text);
        assert_eq!(format(&once), once);
    }

    // ---------------------------------------------------------------------------
    // Whitespace
    // ---------------------------------------------------------------------------

    #[test]
    fn test_collapses_blank_runs() {
        assert_eq!(format("% A\n\n\n\nbody\n\n\n% B"), "% A\n\nbody\n\n% B");
    }

    #[test]
    fn test_trims_leading_and_trailing_blank_lines() {
        assert_eq!(format("\n\n  \n% A\nbody\n\n\n"), "% A\nbody");
    }

    #[test]
    fn test_strips_trailing_whitespace() {
        assert_eq!(format("% A   \nbody\t \n"), "% A\nbody");
    }

    #[test]
    fn test_normalizes_line_endings() {
        assert_eq!(format("% A\r\nbody\r\n\r\n% B\rmore"), "% A\nbody\n\n% B\nmore");
    }

    #[test]
    fn test_whitespace_only_lines_become_empty() {
        assert_eq!(format("% A\n    \nbody"), "% A\n\nbody");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(format(""), "");
        assert_eq!(format("\n\n\n"), "");
    }

    // ---------------------------------------------------------------------------
    // State hoisting
    // ---------------------------------------------------------------------------

    #[test]
    fn test_state_moves_to_front_of_first_body_line() {
        assert_eq!(
            format("% A\nfix the build !todo\nmore"),
            "% A\n!todo fix the build\nmore"
        );
    }

    #[test]
    fn test_state_from_later_line_is_hoisted() {
        assert_eq!(
            format("% A\nfirst line\nsecond line !done"),
            "% A\n!done first line\nsecond line"
        );
    }

    #[test]
    fn test_state_only_line_is_removed_after_hoist() {
        assert_eq!(format("% A\nnotes\n!inprogress"), "% A\n!inprogress notes");
    }

    #[test]
    fn test_extra_states_are_dropped() {
        assert_eq!(format("% A\n!todo notes !done"), "% A\n!todo notes");
    }

    #[test]
    fn test_hoist_keeps_target_indentation() {
        assert_eq!(
            format("% A\n    % B\n        notes  here !todo"),
            "% A\n    % B\n        !todo notes here"
        );
    }

    #[test]
    fn test_subtask_state_stays_with_subtask() {
        assert_eq!(
            format("% A\nparent notes\n    % B\n    child !done"),
            "% A\nparent notes\n    % B\n    !done child"
        );
    }

    #[test]
    fn test_task_without_state_is_untouched() {
        let text = "% A\nsome   spaced    notes #tag\n@maya";
        assert_eq!(format(text), text);
    }

    #[test]
    fn test_blank_gap_before_state_line_is_kept() {
        assert_eq!(format("% A\n\n!todo notes"), "% A\n\n!todo notes");
    }

    #[test]
    fn test_emptied_line_does_not_leave_double_blank() {
        assert_eq!(
            format("% A\nnotes\n\n!todo\n\n% B"),
            "% A\n!todo notes\n\n% B"
        );
    }

    #[test]
    fn test_state_glued_to_tag_is_split_off() {
        assert_eq!(format("% A\nnotes !todo#x"), "% A\n!todo notes #x");
        assert_idempotent("% A\nnotes !todo#x");
    }

    #[test]
    fn test_custom_marker() {
        let syntax = Syntax {
            marker: '*',
            indent_width: 2,
        };
        assert_eq!(
            format_task_script(&syntax, "* A\n  * B\n  body !todo"),
            "* A\n  * B\n  !todo body"
        );
    }

    // ---------------------------------------------------------------------------
    // Idempotence
    // ---------------------------------------------------------------------------

    #[test]
    fn test_idempotent_on_messy_input() {
        assert_idempotent("\n\n% A  \r\nfix it !todo  \n\n\n\n!done\n    % B\n    x !a !b\n\n");
        assert_idempotent("states:\n    todo: TODO\n\n% A\n!todo\n% B\n\n\nnotes #x !done @y");
        assert_idempotent("% A\n\n\n   \n% B\n\t!todo\n");
        assert_idempotent("no tasks here\n\n\njust   text !todo");
    }
}
