use std::sync::LazyLock;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use tracing::{debug, trace};

use crate::model::header::Entry;
use crate::model::script::Script;
use crate::model::task::{Task, TaskId};
use crate::parse::config_parser::parse_config;
use crate::parse::syntax::Syntax;
use crate::util::color::color_from_string;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:^|\s)(#[^\s#@]+)").unwrap());
static PERSON: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:^|\s)(@[^\s#@]+)").unwrap());
static STATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:^|\s)(![^\s#@]+)").unwrap());
static REFERENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^}]+)\}").unwrap());

/// Parse a task script with the default syntax.
pub fn parse_tasks(text: &str) -> Script {
    parse_tasks_with(&Syntax::default(), text)
}

/// Parse a task script: header, task tree, registries and diagnostics.
///
/// Never fails. Malformed input degrades: extra state tokens are recorded in
/// `invalid_state_tags`, tasks indented past any open ancestor are kept but
/// orphaned, and text before the first task is dropped.
pub fn parse_tasks_with(syntax: &Syntax, text: &str) -> Script {
    let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    let (config, start_idx) = parse_config(syntax, &lines);

    let mut script = Script::default();
    register_entries(&config.tags, '#', &mut script.tags, &mut script.tag_meta);
    register_entries(&config.people, '@', &mut script.people, &mut script.people_meta);
    register_entries(&config.states, '!', &mut script.states, &mut script.state_meta);
    script.config = config;

    // Open task per depth; only lives for this call
    let mut stack: Vec<Option<usize>> = Vec::new();
    let mut current: Option<usize> = None;

    for (line_idx, line) in lines.iter().enumerate().skip(start_idx) {
        if let Some(decl) = syntax.task_decl(line) {
            let idx = script.tasks.len();
            let mut task = Task::new(
                TaskId(idx as u64),
                decl.name.to_string(),
                decl.depth,
                line_idx,
            );

            if decl.depth == 0 {
                script.roots.push(idx);
                stack.clear();
                stack.push(Some(idx));
            } else {
                stack.truncate(decl.depth);
                match stack.get(decl.depth - 1).copied().flatten() {
                    Some(parent) => {
                        script.tasks[parent].children.push(idx);
                        task.parent = Some(parent);
                    }
                    None => {
                        debug!(line = line_idx, depth = decl.depth, name = %task.name, "orphaned task");
                        script.orphaned.push(idx);
                    }
                }
                stack.resize(decl.depth, None);
                stack.push(Some(idx));
            }

            script.tasks.push(task);
            current = Some(idx);
            continue;
        }

        let trimmed = line.trim();
        let Some(task_idx) = current else {
            continue;
        };
        if trimmed.is_empty() {
            continue;
        }
        read_body_line(&mut script, task_idx, line_idx, trimmed);
    }

    debug!(
        tasks = script.tasks.len(),
        roots = script.roots.len(),
        invalid_state_lines = script.invalid_state_tags.len(),
        "parsed task script"
    );
    script.lines = lines;
    script
}

fn register_entries(
    entries: &[Entry],
    prefix: char,
    registry: &mut IndexSet<String>,
    meta: &mut IndexMap<String, Entry>,
) {
    for entry in entries {
        let token = format!("{}{}", prefix, entry.key);
        let mut resolved = entry.clone();
        if resolved.color.is_empty() {
            resolved.color = color_from_string(&entry.key);
        }
        registry.insert(token.clone());
        meta.insert(token, resolved);
    }
}

/// Register an ad-hoc token unless the header already declared it.
fn register_token(token: &str, registry: &mut IndexSet<String>, meta: &mut IndexMap<String, Entry>) {
    registry.insert(token.to_string());
    if !meta.contains_key(token) {
        let key = &token[1..];
        meta.insert(
            token.to_string(),
            Entry::new(key, key, &color_from_string(key)),
        );
    }
}

/// Attribute one trimmed body line to a task and pull out its inline tokens.
fn read_body_line(script: &mut Script, task_idx: usize, line_idx: usize, trimmed: &str) {
    let task = &mut script.tasks[task_idx];
    task.description.push(trimmed.to_string());
    task.description_line_indexes.push(line_idx);

    for tag in captures(&TAG, trimmed) {
        task.tags.push(tag.to_string());
        register_token(tag, &mut script.tags, &mut script.tag_meta);
    }

    for person in captures(&PERSON, trimmed) {
        task.people.push(person.to_string());
        register_token(person, &mut script.people, &mut script.people_meta);
    }

    for reference in captures(&REFERENCE, trimmed) {
        task.references.push(reference.to_string());
    }

    for state in captures(&STATE, trimmed) {
        if task.state.is_none() {
            task.state = Some(state.to_string());
            register_token(state, &mut script.states, &mut script.state_meta);
        } else {
            trace!(line = line_idx, state, "extra state token");
            script
                .invalid_state_tags
                .entry(line_idx)
                .or_default()
                .push(state.to_string());
        }
    }
}

fn captures<'t>(re: &Regex, text: &'t str) -> impl Iterator<Item = &'t str> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::header::DEFAULT_BOARD_NAME;

    fn names(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.name.clone()).collect()
    }

    #[test]
    fn test_basic_nesting() {
        let script = parse_tasks("% A\n!todo\n    % B\n!done\n");
        assert_eq!(script.roots.len(), 1);
        let a = &script.tasks[script.roots[0]];
        assert_eq!(a.name, "A");
        assert_eq!(a.depth, 0);
        assert_eq!(a.state.as_deref(), Some("!todo"));
        assert_eq!(a.children.len(), 1);

        let b = &script.tasks[a.children[0]];
        assert_eq!(b.name, "B");
        assert_eq!(b.depth, 1);
        assert_eq!(b.state.as_deref(), Some("!done"));
        assert_eq!(script.parent_of(b).map(|p| p.name.as_str()), Some("A"));
        assert!(script.parent_of(a).is_none());
    }

    #[test]
    fn test_empty_input() {
        let script = parse_tasks("");
        assert!(script.tasks.is_empty());
        assert_eq!(script.config.board_name, DEFAULT_BOARD_NAME);
        let states: Vec<&str> = script.states.iter().map(String::as_str).collect();
        assert_eq!(states, vec!["!todo", "!inprogress", "!done"]);
        assert_eq!(script.lines, vec![""]);
    }

    #[test]
    fn test_header_override_states() {
        let input = "\
Board:
    states:
        blocked
% Task
!blocked
% Other
!adhoc";
        let script = parse_tasks(input);
        let states: Vec<&str> = script.states.iter().map(String::as_str).collect();
        assert_eq!(states, vec!["!blocked", "!adhoc"]);
    }

    #[test]
    fn test_default_state_colors_are_derived() {
        let script = parse_tasks("% A");
        let todo = &script.state_meta["!todo"];
        assert_eq!(todo.name, "TODO");
        assert_eq!(todo.color, color_from_string("todo"));
    }

    #[test]
    fn test_inline_tokens_in_order_with_duplicates() {
        let input = "\
% Task
#ui fix @maya and #ui again {Other Task}
email@example.com #a#b see{Ref}";
        let script = parse_tasks(input);
        let task = &script.tasks[0];
        assert_eq!(task.tags, vec!["#ui", "#ui", "#a"]);
        assert_eq!(task.people, vec!["@maya"]);
        assert_eq!(task.references, vec!["Other Task", "Ref"]);
        assert_eq!(task.description.len(), 2);
        assert_eq!(task.description_line_indexes, vec![1, 2]);
    }

    #[test]
    fn test_adhoc_tokens_registered_with_colors() {
        let script = parse_tasks("% Task\n#new @sam !waiting");
        assert!(script.tags.contains("#new"));
        assert!(script.people.contains("@sam"));
        assert!(script.states.contains("!waiting"));
        let meta = &script.tag_meta["#new"];
        assert_eq!(meta.key, "new");
        assert_eq!(meta.name, "new");
        assert_eq!(meta.color, color_from_string("new"));
    }

    #[test]
    fn test_header_entry_meta_not_overwritten_by_body() {
        let input = "\
Board:
    tags:
        ui: Interface
            color: #123456
% Task
#ui";
        let script = parse_tasks(input);
        assert_eq!(script.tag_meta["#ui"].name, "Interface");
        assert_eq!(script.tag_meta["#ui"].color, "#123456");
        assert_eq!(script.tags.len(), 1);
    }

    #[test]
    fn test_extra_states_are_flagged_not_dropped() {
        let input = "% Task\n!todo !done\nmore\n!blocked";
        let script = parse_tasks(input);
        let task = &script.tasks[0];
        assert_eq!(task.state.as_deref(), Some("!todo"));
        assert_eq!(script.invalid_state_tags.get(&1), Some(&vec!["!done".to_string()]));
        assert_eq!(script.invalid_state_tags.get(&3), Some(&vec!["!blocked".to_string()]));
        // Only the winning state is registered
        assert!(!script.states.contains("!blocked"));
        assert!(script.has_diagnostics());
    }

    #[test]
    fn test_state_per_task_is_independent() {
        let script = parse_tasks("% A\n!todo\n% B\n!done");
        assert!(script.invalid_state_tags.is_empty());
        assert_eq!(script.tasks[1].state.as_deref(), Some("!done"));
    }

    #[test]
    fn test_lines_before_first_task_are_dropped() {
        let script = parse_tasks("just some notes #tag\n% Task\nbody");
        assert_eq!(script.tasks.len(), 1);
        assert!(!script.tags.contains("#tag"));
        assert_eq!(script.tasks[0].description, vec!["body"]);
    }

    #[test]
    fn test_blank_lines_are_skipped_in_description() {
        let script = parse_tasks("% Task\n  first  \n\n   \nsecond");
        assert_eq!(script.tasks[0].description, vec!["first", "second"]);
        assert_eq!(script.tasks[0].description_line_indexes, vec![1, 4]);
    }

    #[test]
    fn test_body_goes_to_innermost_open_task() {
        let input = "\
% A
a body
    % B
b body
% C
c body";
        let script = parse_tasks(input);
        assert_eq!(script.tasks[0].description, vec!["a body"]);
        assert_eq!(script.tasks[1].description, vec!["b body"]);
        assert_eq!(script.tasks[2].description, vec!["c body"]);
    }

    #[test]
    fn test_all_tasks_preorder() {
        let input = "\
% A
    % A1
        % A1a
    % A2
% B
    % B1";
        let script = parse_tasks(input);
        assert_eq!(
            names(&script.all_tasks()),
            vec!["A", "A1", "A1a", "A2", "B", "B1"]
        );
        for task in script.all_tasks() {
            if let Some(parent) = script.parent_of(task) {
                assert_eq!(task.depth, parent.depth + 1);
            }
        }
    }

    #[test]
    fn test_orphaned_depth_is_accepted() {
        let input = "\
% A
        % Deep
deep body
% B";
        let script = parse_tasks(input);
        assert_eq!(script.tasks.len(), 3);
        assert_eq!(script.orphaned, vec![1]);
        let deep = &script.tasks[1];
        assert!(deep.parent.is_none());
        assert_eq!(deep.description, vec!["deep body"]);
        assert_eq!(names(&script.all_tasks()), vec!["A", "B"]);
    }

    #[test]
    fn test_shallower_task_closes_deeper_levels() {
        let input = "\
% A
    % B
        % C
    % D
            % E";
        let script = parse_tasks(input);
        // E skips a level under D; C is closed and must not adopt it
        let e = script.task_by_name("E");
        assert!(e.is_none());
        assert_eq!(script.orphaned, vec![4]);
        assert!(script.tasks[2].children.is_empty());
    }

    #[test]
    fn test_orphan_children_hang_off_orphan() {
        let script = parse_tasks("% A\n        % Deep\n            % Deeper");
        assert_eq!(script.tasks[2].parent, Some(1));
        assert_eq!(script.orphaned, vec![1]);
    }

    #[test]
    fn test_lookups() {
        let script = parse_tasks("Board:\n% A\nbody\n    % B\nb\n% A");
        assert_eq!(script.task_by_name("A").map(|t| t.line_index), Some(1));
        assert_eq!(script.task_at_line(3).map(|t| t.name.as_str()), Some("B"));
        assert!(script.task_at_line(2).is_none());
        assert_eq!(script.task_for_line(2).map(|t| t.name.as_str()), Some("A"));
        assert_eq!(script.task_for_line(4).map(|t| t.name.as_str()), Some("B"));
        assert!(script.task_for_line(0).is_none());
        let b = script.task_at_line(3).unwrap();
        assert_eq!(script.parent_of(b).map(|t| t.line_index), Some(1));
    }

    #[test]
    fn test_registry_completeness() {
        let input = "\
% A
#x @y !z {Ref}
    % B
#x #w @v !z !q";
        let script = parse_tasks(input);
        for task in script.all_tasks() {
            for tag in &task.tags {
                assert!(!script.tag_meta[tag].color.is_empty());
            }
            for person in &task.people {
                assert!(!script.people_meta[person].color.is_empty());
            }
            if let Some(state) = &task.state {
                assert!(!script.state_meta[state].color.is_empty());
            }
        }
    }

    #[test]
    fn test_custom_marker() {
        let syntax = Syntax {
            marker: '-',
            indent_width: 2,
        };
        let script = parse_tasks_with(&syntax, "- Parent\n  - Child\n% not a task");
        assert_eq!(script.tasks.len(), 2);
        assert_eq!(script.tasks[1].parent, Some(0));
        assert_eq!(script.tasks[1].description, vec!["% not a task"]);
    }
}
