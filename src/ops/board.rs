use crate::model::script::Script;
use crate::util::color::{color_from_string, lighten_color};

/// How far column borders are pushed toward white
const BORDER_LIGHTEN: f64 = 0.5;

/// One kanban column: a state and the tasks currently in it
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// State token, with the `!` prefix
    pub state: String,
    pub title: String,
    pub color: String,
    pub border_color: String,
    /// Arena indexes into `Script::tasks`, in `all_tasks` order
    pub tasks: Vec<usize>,
}

/// Group tasks into columns by state.
///
/// Header-declared states come first in declaration order, then states that
/// only appear in task bodies, sorted. Tasks without a state are not placed.
pub fn board_columns(script: &Script) -> Vec<Column> {
    let declared: Vec<String> = script
        .config
        .states
        .iter()
        .map(|entry| format!("!{}", entry.key))
        .collect();
    let mut extra: Vec<&String> = script
        .states
        .iter()
        .filter(|state| !declared.contains(state))
        .collect();
    extra.sort();

    let mut order: Vec<String> = Vec::with_capacity(declared.len() + extra.len());
    for state in declared.iter().chain(extra.into_iter()) {
        if !order.contains(state) {
            order.push(state.clone());
        }
    }

    let placed = script.all_task_indexes();
    order
        .into_iter()
        .map(|state| {
            let key = state.trim_start_matches('!');
            let meta = script.state_meta.get(&state);
            let title = meta
                .map(|entry| entry.name.clone())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| capitalize(key));
            let color = meta
                .map(|entry| entry.color.clone())
                .filter(|color| !color.is_empty())
                .unwrap_or_else(|| color_from_string(key));
            let tasks = placed
                .iter()
                .copied()
                .filter(|&idx| script.tasks[idx].state.as_deref() == Some(state.as_str()))
                .collect();
            Column {
                border_color: lighten_color(&color, BORDER_LIGHTEN),
                state,
                title,
                color,
                tasks,
            }
        })
        .collect()
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_tasks;
    use pretty_assertions::assert_eq;

    fn names(script: &Script, column: &Column) -> Vec<String> {
        column
            .tasks
            .iter()
            .map(|&idx| script.tasks[idx].name.clone())
            .collect()
    }

    #[test]
    fn test_default_columns() {
        let script = parse_tasks("% A\n!todo\n% B\n!done\n% C\n!todo");
        let columns = board_columns(&script);

        let states: Vec<&str> = columns.iter().map(|c| c.state.as_str()).collect();
        assert_eq!(states, vec!["!todo", "!inprogress", "!done"]);
        assert_eq!(columns[0].title, "TODO");
        assert_eq!(names(&script, &columns[0]), vec!["A", "C"]);
        assert!(columns[1].tasks.is_empty());
        assert_eq!(names(&script, &columns[2]), vec!["B"]);
    }

    #[test]
    fn test_undeclared_states_follow_sorted() {
        let script = parse_tasks("% A\n!zeta\n% B\n!alpha\n% C\n!todo");
        let columns = board_columns(&script);
        let states: Vec<&str> = columns.iter().map(|c| c.state.as_str()).collect();
        assert_eq!(states, vec!["!todo", "!inprogress", "!done", "!alpha", "!zeta"]);
        assert_eq!(columns[3].title, "alpha");
    }

    #[test]
    fn test_header_states_and_colors() {
        let text = "\
Board:
    states:
        todo: Backlog
            color: #2f8fd6
        review
% A
    % B
    !review";
        let script = parse_tasks(text);
        let columns = board_columns(&script);

        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].title, "Backlog");
        assert_eq!(columns[0].color, "#2f8fd6");
        assert_eq!(columns[0].border_color, "#97c7eb");
        assert_eq!(columns[1].state, "!review");
        assert_eq!(names(&script, &columns[1]), vec!["B"]);
    }

    #[test]
    fn test_orphans_are_not_placed() {
        let script = parse_tasks("        % Lost\n        !todo\n% A\n!todo");
        let columns = board_columns(&script);
        assert_eq!(names(&script, &columns[0]), vec!["A"]);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("review"), "Review");
        assert_eq!(capitalize(""), "");
    }
}
