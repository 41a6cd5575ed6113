use serde::Serialize;

use crate::model::script::Script;
use crate::model::task::{Task, TaskId};
use crate::model::token::TokenKind;
use crate::ops::board::Column;
use crate::ops::search::SearchHit;
use crate::ops::suggest::Suggestions;
use crate::parse::blocks::{Block, classify_blocks};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: TaskId,
    pub name: String,
    /// 1-based line of the declaration
    pub line: usize,
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub people: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<String>,
    /// Description laid out as blocks; checkbox lines are 1-based
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct EntryJson {
    pub token: String,
    pub name: String,
    pub color: String,
}

#[derive(Serialize)]
pub struct ScriptJson {
    pub board_name: String,
    pub states: Vec<EntryJson>,
    pub tags: Vec<EntryJson>,
    pub people: Vec<EntryJson>,
    pub tasks: Vec<TaskJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orphaned: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct ExtraStatesJson {
    pub line: usize,
    pub tokens: Vec<String>,
}

#[derive(Serialize)]
pub struct OrphanJson {
    pub line: usize,
    pub name: String,
}

#[derive(Serialize)]
pub struct DiagnosticsJson {
    pub extra_states: Vec<ExtraStatesJson>,
    pub orphaned: Vec<OrphanJson>,
}

#[derive(Serialize)]
pub struct ColumnJson {
    pub state: String,
    pub title: String,
    pub color: String,
    pub border_color: String,
    pub tasks: Vec<String>,
}

#[derive(Serialize)]
pub struct SearchHitJson {
    pub name: String,
    pub line: usize,
    pub fields: Vec<&'static str>,
}

#[derive(Serialize)]
pub struct SuggestJson {
    pub trigger: char,
    pub partial: String,
    pub items: Vec<String>,
}

pub fn task_to_json(script: &Script, task: &Task) -> TaskJson {
    TaskJson {
        id: task.id,
        name: task.name.clone(),
        line: task.line_index + 1,
        depth: task.depth,
        state: task.state.clone(),
        tags: task.tags.clone(),
        people: task.people.clone(),
        references: task.references.clone(),
        description: task.description.clone(),
        blocks: description_blocks(task),
        subtasks: script
            .children_of(task)
            .map(|child| task_to_json(script, child))
            .collect(),
    }
}

fn description_blocks(task: &Task) -> Vec<Block> {
    let mut blocks = classify_blocks(&task.description, &task.description_line_indexes);
    for block in &mut blocks {
        if let Block::Checkbox { line: Some(line), .. } = block {
            *line += 1;
        }
    }
    blocks
}

fn registry_to_json(script: &Script, kind: TokenKind) -> Vec<EntryJson> {
    script
        .registry(kind)
        .iter()
        .map(|token| {
            let meta = script.meta(kind).get(token);
            EntryJson {
                token: token.clone(),
                name: meta.map(|m| m.name.clone()).unwrap_or_default(),
                color: meta.map(|m| m.color.clone()).unwrap_or_default(),
            }
        })
        .collect()
}

pub fn script_to_json(script: &Script) -> ScriptJson {
    ScriptJson {
        board_name: script.config.board_name.clone(),
        states: registry_to_json(script, TokenKind::State),
        tags: registry_to_json(script, TokenKind::Tag),
        people: registry_to_json(script, TokenKind::Person),
        tasks: script
            .root_tasks()
            .map(|task| task_to_json(script, task))
            .collect(),
        orphaned: script
            .orphaned
            .iter()
            .map(|&idx| task_to_json(script, &script.tasks[idx]))
            .collect(),
    }
}

pub fn diagnostics_to_json(script: &Script) -> DiagnosticsJson {
    DiagnosticsJson {
        extra_states: script
            .invalid_state_tags
            .iter()
            .map(|(&line, tokens)| ExtraStatesJson {
                line: line + 1,
                tokens: tokens.clone(),
            })
            .collect(),
        orphaned: script
            .orphaned
            .iter()
            .map(|&idx| OrphanJson {
                line: script.tasks[idx].line_index + 1,
                name: script.tasks[idx].name.clone(),
            })
            .collect(),
    }
}

pub fn column_to_json(script: &Script, column: &Column) -> ColumnJson {
    ColumnJson {
        state: column.state.clone(),
        title: column.title.clone(),
        color: column.color.clone(),
        border_color: column.border_color.clone(),
        tasks: column
            .tasks
            .iter()
            .map(|&idx| script.tasks[idx].name.clone())
            .collect(),
    }
}

pub fn hit_to_json(script: &Script, hit: &SearchHit) -> SearchHitJson {
    let task = &script.tasks[hit.task];
    SearchHitJson {
        name: task.name.clone(),
        line: task.line_index + 1,
        fields: hit.fields.iter().map(|f| f.as_str()).collect(),
    }
}

pub fn suggestions_to_json(suggestions: &Suggestions) -> SuggestJson {
    SuggestJson {
        trigger: suggestions.trigger,
        partial: suggestions.partial.clone(),
        items: suggestions.items.clone(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task) -> String {
    let mut parts = vec![task.name.clone()];
    if let Some(state) = &task.state {
        parts.push(state.clone());
    }
    parts.extend(task.tags.iter().cloned());
    parts.extend(task.people.iter().cloned());
    parts.join(" ")
}

/// Format a task with its subtasks, indented
pub fn format_task_tree(script: &Script, task: &Task, indent: usize) -> Vec<String> {
    let mut lines = vec![format!("{}{}", "  ".repeat(indent), format_task_line(task))];
    for child in script.children_of(task) {
        lines.extend(format_task_tree(script, child, indent + 1));
    }
    lines
}

/// Registry listing: `states: !todo (TODO) !done (Done)`
pub fn format_registry(script: &Script, kind: TokenKind) -> Option<String> {
    let registry = script.registry(kind);
    if registry.is_empty() {
        return None;
    }
    let label = match kind {
        TokenKind::State => "states",
        TokenKind::Tag => "tags",
        TokenKind::Person => "people",
    };
    let items: Vec<String> = registry
        .iter()
        .map(|token| match script.meta(kind).get(token) {
            Some(meta) if meta.name != meta.key => format!("{} ({})", token, meta.name),
            _ => token.clone(),
        })
        .collect();
    Some(format!("{}: {}", label, items.join(" ")))
}

pub fn format_diagnostics(script: &Script) -> Vec<String> {
    let mut lines = Vec::new();
    for (line, tokens) in &script.invalid_state_tags {
        lines.push(format!("line {}: extra state {}", line + 1, tokens.join(" ")));
    }
    for &idx in &script.orphaned {
        let task = &script.tasks[idx];
        lines.push(format!(
            "line {}: orphaned task '{}' (no parent at depth {})",
            task.line_index + 1,
            task.name,
            task.depth.saturating_sub(1)
        ));
    }
    lines
}

pub fn format_column(script: &Script, column: &Column) -> Vec<String> {
    let mut lines = vec![format!(
        "== {} ({}, {}) ==",
        column.title,
        column.state,
        column.tasks.len()
    )];
    for &idx in &column.tasks {
        lines.push(format!("  {}", script.tasks[idx].name));
    }
    lines
}
