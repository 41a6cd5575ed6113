use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};

use crate::model::header::{BoardConfig, Entry};
use crate::model::task::{Task, TaskId};
use crate::model::token::TokenKind;

/// Everything derived from one parse of a task script.
///
/// Tasks live in `tasks` in declaration order; `children` and `parent` on each
/// task are indexes into that arena. The whole structure is rebuilt on every
/// parse and its line indexes go stale as soon as the text changes.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub config: BoardConfig,
    /// Every declared task in document order, orphans included
    pub tasks: Vec<Task>,
    /// Arena indexes of the depth-0 tasks
    pub roots: Vec<usize>,
    pub tags: IndexSet<String>,
    pub people: IndexSet<String>,
    pub states: IndexSet<String>,
    pub tag_meta: IndexMap<String, Entry>,
    pub people_meta: IndexMap<String, Entry>,
    pub state_meta: IndexMap<String, Entry>,
    /// Extra state tokens per body line, beyond a task's first state
    pub invalid_state_tags: BTreeMap<usize, Vec<String>>,
    /// Arena indexes of tasks indented past any open ancestor
    pub orphaned: Vec<usize>,
    /// The source split on `\n`
    pub lines: Vec<String>,
}

impl Script {
    /// Tasks reachable from the roots, parents before children.
    pub fn all_tasks(&self) -> Vec<&Task> {
        self.all_task_indexes()
            .into_iter()
            .map(|idx| &self.tasks[idx])
            .collect()
    }

    pub fn all_task_indexes(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.tasks.len());
        for &root in &self.roots {
            self.collect_preorder(root, &mut out);
        }
        out
    }

    fn collect_preorder(&self, idx: usize, out: &mut Vec<usize>) {
        out.push(idx);
        for &child in &self.tasks[idx].children {
            self.collect_preorder(child, out);
        }
    }

    pub fn root_tasks(&self) -> impl Iterator<Item = &Task> {
        self.roots.iter().map(|&idx| &self.tasks[idx])
    }

    pub fn parent_of(&self, task: &Task) -> Option<&Task> {
        task.parent.map(|idx| &self.tasks[idx])
    }

    pub fn children_of<'a>(&'a self, task: &'a Task) -> impl Iterator<Item = &'a Task> + 'a {
        task.children.iter().map(|&idx| &self.tasks[idx])
    }


    /// First reachable task with this exact name.
    pub fn task_by_name(&self, name: &str) -> Option<&Task> {
        self.all_tasks().into_iter().find(|t| t.name == name)
    }

    pub fn task_by_id(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Task declared exactly on `line`.
    pub fn task_at_line(&self, line: usize) -> Option<&Task> {
        self.tasks.iter().find(|t| t.line_index == line)
    }

    /// Task whose declaration or body contains `line`.
    pub fn task_for_line(&self, line: usize) -> Option<&Task> {
        self.tasks.iter().rev().find(|t| t.line_index <= line)
    }

    pub fn registry(&self, kind: TokenKind) -> &IndexSet<String> {
        match kind {
            TokenKind::Tag => &self.tags,
            TokenKind::Person => &self.people,
            TokenKind::State => &self.states,
        }
    }

    pub fn meta(&self, kind: TokenKind) -> &IndexMap<String, Entry> {
        match kind {
            TokenKind::Tag => &self.tag_meta,
            TokenKind::Person => &self.people_meta,
            TokenKind::State => &self.state_meta,
        }
    }

    /// Metadata for a prefixed token like `#urgent`.
    pub fn meta_for(&self, token: &str) -> Option<&Entry> {
        let kind = TokenKind::from_prefix(token.chars().next()?)?;
        self.meta(kind).get(token)
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.invalid_state_tags.is_empty() || !self.orphaned.is_empty()
    }
}
