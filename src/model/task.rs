use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a task within one parse result.
///
/// Parsing hands out document-order ids; `ops::identity::IdReconciler` can
/// rewrite them so that unchanged tasks keep their id across re-parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// A task declared in a task script, with everything extracted from its body.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    /// Text after the marker on the declaration line, trimmed
    pub name: String,
    /// Nesting depth (0 = top-level), from the declaration's indentation
    pub depth: usize,
    /// Arena index of the parent task. Non-owning; used for upward traversal only.
    pub parent: Option<usize>,
    /// Tags in occurrence order, with the `#` prefix. Duplicates are kept.
    pub tags: Vec<String>,
    /// People in occurrence order, with the `@` prefix
    pub people: Vec<String>,
    /// First state token found in the body, with the `!` prefix
    pub state: Option<String>,
    /// Trimmed, non-blank body lines
    pub description: Vec<String>,
    /// Source line of each `description` entry
    pub description_line_indexes: Vec<usize>,
    /// `{Name}` reference targets in occurrence order
    pub references: Vec<String>,
    /// Arena indexes of direct subtasks in declaration order
    pub children: Vec<usize>,
    /// Line of the declaration (0-indexed)
    pub line_index: usize,
}

impl Task {
    pub fn new(id: TaskId, name: String, depth: usize, line_index: usize) -> Self {
        Task {
            id,
            name,
            depth,
            parent: None,
            tags: Vec::new(),
            people: Vec::new(),
            state: None,
            description: Vec::new(),
            description_line_indexes: Vec::new(),
            references: Vec::new(),
            children: Vec::new(),
            line_index,
        }
    }

    /// Content signature used to carry identities across re-parses.
    pub fn signature(&self) -> String {
        let mut signature = self.name.clone();
        for line in &self.description {
            signature.push('\n');
            signature.push_str(line);
        }
        signature
    }
}
