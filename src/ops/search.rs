use std::collections::BTreeSet;

use crate::model::script::Script;
use crate::model::task::Task;

/// Which field of a task matched a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    Name,
    Description,
    Tags,
    People,
}

impl MatchField {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchField::Name => "name",
            MatchField::Description => "description",
            MatchField::Tags => "tags",
            MatchField::People => "people",
        }
    }
}

/// Fields a search looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFields {
    pub name: bool,
    pub description: bool,
    pub tags: bool,
    pub people: bool,
}

impl Default for SearchFields {
    fn default() -> Self {
        SearchFields {
            name: true,
            description: true,
            tags: true,
            people: true,
        }
    }
}

impl SearchFields {
    fn enabled(&self, field: MatchField) -> bool {
        match field {
            MatchField::Name => self.name,
            MatchField::Description => self.description,
            MatchField::Tags => self.tags,
            MatchField::People => self.people,
        }
    }
}

/// A task that matched, with every field that contained the query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Arena index into `Script::tasks`
    pub task: usize,
    pub fields: Vec<MatchField>,
}

const ALL_FIELDS: [MatchField; 4] = [
    MatchField::Name,
    MatchField::Description,
    MatchField::Tags,
    MatchField::People,
];

fn field_text(task: &Task, field: MatchField) -> String {
    match field {
        MatchField::Name => task.name.clone(),
        MatchField::Description => task.description.join(" "),
        MatchField::Tags => task.tags.join(" "),
        MatchField::People => task.people.join(" "),
    }
}

/// Fields of `task` that contain `query`, ignoring case.
fn matching_fields(task: &Task, query: &str, fields: SearchFields) -> Vec<MatchField> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    ALL_FIELDS
        .into_iter()
        .filter(|&field| fields.enabled(field))
        .filter(|&field| field_text(task, field).to_lowercase().contains(&needle))
        .collect()
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Case-insensitive substring match over the selected fields. An empty query
/// matches nothing.
pub fn matches_search(task: &Task, query: &str, fields: SearchFields) -> bool {
    !matching_fields(task, query, fields).is_empty()
}

/// Search every reachable task, in tree order.
pub fn search_tasks(script: &Script, query: &str, fields: SearchFields) -> Vec<SearchHit> {
    script
        .all_task_indexes()
        .into_iter()
        .filter_map(|idx| {
            let matched = matching_fields(&script.tasks[idx], query, fields);
            (!matched.is_empty()).then_some(SearchHit {
                task: idx,
                fields: matched,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Tag and people selection. An empty selection lets everything through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub tags: BTreeSet<String>,
    pub people: BTreeSet<String>,
}

impl Filters {
    pub fn is_active(&self) -> bool {
        !self.tags.is_empty() || !self.people.is_empty()
    }
}

/// Whether a task carries any of the selected tags or people.
pub fn matches_filters(task: &Task, filters: &Filters) -> bool {
    if !filters.is_active() {
        return true;
    }
    task.tags.iter().any(|tag| filters.tags.contains(tag))
        || task.people.iter().any(|person| filters.people.contains(person))
}
