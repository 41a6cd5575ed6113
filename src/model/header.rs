use serde::{Deserialize, Serialize};

pub const DEFAULT_BOARD_NAME: &str = "Task Script";

/// A canonical tag, person or state declared in the header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Bare key, without the token prefix
    pub key: String,
    /// Display name (defaults to the key)
    pub name: String,
    /// Color; empty means "derive from the key"
    pub color: String,
}

impl Entry {
    pub fn new(key: &str, name: &str, color: &str) -> Self {
        Entry {
            key: key.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}

/// Board configuration from the optional script header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub board_name: String,
    pub states: Vec<Entry>,
    pub people: Vec<Entry>,
    pub tags: Vec<Entry>,
}

impl BoardConfig {
    pub fn default_states() -> Vec<Entry> {
        vec![
            Entry::new("todo", "TODO", ""),
            Entry::new("inprogress", "In progress", ""),
            Entry::new("done", "Done", ""),
        ]
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            board_name: DEFAULT_BOARD_NAME.to_string(),
            states: BoardConfig::default_states(),
            people: Vec::new(),
            tags: Vec::new(),
        }
    }
}
