use serde::{Deserialize, Serialize};

use crate::parse::syntax::Syntax;

/// Settings read from `taskscript.toml`
///
/// ```toml
/// [syntax]
/// marker = "%"
/// indent_width = 4
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub syntax: Syntax,
}
