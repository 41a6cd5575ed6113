use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tsk", about = concat!("tsk v", env!("CARGO_PKG_VERSION"), " - plain text task scripts"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Settings file (default: nearest taskscript.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the task tree and registries
    Parse(FileArgs),
    /// Report extra state tokens and orphaned tasks
    Check(FileArgs),
    /// Normalize whitespace and hoist state tokens
    Fmt(FmtArgs),
    /// Add or remove a #tag, @person or !state on a task
    Tag(TagArgs),
    /// Set or clear a task's state
    State(StateArgs),
    /// Make a task a subtask of another
    Mv(MvArgs),
    /// Flip a checkbox line
    Toggle(ToggleArgs),
    /// Group tasks into kanban columns by state
    Board(FileArgs),
    /// Search tasks by substring
    Search(SearchArgs),
    /// Complete a partially typed token
    Suggest(SuggestArgs),
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct FileArgs {
    /// Task script (`-` for stdin)
    pub file: PathBuf,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Task script (`-` for stdin)
    pub file: PathBuf,
    /// Text to look for (case-insensitive)
    pub query: String,
    /// Search task names
    #[arg(long)]
    pub name: bool,
    /// Search descriptions
    #[arg(long)]
    pub description: bool,
    /// Search tags
    #[arg(long)]
    pub tags: bool,
    /// Search people
    #[arg(long)]
    pub people: bool,
}

#[derive(Args)]
pub struct SuggestArgs {
    /// Task script (`-` for stdin)
    pub file: PathBuf,
    /// Text left of the cursor, ending in the partial token
    pub prefix: String,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct FmtArgs {
    /// Task script (`-` for stdin)
    pub file: PathBuf,
    /// Rewrite the file instead of printing
    #[arg(long)]
    pub write: bool,
}

#[derive(Args)]
pub struct TagArgs {
    /// Task script (`-` for stdin)
    pub file: PathBuf,
    /// Task name
    pub task: String,
    /// Token with prefix: #tag, @person or !state
    pub token: String,
    /// Remove the token instead of adding it
    #[arg(long)]
    pub remove: bool,
    /// Rewrite the file instead of printing
    #[arg(long)]
    pub write: bool,
}

#[derive(Args)]
pub struct StateArgs {
    /// Task script (`-` for stdin)
    pub file: PathBuf,
    /// Task name
    pub task: String,
    /// New state, with or without `!` (omit to clear)
    pub state: Option<String>,
    /// Rewrite the file instead of printing
    #[arg(long)]
    pub write: bool,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task script (`-` for stdin)
    pub file: PathBuf,
    /// Task to move
    pub task: String,
    /// New parent task
    pub parent: String,
    /// Rewrite the file instead of printing
    #[arg(long)]
    pub write: bool,
}

#[derive(Args)]
pub struct ToggleArgs {
    /// Task script (`-` for stdin)
    pub file: PathBuf,
    /// Line number of the checkbox (1-based)
    pub line: usize,
    /// Force checked
    #[arg(long, conflicts_with = "off")]
    pub on: bool,
    /// Force unchecked
    #[arg(long)]
    pub off: bool,
    /// Rewrite the file instead of printing
    #[arg(long)]
    pub write: bool,
}
