use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::script_io::{self, ScriptIoError};
use crate::io::settings_io::{self, SettingsError};
use crate::model::script::Script;
use crate::model::task::Task;
use crate::model::token::TokenKind;
use crate::ops::{board, format, search, suggest, task_ops, token_ops};
use crate::ops::task_ops::TaskOpError;
use crate::parse::{Syntax, parse_tasks_with};

/// Error type for CLI commands
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    ScriptIo(#[from] ScriptIoError),
    #[error(transparent)]
    TaskOp(#[from] TaskOpError),
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("invalid token '{0}' (expected #tag, @person or !state)")]
    InvalidToken(String),
    #[error("invalid state '{0}'")]
    InvalidState(String),
    #[error("no checkbox on line {0}")]
    NoCheckbox(usize),
    #[error("could not encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("script has {0} problem(s)")]
    CheckFailed(usize),
}

/// A loaded script file and the syntax it is read with
struct Document {
    path: PathBuf,
    text: String,
    syntax: Syntax,
}

impl Document {
    fn load(path: &Path, config: Option<&Path>) -> Result<Document, CliError> {
        let search_from = match path.parent() {
            Some(parent) if !script_io::is_stdin(path) && !parent.as_os_str().is_empty() => {
                parent.to_path_buf()
            }
            _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };
        let settings = settings_io::resolve_settings(config, &search_from)?;
        let text = script_io::read_script(path)?;
        debug!(path = %path.display(), bytes = text.len(), "loaded script");
        Ok(Document {
            path: path.to_path_buf(),
            text,
            syntax: settings.syntax,
        })
    }

    fn parse(&self) -> Script {
        parse_tasks_with(&self.syntax, &self.text)
    }

    /// Print the edited text, or write it back when `write` is set.
    fn emit(&self, updated: &str, write: bool, summary: &str) -> Result<(), CliError> {
        if write {
            script_io::write_script(&self.path, updated)?;
            println!("{}", summary);
        } else {
            println!("{}", updated);
        }
        Ok(())
    }
}

/// Find a task by exact name, tree order first, then orphans.
fn find_task<'a>(script: &'a Script, name: &str) -> Result<&'a Task, CliError> {
    script
        .task_by_name(name)
        .or_else(|| script.tasks.iter().find(|t| t.name == name))
        .ok_or_else(|| CliError::TaskNotFound(name.to_string()))
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), CliError> {
    let json = cli.json;
    let config = cli.config.as_deref();

    match cli.command {
        // Read commands
        Commands::Parse(args) => cmd_parse(args, config, json),
        Commands::Check(args) => cmd_check(args, config, json),
        Commands::Board(args) => cmd_board(args, config, json),
        Commands::Search(args) => cmd_search(args, config, json),
        Commands::Suggest(args) => cmd_suggest(args, config, json),

        // Write commands
        Commands::Fmt(args) => cmd_fmt(args, config),
        Commands::Tag(args) => cmd_tag(args, config),
        Commands::State(args) => cmd_state(args, config),
        Commands::Mv(args) => cmd_mv(args, config),
        Commands::Toggle(args) => cmd_toggle(args, config),
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_parse(args: FileArgs, config: Option<&Path>, json: bool) -> Result<(), CliError> {
    let doc = Document::load(&args.file, config)?;
    let script = doc.parse();

    if json {
        println!("{}", serde_json::to_string_pretty(&script_to_json(&script))?);
        return Ok(());
    }

    println!("== {} ==", script.config.board_name);
    for task in script.root_tasks() {
        for line in format_task_tree(&script, task, 0) {
            println!("{}", line);
        }
    }
    if !script.orphaned.is_empty() {
        println!();
        println!("orphaned:");
        for &idx in &script.orphaned {
            for line in format_task_tree(&script, &script.tasks[idx], 1) {
                println!("{}", line);
            }
        }
    }
    println!();
    for kind in [TokenKind::State, TokenKind::Tag, TokenKind::Person] {
        if let Some(line) = format_registry(&script, kind) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_check(args: FileArgs, config: Option<&Path>, json: bool) -> Result<(), CliError> {
    let doc = Document::load(&args.file, config)?;
    let script = doc.parse();
    let problems = script.invalid_state_tags.len() + script.orphaned.len();

    if json {
        println!("{}", serde_json::to_string_pretty(&diagnostics_to_json(&script))?);
    } else if problems == 0 {
        println!("ok");
    } else {
        for line in format_diagnostics(&script) {
            println!("{}", line);
        }
    }

    if script.has_diagnostics() {
        return Err(CliError::CheckFailed(problems));
    }
    Ok(())
}

fn cmd_board(args: FileArgs, config: Option<&Path>, json: bool) -> Result<(), CliError> {
    let doc = Document::load(&args.file, config)?;
    let script = doc.parse();
    let columns = board::board_columns(&script);

    if json {
        let out: Vec<ColumnJson> = columns.iter().map(|c| column_to_json(&script, c)).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            println!();
        }
        for line in format_column(&script, column) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_search(args: SearchArgs, config: Option<&Path>, json: bool) -> Result<(), CliError> {
    let doc = Document::load(&args.file, config)?;
    let script = doc.parse();

    let fields = if args.name || args.description || args.tags || args.people {
        search::SearchFields {
            name: args.name,
            description: args.description,
            tags: args.tags,
            people: args.people,
        }
    } else {
        search::SearchFields::default()
    };
    let hits = search::search_tasks(&script, &args.query, fields);

    if json {
        let out: Vec<SearchHitJson> = hits.iter().map(|h| hit_to_json(&script, h)).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for hit in &hits {
        let task = &script.tasks[hit.task];
        println!("{}: {}", task.line_index + 1, format_task_line(task));
    }
    Ok(())
}

fn cmd_suggest(args: SuggestArgs, config: Option<&Path>, json: bool) -> Result<(), CliError> {
    let doc = Document::load(&args.file, config)?;
    let script = doc.parse();
    let suggestions = suggest::suggest(&script, &args.prefix);

    if json {
        let out = suggestions.as_ref().map(suggestions_to_json);
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if let Some(suggestions) = suggestions {
        for item in &suggestions.items {
            println!("{}", item);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_fmt(args: FmtArgs, config: Option<&Path>) -> Result<(), CliError> {
    let doc = Document::load(&args.file, config)?;
    let formatted = format::format_task_script(&doc.syntax, &doc.text);
    let summary = if formatted == doc.text {
        format!("{} already formatted", doc.path.display())
    } else {
        format!("formatted {}", doc.path.display())
    };
    doc.emit(&formatted, args.write, &summary)
}

fn cmd_tag(args: TagArgs, config: Option<&Path>) -> Result<(), CliError> {
    if TokenKind::of(&args.token).is_none() {
        return Err(CliError::InvalidToken(args.token));
    }
    let doc = Document::load(&args.file, config)?;
    let script = doc.parse();
    let task = find_task(&script, &args.task)?;

    let (updated, action) = if args.remove {
        (token_ops::remove_token(&doc.syntax, &doc.text, task, &args.token), "rm")
    } else {
        (token_ops::add_token(&doc.syntax, &doc.text, task, &args.token), "add")
    };
    doc.emit(&updated, args.write, &format!("{} tag {} {}", task.name, action, args.token))
}

fn cmd_state(args: StateArgs, config: Option<&Path>) -> Result<(), CliError> {
    let state = match args.state {
        Some(raw) => {
            let token = if raw.starts_with('!') { raw.clone() } else { format!("!{}", raw) };
            if TokenKind::of(&token) != Some(TokenKind::State) {
                return Err(CliError::InvalidState(raw));
            }
            Some(token)
        }
        None => None,
    };
    let doc = Document::load(&args.file, config)?;
    let script = doc.parse();
    let task = find_task(&script, &args.task)?;

    let updated = token_ops::update_task_state(&doc.syntax, &doc.text, task, state.as_deref());
    let summary = match &state {
        Some(state) => format!("{} state {}", task.name, state),
        None => format!("{} state cleared", task.name),
    };
    doc.emit(&updated, args.write, &summary)
}

fn cmd_mv(args: MvArgs, config: Option<&Path>) -> Result<(), CliError> {
    let doc = Document::load(&args.file, config)?;
    let script = doc.parse();
    let source = find_task(&script, &args.task)?;
    let target = find_task(&script, &args.parent)?;

    let updated =
        task_ops::move_task_as_subtask(&doc.syntax, &doc.text, source.line_index, target.line_index)?;
    doc.emit(&updated, args.write, &format!("{} moved under {}", source.name, target.name))
}

fn cmd_toggle(args: ToggleArgs, config: Option<&Path>) -> Result<(), CliError> {
    let line = args.line.checked_sub(1).ok_or(CliError::NoCheckbox(args.line))?;
    let checked = match (args.on, args.off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };
    let doc = Document::load(&args.file, config)?;
    let updated = task_ops::toggle_checkbox(&doc.text, line, checked).map_err(|e| match e {
        TaskOpError::NotACheckbox(_) => CliError::NoCheckbox(args.line),
        other => CliError::TaskOp(other),
    })?;
    doc.emit(&updated, args.write, &format!("toggled line {}", args.line))
}
