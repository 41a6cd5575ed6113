use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::model::settings::Settings;

/// File name looked up when no settings path is given
pub const SETTINGS_FILE: &str = "taskscript.toml";

/// Characters that already mean something inside a task body
const RESERVED_MARKERS: [char; 5] = ['#', '@', '!', '{', '}'];

/// Error type for settings loading
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse settings: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("task marker {0:?} is reserved for tokens or whitespace")]
    InvalidMarker(char),
    #[error("indent_width must be at least 1")]
    ZeroIndentWidth,
}

/// Walk up from `start` looking for a settings file.
pub fn discover_settings(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(SETTINGS_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Parse and validate settings text.
pub fn parse_settings(text: &str) -> Result<Settings, SettingsError> {
    let settings: Settings = toml::from_str(text)?;
    validate_settings(&settings)?;
    Ok(settings)
}

/// Load settings from a file.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let text = fs::read_to_string(path).map_err(|e| SettingsError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let settings = parse_settings(&text)?;
    debug!(path = %path.display(), marker = %settings.syntax.marker, indent_width = settings.syntax.indent_width, "loaded settings");
    Ok(settings)
}

/// Settings from `explicit` if given, else from the nearest settings file
/// above `cwd`, else defaults.
pub fn resolve_settings(explicit: Option<&Path>, cwd: &Path) -> Result<Settings, SettingsError> {
    match explicit {
        Some(path) => load_settings(path),
        None => match discover_settings(cwd) {
            Some(path) => load_settings(&path),
            None => Ok(Settings::default()),
        },
    }
}

pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    let marker = settings.syntax.marker;
    if marker.is_whitespace() || RESERVED_MARKERS.contains(&marker) {
        return Err(SettingsError::InvalidMarker(marker));
    }
    if settings.syntax.indent_width == 0 {
        return Err(SettingsError::ZeroIndentWidth);
    }
    Ok(())
}
