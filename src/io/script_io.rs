use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Path argument that means "standard input"
pub const STDIN_PATH: &str = "-";

/// Error type for reading and writing script files
#[derive(Debug, thiserror::Error)]
pub enum ScriptIoError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("cannot write back to standard input")]
    WriteToStdin,
}

pub fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN_PATH
}

/// Read a script from `path`, or from standard input for `-`.
pub fn read_script(path: &Path) -> Result<String, ScriptIoError> {
    let result = if is_stdin(path) {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map(|_| text)
    } else {
        fs::read_to_string(path)
    };
    result.map_err(|e| ScriptIoError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Replace the file at `path` through a temp file in the same directory.
pub fn write_script(path: &Path, content: &str) -> Result<(), ScriptIoError> {
    if is_stdin(path) {
        return Err(ScriptIoError::WriteToStdin);
    }
    atomic_write(path, content.as_bytes()).map_err(|e| ScriptIoError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tasks.txt");
        write_script(&path, "% A\n#x").unwrap();
        assert_eq!(read_script(&path).unwrap(), "% A\n#x");

        write_script(&path, "% B").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "% B");
    }

    #[test]
    fn test_read_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = read_script(&tmp.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, ScriptIoError::ReadError { .. }));
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn test_stdin_is_not_writable() {
        assert!(matches!(
            write_script(Path::new("-"), "x"),
            Err(ScriptIoError::WriteToStdin)
        ));
    }
}
