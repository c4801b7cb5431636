//! Startup scripts: a text file of commands fed to the kernel in order.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors loading a startup script. These are reported to the user; they are
/// not VFS errors and never end the session.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Startup script '{}' not found.", path.display())]
    Missing { path: PathBuf },

    #[error("Failed to read startup script '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Read the commands in the script at `path`.
pub fn load(path: &Path) -> Result<Vec<String>, ScriptError> {
    let source = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ScriptError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            ScriptError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    Ok(commands(&source).map(str::to_owned).collect())
}

/// Commands in `source`: trimmed lines, skipping blanks and `#` comment
/// lines. A `#!` line is just another comment.
pub fn commands(source: &str) -> impl Iterator<Item = &str> {
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blanks_and_comments() {
        let source = "#!/usr/bin/env arksh\nls\n\n  cd dir1  \n# note\ntac file1.txt\n";
        let got: Vec<_> = commands(source).collect();
        assert_eq!(got, vec!["ls", "cd dir1", "tac file1.txt"]);
    }

    #[test]
    fn missing_script_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.txt");
        let err = load(&path).unwrap_err();
        assert!(matches!(err, ScriptError::Missing { .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn loads_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("start.txt");
        std::fs::write(&path, "cd dir2\nls\ncd ..\n").unwrap();
        assert_eq!(load(&path).unwrap(), vec!["cd dir2", "ls", "cd .."]);
    }
}
