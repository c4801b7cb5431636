//! Error types for the archive VFS engine.

use std::io;

use thiserror::Error;

/// Result type for VFS operations.
pub type VfsResult<T> = Result<T, VfsError>;

/// VFS engine errors.
///
/// Every variant carries the virtual path it concerns so the dispatcher can
/// render a status line without extra context.
#[derive(Debug, Error)]
pub enum VfsError {
    /// No archive entry or tracked empty directory matches the path.
    #[error("no such file or directory: {path}")]
    NotFound { path: String },

    /// A directory or file already occupies the path.
    #[error("file exists: {path}")]
    AlreadyExists { path: String },

    /// The byte-reversed content of a file is not valid UTF-8.
    #[error("invalid UTF-8 content: {path}")]
    Decode { path: String },

    /// Reading, writing or replacing the backing archive failed.
    #[error("archive i/o error on {path}: {source}")]
    ArchiveIo {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The backing archive could not be parsed.
    #[error("corrupt archive {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },

    /// Another holder owns the archive, so it cannot be rewritten.
    #[error("archive is locked by another process: {path}")]
    Locked { path: String },
}

impl VfsError {
    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        VfsError::NotFound { path: path.into() }
    }

    pub(crate) fn io(path: impl Into<String>, source: io::Error) -> Self {
        VfsError::ArchiveIo {
            path: path.into(),
            source,
        }
    }

    /// Map a zip error, keeping plain I/O failures distinct from format errors.
    pub(crate) fn zip(path: impl Into<String>, err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(source) => VfsError::io(path, source),
            zip::result::ZipError::FileNotFound => VfsError::not_found(path),
            other => VfsError::Corrupt {
                path: path.into(),
                source: other,
            },
        }
    }

    /// True if this is a `NotFound` error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, VfsError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_io_errors_stay_io() {
        let err = VfsError::zip("a.zip", zip::result::ZipError::Io(io::Error::other("disk")));
        assert!(matches!(err, VfsError::ArchiveIo { .. }));
    }

    #[test]
    fn zip_missing_file_is_not_found() {
        let err = VfsError::zip("dir/x.txt", zip::result::ZipError::FileNotFound);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "no such file or directory: dir/x.txt");
    }

    #[test]
    fn zip_format_errors_are_corrupt() {
        let err = VfsError::zip("a.zip", zip::result::ZipError::InvalidArchive("bad magic".into()));
        assert!(matches!(err, VfsError::Corrupt { .. }));
    }
}
