//! The cursor plus the live archive index.

use std::path::PathBuf;

use super::index::{ArchiveIndex, Listing};
use super::mutator::{ArchiveMutator, RemovalReport};
use super::path::{resolve, Resolved, VPath};
use crate::error::{VfsError, VfsResult};

/// Outcome of a successful `cd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CdOutcome {
    /// `.` or no argument.
    NoOp,
    /// `..` moved to the parent (or stayed at root).
    Parent(VPath),
    /// Moved into an existing directory.
    Changed(VPath),
}

/// Outcome of a successful `rmdir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removed {
    pub report: RemovalReport,
    /// Set when the cursor no longer existed after the removal and was moved up.
    pub cursor_reset: Option<VPath>,
}

/// One shell session over one archive.
///
/// Listings and file contents are read from the current generation on every
/// call; nothing is cached across a removal.
#[derive(Debug)]
pub struct VfsSession {
    cursor: VPath,
    index: ArchiveIndex,
    mutator: ArchiveMutator,
}

impl VfsSession {
    /// Open the archive at `path` with the cursor at root.
    pub fn open(path: impl Into<PathBuf>) -> VfsResult<Self> {
        Ok(Self::new(ArchiveIndex::open(path)?))
    }

    pub fn new(index: ArchiveIndex) -> Self {
        Self {
            cursor: VPath::root(),
            index,
            mutator: ArchiveMutator,
        }
    }

    pub fn cursor(&self) -> &VPath {
        &self.cursor
    }

    pub fn index(&self) -> &ArchiveIndex {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut ArchiveIndex {
        &mut self.index
    }

    /// List the cursor directory.
    pub fn list(&self) -> VfsResult<Listing> {
        self.index.list_directory(&self.cursor)
    }

    /// Change the cursor. Leaves it untouched on failure.
    pub fn change_directory(&mut self, arg: &str) -> VfsResult<CdOutcome> {
        match resolve(&self.cursor, arg) {
            Resolved::Stay => Ok(CdOutcome::NoOp),
            Resolved::Parent(parent) => {
                self.cursor = parent.clone();
                Ok(CdOutcome::Parent(parent))
            }
            Resolved::Target(target) => {
                // A path that normalizes to root names no archive entry.
                if target.is_root() || !self.index.exists(&target) {
                    tracing::debug!(cursor = %self.cursor, arg, "cd target does not exist");
                    return Err(VfsError::not_found(arg));
                }
                self.cursor = target.clone();
                Ok(CdOutcome::Changed(target))
            }
        }
    }

    /// Remove the directory `arg` (relative to the cursor) and its contents.
    ///
    /// The cursor directory can vanish with its last child. When it does, the
    /// cursor moves to the nearest ancestor that still exists.
    pub fn remove_directory(&mut self, arg: &str) -> VfsResult<Removed> {
        let target = self.cursor.join(arg);
        if target == self.cursor || target.is_root() {
            return Err(VfsError::not_found(arg));
        }
        let report = self.mutator.remove_subtree(&mut self.index, &target)?;

        let cursor_reset = if self.index.exists(&self.cursor) {
            None
        } else {
            let fallback = self
                .cursor
                .ancestors()
                .find(|dir| self.index.exists(dir))
                .unwrap_or_default();
            tracing::debug!(from = %self.cursor, to = %fallback, "cursor invalidated by rmdir");
            self.cursor = fallback.clone();
            Some(fallback)
        };

        Ok(Removed {
            report,
            cursor_reset,
        })
    }

    /// Read the file `arg` (relative to the cursor) with its bytes reversed.
    pub fn read_file_reversed(&mut self, arg: &str) -> VfsResult<String> {
        let target = self.cursor.join(arg);
        let mut data = self.index.open_file(&target)?;
        data.reverse();
        String::from_utf8(data).map_err(|_| VfsError::Decode {
            path: target.to_string(),
        })
    }

    /// Track `arg` (relative to the cursor) as an empty directory.
    ///
    /// The directory lives only in memory; the archive is not modified.
    pub fn make_directory(&mut self, arg: &str) -> VfsResult<VPath> {
        let target = self.cursor.join(arg);
        if target == self.cursor || self.index.exists(&target) || self.index.is_file(&target) {
            return Err(VfsError::AlreadyExists {
                path: target.to_string(),
            });
        }
        self.index.register_empty_dir(&target);
        Ok(target)
    }
}
