//! Read-only view over one generation of the backing archive.
//!
//! The index pairs the archive's entry names with an in-memory set of empty
//! directories. Directories exist implicitly: any entry name that starts with
//! `dir/` makes `dir` a directory, whether that entry is a file or a
//! zero-length `dir/` marker.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use super::path::VPath;
use crate::error::{VfsError, VfsResult};

/// Result of listing a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// Immediate child names, sorted and deduplicated.
    Entries(Vec<String>),
    /// The directory exists but has no children.
    Empty,
}

/// Archive snapshot plus the empty-directory side table.
pub struct ArchiveIndex {
    archive_path: PathBuf,
    handle: Option<ZipArchive<File>>,
    names: Vec<String>,
    empty_dirs: BTreeSet<String>,
    generation: u64,
}

impl std::fmt::Debug for ArchiveIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveIndex")
            .field("archive_path", &self.archive_path)
            .field("open", &self.handle.is_some())
            .field("entries", &self.names.len())
            .field("empty_dirs", &self.empty_dirs)
            .field("generation", &self.generation)
            .finish()
    }
}

impl ArchiveIndex {
    /// Open the archive at `path` as generation 0.
    pub fn open(path: impl Into<PathBuf>) -> VfsResult<Self> {
        let archive_path = path.into();
        let (handle, names) = load(&archive_path)?;
        tracing::debug!(
            archive = %archive_path.display(),
            entries = names.len(),
            "opened archive"
        );
        Ok(Self {
            archive_path,
            handle: Some(handle),
            names,
            empty_dirs: BTreeSet::new(),
            generation: 0,
        })
    }

    /// Path of the backing archive file.
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Generation number; bumped every time the archive is rewritten.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Entry names of the current generation, in archive order.
    pub fn entry_names(&self) -> &[String] {
        &self.names
    }

    /// Tracked empty directories, each ending in `/`.
    pub fn empty_dirs(&self) -> impl Iterator<Item = &str> {
        self.empty_dirs.iter().map(String::as_str)
    }

    /// Track `dir` as an empty directory. Returns false if already tracked.
    pub fn register_empty_dir(&mut self, dir: &VPath) -> bool {
        if dir.is_root() {
            return false;
        }
        self.empty_dirs.insert(dir.dir_prefix())
    }

    /// List the immediate children of `dir`.
    pub fn list_directory(&self, dir: &VPath) -> VfsResult<Listing> {
        let prefix = dir.dir_prefix();
        let children: BTreeSet<&str> = self
            .names
            .iter()
            .map(String::as_str)
            .chain(self.empty_dirs())
            .filter_map(|name| child_segment(name, &prefix))
            .collect();

        if !children.is_empty() {
            return Ok(Listing::Entries(
                children.into_iter().map(str::to_owned).collect(),
            ));
        }
        if self.exists(dir) {
            Ok(Listing::Empty)
        } else {
            Err(VfsError::not_found(dir.as_str()))
        }
    }

    /// True if `dir` is the root, prefixes an archive entry, or is a tracked
    /// empty directory.
    pub fn exists(&self, dir: &VPath) -> bool {
        if dir.is_root() {
            return true;
        }
        let prefix = dir.dir_prefix();
        self.names.iter().any(|name| name.starts_with(&prefix)) || self.empty_dirs.contains(&prefix)
    }

    /// True if `path` names a file entry exactly.
    pub fn is_file(&self, path: &VPath) -> bool {
        !path.is_root() && self.names.iter().any(|name| name == path.as_str())
    }

    /// Read the content of the file entry named exactly `path`.
    pub fn open_file(&mut self, path: &VPath) -> VfsResult<Vec<u8>> {
        if !self.is_file(path) {
            return Err(VfsError::not_found(path.as_str()));
        }
        let handle = self.handle_mut()?;
        let mut entry = handle
            .by_name(path.as_str())
            .map_err(|e| VfsError::zip(path.as_str(), e))?;
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut data)
            .map_err(|e| VfsError::io(path.as_str(), e))?;
        Ok(data)
    }

    pub(crate) fn handle_mut(&mut self) -> VfsResult<&mut ZipArchive<File>> {
        let archive = self.archive_path.display().to_string();
        self.handle.as_mut().ok_or_else(|| {
            VfsError::io(archive, std::io::Error::other("archive handle is closed"))
        })
    }

    /// Drop every tracked empty directory at or beneath `prefix`.
    pub(crate) fn forget_empty_dirs_under(&mut self, prefix: &str) -> usize {
        let before = self.empty_dirs.len();
        self.empty_dirs.retain(|dir| !dir.starts_with(prefix));
        before - self.empty_dirs.len()
    }

    /// Close the read handle ahead of replacing the file on disk.
    pub(crate) fn close(&mut self) {
        self.handle = None;
    }

    /// Reopen the file on disk without advancing the generation.
    ///
    /// Used after a failed replacement, when the original is still in place.
    pub(crate) fn reopen_current(&mut self) -> VfsResult<()> {
        let (handle, names) = load(&self.archive_path)?;
        self.handle = Some(handle);
        self.names = names;
        Ok(())
    }

    /// Open the freshly replaced file as the next generation.
    pub(crate) fn advance_generation(&mut self) -> VfsResult<u64> {
        self.reopen_current()?;
        self.generation += 1;
        Ok(self.generation)
    }
}

fn load(path: &Path) -> VfsResult<(ZipArchive<File>, Vec<String>)> {
    let display = path.display().to_string();
    let file = File::open(path).map_err(|e| VfsError::io(&display, e))?;
    let archive = ZipArchive::new(file).map_err(|e| VfsError::zip(&display, e))?;
    let names = archive.file_names().map(str::to_owned).collect();
    Ok((archive, names))
}

/// First path segment of `name` below `prefix`, if `name` lies strictly under it.
fn child_segment<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = name.strip_prefix(prefix)?;
    let segment = rest.split('/').next()?;
    (!segment.is_empty()).then_some(segment)
}
