//! Subtree removal by rebuilding the backing archive.
//!
//! The archive format has no in-place delete, so removal streams every entry
//! that survives into a temporary archive beside the original and then
//! renames it over the original path. Until that rename succeeds the original
//! file, the open handle and the empty-directory set are untouched.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use fs2::FileExt;
use tempfile::NamedTempFile;
use zip::ZipWriter;

use super::index::ArchiveIndex;
use super::path::VPath;
use crate::error::{VfsError, VfsResult};

/// What a successful removal did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalReport {
    /// The removed directory.
    pub target: VPath,
    /// Archive entries dropped from the rewritten archive.
    pub entries_removed: usize,
    /// Archive entries copied into the rewritten archive.
    pub entries_kept: usize,
    /// Empty directories forgotten from the side table.
    pub empty_dirs_removed: usize,
    /// Generation of the archive now backing the index.
    pub generation: u64,
}

/// Rewrites the archive behind an [`ArchiveIndex`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ArchiveMutator;

impl ArchiveMutator {
    /// Remove `target` and everything beneath it.
    ///
    /// Fails with `NotFound` before touching the disk if `target` does not
    /// exist. On success `index` has moved to a new generation.
    pub fn remove_subtree(&self, index: &mut ArchiveIndex, target: &VPath) -> VfsResult<RemovalReport> {
        if target.is_root() || !index.exists(target) {
            return Err(VfsError::not_found(target.as_str()));
        }
        let prefix = target.dir_prefix();
        let archive_path = index.archive_path().to_path_buf();

        let _lock = lock_archive(&archive_path)?;

        let (staged, entries_kept, entries_removed) = rebuild_without(index, &prefix)
            .inspect_err(|e| tracing::warn!(dir = %target, error = %e, "archive rebuild failed"))?;

        index.close();
        if let Err(e) = staged.persist(&archive_path) {
            tracing::warn!(dir = %target, error = %e.error, "replacing archive failed");
            if let Err(reopen) = index.reopen_current() {
                tracing::warn!(dir = %target, error = %reopen, "reopening archive failed");
            }
            return Err(VfsError::io(target.as_str(), e.error));
        }

        let empty_dirs_removed = index.forget_empty_dirs_under(&prefix);
        let generation = index.advance_generation()?;
        tracing::info!(
            dir = %target,
            entries_removed,
            entries_kept,
            generation,
            "installed rewritten archive"
        );

        Ok(RemovalReport {
            target: target.clone(),
            entries_removed,
            entries_kept,
            empty_dirs_removed,
            generation,
        })
    }
}

/// Take an exclusive advisory lock on the archive for the rewrite.
fn lock_archive(path: &Path) -> VfsResult<File> {
    let display = path.display().to_string();
    let file = OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(|e| VfsError::io(&display, e))?;

    match file.try_lock_exclusive() {
        Ok(()) => Ok(file),
        Err(e) if is_contended(&e) => Err(VfsError::Locked { path: display }),
        Err(e) => Err(VfsError::io(display, e)),
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// Copy every entry not under `prefix` into a temporary archive in the same
/// directory as the original, so the final rename stays on one filesystem.
fn rebuild_without(index: &mut ArchiveIndex, prefix: &str) -> VfsResult<(NamedTempFile, usize, usize)> {
    let target = prefix.trim_end_matches('/').to_string();
    let dir = match index.archive_path().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };

    let mut staged = NamedTempFile::new_in(&dir).map_err(|e| VfsError::io(&target, e))?;
    let mut kept = 0;
    let mut removed = 0;
    {
        let archive = index.handle_mut()?;
        let mut writer = ZipWriter::new(staged.as_file_mut());
        for i in 0..archive.len() {
            let entry = archive
                .by_index_raw(i)
                .map_err(|e| VfsError::zip(&target, e))?;
            if entry.name().starts_with(prefix) {
                removed += 1;
                continue;
            }
            writer
                .raw_copy_file(entry)
                .map_err(|e| VfsError::zip(&target, e))?;
            kept += 1;
        }
        writer.finish().map_err(|e| VfsError::zip(&target, e))?;
    }
    staged
        .as_file()
        .sync_all()
        .map_err(|e| VfsError::io(&target, e))?;

    Ok((staged, kept, removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ArchiveFixture;
    use crate::vfs::Listing;

    fn names(index: &ArchiveIndex) -> Vec<&str> {
        index.entry_names().iter().map(String::as_str).collect()
    }

    #[test]
    fn removes_subtree_and_bumps_generation() {
        let fixture = ArchiveFixture::scenario();
        let mut index = ArchiveIndex::open(fixture.path()).unwrap();

        let report = ArchiveMutator
            .remove_subtree(&mut index, &VPath::new("dir2"))
            .unwrap();

        assert_eq!(report.entries_removed, 2);
        assert_eq!(report.entries_kept, 2);
        assert_eq!(report.generation, 1);
        assert_eq!(index.generation(), 1);
        assert_eq!(names(&index), vec!["dir1/file1.txt", "dir1/file2.txt"]);
        assert!(!index.exists(&VPath::new("dir2")));
    }

    #[test]
    fn rewritten_archive_is_persisted_with_contents() {
        let fixture = ArchiveFixture::scenario();
        let mut index = ArchiveIndex::open(fixture.path()).unwrap();
        ArchiveMutator
            .remove_subtree(&mut index, &VPath::new("dir1"))
            .unwrap();
        drop(index);

        let mut reopened = ArchiveIndex::open(fixture.path()).unwrap();
        assert_eq!(
            reopened.list_directory(&VPath::root()).unwrap(),
            Listing::Entries(vec!["dir2".into()])
        );
        assert_eq!(
            reopened
                .open_file(&VPath::new("dir2/subdir1/file4.txt"))
                .unwrap(),
            b"File 4 content"
        );
    }

    #[test]
    fn prefix_match_is_segment_aware() {
        let fixture = ArchiveFixture::build(&[("dir/a", "a"), ("dir10/b", "b")]);
        let mut index = ArchiveIndex::open(fixture.path()).unwrap();
        ArchiveMutator
            .remove_subtree(&mut index, &VPath::new("dir"))
            .unwrap();
        assert_eq!(names(&index), vec!["dir10/b"]);
    }

    #[test]
    fn explicit_directory_marker_is_removed() {
        let fixture = ArchiveFixture::build(&[("keep.txt", "k"), ("bare/", "")]);
        let mut index = ArchiveIndex::open(fixture.path()).unwrap();
        let report = ArchiveMutator
            .remove_subtree(&mut index, &VPath::new("bare"))
            .unwrap();
        assert_eq!(report.entries_removed, 1);
        assert_eq!(names(&index), vec!["keep.txt"]);
    }

    #[test]
    fn empty_dir_only_removal_forgets_side_table_entries() {
        let fixture = ArchiveFixture::scenario();
        let mut index = ArchiveIndex::open(fixture.path()).unwrap();
        index.register_empty_dir(&VPath::new("empty_dir"));
        index.register_empty_dir(&VPath::new("empty_dir/nested"));

        let report = ArchiveMutator
            .remove_subtree(&mut index, &VPath::new("empty_dir"))
            .unwrap();

        assert_eq!(report.entries_removed, 0);
        assert_eq!(report.empty_dirs_removed, 2);
        assert!(!index.exists(&VPath::new("empty_dir")));
        assert_eq!(index.empty_dirs().count(), 0);
    }

    #[test]
    fn second_removal_is_not_found_and_leaves_archive_alone() {
        let fixture = ArchiveFixture::scenario();
        let mut index = ArchiveIndex::open(fixture.path()).unwrap();
        ArchiveMutator
            .remove_subtree(&mut index, &VPath::new("dir1"))
            .unwrap();
        let after_first = fixture.bytes();

        let err = ArchiveMutator
            .remove_subtree(&mut index, &VPath::new("dir1"))
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(fixture.bytes(), after_first);
        assert_eq!(index.generation(), 1);
    }

    #[test]
    fn root_cannot_be_removed() {
        let fixture = ArchiveFixture::scenario();
        let mut index = ArchiveIndex::open(fixture.path()).unwrap();
        let before = fixture.bytes();
        let err = ArchiveMutator
            .remove_subtree(&mut index, &VPath::root())
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(fixture.bytes(), before);
    }

    #[cfg(unix)]
    #[test]
    fn held_lock_fails_cleanly() {
        let fixture = ArchiveFixture::scenario();
        let mut index = ArchiveIndex::open(fixture.path()).unwrap();
        index.register_empty_dir(&VPath::new("dir1/extra"));
        let before = fixture.bytes();

        let holder = File::open(fixture.path()).unwrap();
        holder.lock_exclusive().unwrap();

        let err = ArchiveMutator
            .remove_subtree(&mut index, &VPath::new("dir1"))
            .unwrap_err();

        assert!(matches!(err, VfsError::Locked { .. }), "got {err:?}");
        assert_eq!(fixture.bytes(), before);
        assert_eq!(index.generation(), 0);
        assert!(index.exists(&VPath::new("dir1/extra")));
        assert_eq!(
            index.open_file(&VPath::new("dir1/file1.txt")).unwrap(),
            b"File 1 content"
        );
        FileExt::unlock(&holder).unwrap();
    }

    fn dir_entries(fixture: &ArchiveFixture) -> Vec<std::ffi::OsString> {
        let parent = fixture.path().parent().unwrap();
        let mut names: Vec<_> = std::fs::read_dir(parent)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn failed_rebuild_leaves_index_and_side_table_alone() {
        let fixture = ArchiveFixture::scenario();
        let mut index = ArchiveIndex::open(fixture.path()).unwrap();
        index.register_empty_dir(&VPath::new("dir1/extra"));

        // Truncate in place: the open handle now reads past the end of the file.
        std::fs::write(fixture.path(), b"").unwrap();

        let err = ArchiveMutator
            .remove_subtree(&mut index, &VPath::new("dir1"))
            .unwrap_err();

        assert!(
            matches!(err, VfsError::ArchiveIo { .. } | VfsError::Corrupt { .. }),
            "got {err:?}"
        );
        assert_eq!(index.generation(), 0);
        assert!(index.exists(&VPath::new("dir1/extra")));
        assert_eq!(index.entry_names().len(), 4);
        assert_eq!(dir_entries(&fixture), vec![std::ffi::OsString::from("vfs.zip")]);
    }

    #[cfg(unix)]
    #[test]
    fn failed_replace_is_io_error_without_side_effects() {
        let fixture = ArchiveFixture::scenario();
        let mut index = ArchiveIndex::open(fixture.path()).unwrap();
        index.register_empty_dir(&VPath::new("dir1/extra"));

        // A directory now sits where the archive was, so the final rename fails.
        std::fs::remove_file(fixture.path()).unwrap();
        std::fs::create_dir(fixture.path()).unwrap();

        let err = ArchiveMutator
            .remove_subtree(&mut index, &VPath::new("dir1"))
            .unwrap_err();

        assert!(matches!(err, VfsError::ArchiveIo { .. }), "got {err:?}");
        assert_eq!(index.generation(), 0);
        assert!(index.exists(&VPath::new("dir1/extra")));
        assert!(fixture.path().is_dir());
        assert_eq!(dir_entries(&fixture), vec![std::ffi::OsString::from("vfs.zip")]);
    }
}
