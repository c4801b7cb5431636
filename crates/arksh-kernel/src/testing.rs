//! Scratch archives for unit tests.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// A zip archive written into its own temporary directory.
pub(crate) struct ArchiveFixture {
    _dir: TempDir,
    path: PathBuf,
}

impl ArchiveFixture {
    /// The four-file tree used throughout the tests.
    pub(crate) fn scenario() -> Self {
        Self::build(&[
            ("dir1/file1.txt", "File 1 content"),
            ("dir1/file2.txt", "File 2 content"),
            ("dir2/file3.txt", "File 3 content"),
            ("dir2/subdir1/file4.txt", "File 4 content"),
        ])
    }

    /// Build an archive from text entries. Names ending in `/` become
    /// directory markers.
    pub(crate) fn build(entries: &[(&str, &str)]) -> Self {
        let entries: Vec<(&str, &[u8])> = entries
            .iter()
            .map(|(name, content)| (*name, content.as_bytes()))
            .collect();
        Self::build_bytes(&entries)
    }

    pub(crate) fn build_bytes(entries: &[(&str, &[u8])]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vfs.zip");
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        for (name, content) in entries {
            if name.ends_with('/') {
                writer
                    .add_directory(*name, SimpleFileOptions::default())
                    .unwrap();
            } else {
                writer.start_file(*name, SimpleFileOptions::default()).unwrap();
                writer.write_all(content).unwrap();
            }
        }
        writer.finish().unwrap();
        Self { _dir: dir, path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn bytes(&self) -> Vec<u8> {
        std::fs::read(&self.path).unwrap()
    }
}
