//! Virtual filesystem over a zip archive.
//!
//! ```text
//! VfsSession            cursor + live index, the four shell operations
//! ├── path              cursor/argument resolution (pure)
//! ├── ArchiveIndex      one archive generation + empty-directory side table
//! └── ArchiveMutator    subtree removal by rebuilding the archive
//! ```
//!
//! Paths inside the VFS are slash-separated with no leading or trailing
//! slash. The root is the empty path.

mod index;
mod mutator;
pub mod path;
mod session;

pub use index::{ArchiveIndex, Listing};
pub use mutator::{ArchiveMutator, RemovalReport};
pub use path::{resolve, Resolved, VPath};
pub use session::{CdOutcome, Removed, VfsSession};
