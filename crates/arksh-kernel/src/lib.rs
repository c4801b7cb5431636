//! arksh-kernel: a shell whose filesystem is a zip archive.
//!
//! This crate provides:
//!
//! - **VFS**: path resolution, the archive index, subtree removal and the
//!   session cursor
//! - **Dispatch**: command-line parsing and status formatting
//! - **Kernel**: configuration, prompt and startup scripts around a session
//! - **Paths**: XDG-compliant path helpers

pub mod config;
pub mod dispatch;
pub mod error;
pub mod kernel;
pub mod paths;
pub mod result;
pub mod script;
pub mod vfs;

#[cfg(test)]
mod testing;

pub use config::KernelConfig;
pub use error::{VfsError, VfsResult};
pub use kernel::{Kernel, TranscriptEntry};
pub use result::ExecResult;
pub use script::ScriptError;
