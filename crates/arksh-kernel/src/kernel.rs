//! The Kernel: one shell session over one archive.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                    Kernel                    │
//! │  ┌──────────────┐  ┌──────────────────────┐  │
//! │  │ KernelConfig │  │ VfsSession           │  │
//! │  │ (prompt,     │  │  cursor              │  │
//! │  │  script)     │  │  ArchiveIndex (gen N)│  │
//! │  └──────────────┘  └──────────────────────┘  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Front-ends feed it one line at a time through [`Kernel::execute`].

use crate::config::KernelConfig;
use crate::dispatch::dispatch;
use crate::error::VfsResult;
use crate::result::ExecResult;
use crate::script::{self, ScriptError};
use crate::vfs::VfsSession;

/// One executed line, with the prompt it ran under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub prompt: String,
    pub command: String,
    pub result: ExecResult,
}

/// A shell session: configuration plus the VFS session.
#[derive(Debug)]
pub struct Kernel {
    config: KernelConfig,
    session: VfsSession,
}

impl Kernel {
    /// Open the archive named by `config`.
    pub fn open(config: KernelConfig) -> VfsResult<Self> {
        let session = VfsSession::open(&config.vfs_path)?;
        tracing::info!(
            archive = %config.vfs_path.display(),
            user = %config.username,
            host = %config.hostname,
            "kernel ready"
        );
        Ok(Self { config, session })
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn session(&self) -> &VfsSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut VfsSession {
        &mut self.session
    }

    /// `user@host:/cursor$ `
    pub fn prompt(&self) -> String {
        format!(
            "{}@{}:/{}$ ",
            self.config.username,
            self.config.hostname,
            self.session.cursor()
        )
    }

    /// Execute one command line.
    pub fn execute(&mut self, line: &str) -> ExecResult {
        dispatch(&mut self.session, line)
    }

    /// Run the configured startup script, if any.
    ///
    /// Execution stops early at `exit`, whose entry is the last one returned.
    pub fn run_startup_script(&mut self) -> Result<Vec<TranscriptEntry>, ScriptError> {
        let Some(path) = self.config.startup_script.clone() else {
            return Ok(Vec::new());
        };
        let commands = script::load(&path).inspect_err(|e| tracing::warn!("{e}"))?;
        tracing::debug!(script = %path.display(), commands = commands.len(), "running startup script");

        let mut transcript = Vec::with_capacity(commands.len());
        for command in commands {
            let prompt = self.prompt();
            let result = self.execute(&command);
            let exit = result.exit;
            transcript.push(TranscriptEntry {
                prompt,
                command,
                result,
            });
            if exit {
                break;
            }
        }
        Ok(transcript)
    }
}
