//! arksh REPL: interactive shell over a zip archive.
//!
//! This REPL provides an interactive interface to the arksh kernel.
//! It handles:
//! - Meta-commands: `/help`, `/quit`, `/cwd`, `/generation`
//! - Command execution via the Kernel
//! - Startup script transcript before the first prompt
//! - Command history via rustyline

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use arksh_kernel::dispatch::help_text;
use arksh_kernel::paths;
use arksh_kernel::{ExecResult, Kernel, KernelConfig, TranscriptEntry};

/// Result of processing one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessResult {
    /// Continue with optional output
    Continue(Option<String>),
    /// Exit the REPL (caller should save history and exit)
    Exit,
}

/// REPL state: one kernel over one archive.
#[derive(Debug)]
pub struct Repl {
    kernel: Kernel,
}

impl Repl {
    /// Open the archive named by `config`.
    pub fn with_config(config: KernelConfig) -> Result<Self> {
        let archive = config.vfs_path.clone();
        let kernel = Kernel::open(config)
            .with_context(|| format!("Failed to open archive {}", archive.display()))?;
        Ok(Self { kernel })
    }

    /// Open `archive` with default prompt names.
    pub fn with_archive(archive: impl Into<PathBuf>) -> Result<Self> {
        Self::with_config(KernelConfig::new(archive))
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn prompt(&self) -> String {
        self.kernel.prompt()
    }

    /// Process a single line of input.
    pub fn process_line(&mut self, line: &str) -> ProcessResult {
        let trimmed = line.trim();

        if trimmed.starts_with('/') {
            return self.handle_meta_command(trimmed);
        }

        let result = self.kernel.execute(trimmed);
        if result.exit {
            return ProcessResult::Exit;
        }
        ProcessResult::Continue(format_result(&result))
    }

    /// Run the startup script, returning the transcript lines to show.
    ///
    /// A missing or unreadable script is reported as a single line; the
    /// session carries on either way.
    pub fn run_startup(&mut self) -> (Vec<String>, bool) {
        match self.kernel.run_startup_script() {
            Ok(transcript) => {
                let exit = transcript.last().is_some_and(|e| e.result.exit);
                (transcript.iter().flat_map(format_entry).collect(), exit)
            }
            Err(e) => (vec![e.to_string()], false),
        }
    }

    /// Handle a meta-command (starts with /).
    fn handle_meta_command(&self, cmd: &str) -> ProcessResult {
        let command = cmd.split_whitespace().next().unwrap_or("");

        match command {
            "/quit" | "/q" | "/exit" => ProcessResult::Exit,
            "/help" | "/h" | "/?" => ProcessResult::Continue(Some(help())),
            "/cwd" => ProcessResult::Continue(Some(format!("/{}", self.kernel.session().cursor()))),
            "/generation" | "/gen" => {
                let index = self.kernel.session().index();
                ProcessResult::Continue(Some(format!(
                    "{} (generation {})",
                    index.archive_path().display(),
                    index.generation()
                )))
            }
            _ => ProcessResult::Continue(Some(format!(
                "Unknown command: {command}\nType /help or help for available commands."
            ))),
        }
    }
}

/// Format an ExecResult for display. Empty output prints nothing.
fn format_result(result: &ExecResult) -> Option<String> {
    let text = result.display_text();
    (!text.is_empty()).then(|| text.to_string())
}

/// A transcript entry as the user would have seen it typed.
fn format_entry(entry: &TranscriptEntry) -> Vec<String> {
    let mut lines = vec![format!("{}{}", entry.prompt, entry.command)];
    lines.extend(format_result(&entry.result));
    lines
}

fn help() -> String {
    format!(
        "arksh REPL\n\nCommands:\n{}\n\nMeta Commands:\n  /help, /?         Show this help\n  /quit, /q         Exit the REPL\n  /cwd              Show the current directory\n  /generation       Show the archive and its generation",
        help_text()
    )
}

/// Save REPL history to disk.
fn save_history(rl: &mut Editor<(), DefaultHistory>, history_path: &Path) {
    if let Some(parent) = history_path.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        tracing::warn!("Failed to create history directory: {}", e);
    }
    if let Err(e) = rl.save_history(history_path) {
        tracing::warn!("Failed to save history: {}", e);
    }
}

/// Run the REPL.
pub fn run(config: KernelConfig) -> Result<()> {
    let mut repl = Repl::with_config(config)?;

    println!("arksh v{}", env!("CARGO_PKG_VERSION"));
    println!("Type /help for commands, /quit to exit.");
    println!();

    let (transcript, exit) = repl.run_startup();
    for line in transcript {
        println!("{line}");
    }
    if exit {
        return Ok(());
    }

    let mut rl: Editor<(), DefaultHistory> =
        Editor::new().context("Failed to create editor")?;

    let history_path = paths::history_file();
    if let Err(e) = rl.load_history(&history_path) {
        // Only log if it's not a "file not found" error (expected on first run)
        let is_not_found = matches!(&e, ReadlineError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound);
        if !is_not_found {
            tracing::warn!("Failed to load history: {}", e);
        }
    }

    loop {
        match rl.readline(&repl.prompt()) {
            Ok(line) => {
                if !line.trim().is_empty()
                    && let Err(e) = rl.add_history_entry(line.as_str())
                {
                    tracing::warn!("Failed to add history entry: {}", e);
                }

                match repl.process_line(&line) {
                    ProcessResult::Continue(Some(output)) => println!("{output}"),
                    ProcessResult::Continue(None) => {}
                    ProcessResult::Exit => break,
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    save_history(&mut rl, &history_path);
    Ok(())
}

/// Execute a single command line and return its result.
pub fn run_command(config: KernelConfig, cmd: &str) -> Result<ExecResult> {
    let mut repl = Repl::with_config(config)?;
    Ok(repl.kernel.execute(cmd))
}
