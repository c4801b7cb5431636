//! Command dispatch: one line of input in, one `ExecResult` out.
//!
//! The verb is the first whitespace-delimited word and must match exactly;
//! everything after it, trimmed, is the argument. Engine errors never escape:
//! each one becomes a failed `ExecResult` and the session stays usable.

use crate::error::VfsError;
use crate::result::ExecResult;
use crate::vfs::{CdOutcome, Listing, VfsSession};

/// Exit code for failed VFS operations.
pub const EXIT_FAILURE: i64 = 1;
/// Exit code for unrecognized commands.
pub const EXIT_UNKNOWN: i64 = 127;

/// Built-in commands with a one-line description, in help order.
pub const COMMANDS: &[(&str, &str)] = &[
    ("ls", "List the current directory"),
    ("cd [path | .. | .]", "Change directory"),
    ("rmdir <path>", "Remove a directory and everything under it (rewrites the archive)"),
    ("tac <path>", "Print a file with its bytes reversed"),
    ("mkdir <path>", "Create an empty directory for this session only"),
    ("pwd", "Print the current directory"),
    ("help", "Show this help"),
    ("exit", "End the session"),
];

/// A parsed command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Ls,
    Cd(&'a str),
    Rmdir(&'a str),
    Tac(&'a str),
    Mkdir(&'a str),
    Pwd,
    Help,
    Exit,
    /// Blank line.
    Empty,
    /// Anything else; holds the whole trimmed line.
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        match verb {
            "" => Command::Empty,
            "ls" => Command::Ls,
            "cd" => Command::Cd(arg),
            "rmdir" => Command::Rmdir(arg),
            "tac" => Command::Tac(arg),
            "mkdir" => Command::Mkdir(arg),
            "pwd" => Command::Pwd,
            "help" => Command::Help,
            "exit" => Command::Exit,
            _ => Command::Unknown(line),
        }
    }
}

/// Parse and run one line against `session`.
pub fn dispatch(session: &mut VfsSession, line: &str) -> ExecResult {
    let command = Command::parse(line);
    tracing::debug!(?command, cursor = %session.cursor(), "dispatch");
    match command {
        Command::Empty => ExecResult::success(""),
        Command::Ls => ls(session),
        Command::Cd(arg) => cd(session, arg),
        Command::Rmdir(arg) => rmdir(session, arg),
        Command::Tac(arg) => tac(session, arg),
        Command::Mkdir(arg) => mkdir(session, arg),
        Command::Pwd => ExecResult::success(format!("/{}", session.cursor())),
        Command::Help => ExecResult::success(help_text()),
        Command::Exit => ExecResult::exit(),
        Command::Unknown(line) => {
            ExecResult::failure(EXIT_UNKNOWN, format!("Command not found: {line}"))
        }
    }
}

/// Help text listing every built-in command.
pub fn help_text() -> String {
    let width = COMMANDS.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);
    COMMANDS
        .iter()
        .map(|(usage, about)| format!("  {usage:<width$}  {about}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn ls(session: &VfsSession) -> ExecResult {
    match session.list() {
        Ok(Listing::Entries(names)) => ExecResult::success(names.join("\n")),
        Ok(Listing::Empty) => ExecResult::success(""),
        Err(e) if e.is_not_found() => {
            ExecResult::failure(EXIT_FAILURE, "ls: no such file or directory")
        }
        Err(e) => ExecResult::failure(EXIT_FAILURE, format!("ls: {e}")),
    }
}

fn cd(session: &mut VfsSession, arg: &str) -> ExecResult {
    match session.change_directory(arg) {
        Ok(CdOutcome::NoOp) => ExecResult::success("cd: no operation"),
        Ok(CdOutcome::Parent(dir)) => ExecResult::success(format!("Moved to directory: {dir}")),
        Ok(CdOutcome::Changed(dir)) => ExecResult::success(format!("Changed directory to {dir}")),
        Err(e) if e.is_not_found() => ExecResult::failure(
            EXIT_FAILURE,
            format!("cd: no such file or directory: {arg}"),
        ),
        Err(e) => ExecResult::failure(EXIT_FAILURE, format!("cd: {e}")),
    }
}

fn rmdir(session: &mut VfsSession, arg: &str) -> ExecResult {
    if arg.trim_matches('/').is_empty() {
        return ExecResult::failure(EXIT_FAILURE, "rmdir: missing operand");
    }
    match session.remove_directory(arg) {
        Ok(removed) => {
            let mut out = format!("Removed directory and its contents: {arg}");
            if let Some(dir) = removed.cursor_reset {
                out.push_str(&format!("\nCurrent directory no longer exists, moved to /{dir}"));
            }
            ExecResult::success(out)
        }
        Err(e) if e.is_not_found() => {
            ExecResult::failure(EXIT_FAILURE, format!("rmdir: no such directory: {arg}"))
        }
        Err(e) => {
            tracing::warn!(arg, error = %e, "rmdir failed");
            ExecResult::failure(EXIT_FAILURE, format!("rmdir: failed to remove '{arg}': {e}"))
        }
    }
}

fn tac(session: &mut VfsSession, arg: &str) -> ExecResult {
    match session.read_file_reversed(arg) {
        Ok(text) => ExecResult::success(text),
        Err(VfsError::NotFound { path }) => {
            ExecResult::failure(EXIT_FAILURE, format!("tac: no such file: {path}"))
        }
        Err(VfsError::Decode { .. }) => ExecResult::failure(
            EXIT_FAILURE,
            format!("tac: error decoding file {arg}: invalid UTF-8 content"),
        ),
        Err(e) => ExecResult::failure(EXIT_FAILURE, format!("tac: error reading file {arg}: {e}")),
    }
}

fn mkdir(session: &mut VfsSession, arg: &str) -> ExecResult {
    if arg.trim_matches('/').is_empty() {
        return ExecResult::failure(EXIT_FAILURE, "mkdir: missing operand");
    }
    match session.make_directory(arg) {
        Ok(_) => ExecResult::success(""),
        Err(VfsError::AlreadyExists { .. }) => ExecResult::failure(
            EXIT_FAILURE,
            format!("mkdir: cannot create directory '{arg}': File exists"),
        ),
        Err(e) => ExecResult::failure(EXIT_FAILURE, format!("mkdir: {e}")),
    }
}
