//! ExecResult: the structured result of every command.

/// The result of executing one command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Exit code. 0 means success.
    pub code: i64,
    /// Text written to standard output.
    pub out: String,
    /// Error message, if the command failed.
    pub err: String,
    /// True when the command asked the front-end to end the session.
    pub exit: bool,
}

impl ExecResult {
    /// Create a successful result with output.
    pub fn success(out: impl Into<String>) -> Self {
        Self {
            code: 0,
            out: out.into(),
            err: String::new(),
            exit: false,
        }
    }

    /// Create a failed result with an error message.
    pub fn failure(code: i64, err: impl Into<String>) -> Self {
        Self {
            code,
            out: String::new(),
            err: err.into(),
            exit: false,
        }
    }

    /// A successful result that ends the session.
    pub fn exit() -> Self {
        Self {
            exit: true,
            ..Self::success("")
        }
    }

    /// True if the exit code is 0.
    pub fn ok(&self) -> bool {
        self.code == 0
    }

    /// The text a terminal front-end shows: stdout on success, the error otherwise.
    pub fn display_text(&self) -> &str {
        if self.ok() { &self.out } else { &self.err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_ok() {
        let r = ExecResult::success("dir1\ndir2");
        assert!(r.ok());
        assert_eq!(r.display_text(), "dir1\ndir2");
    }

    #[test]
    fn failure_shows_error() {
        let r = ExecResult::failure(1, "cd: no such file or directory: x");
        assert!(!r.ok());
        assert_eq!(r.display_text(), "cd: no such file or directory: x");
    }

    #[test]
    fn exit_is_ok_and_flagged() {
        let r = ExecResult::exit();
        assert!(r.ok());
        assert!(r.exit);
    }
}
