//! Path resolution against the session cursor.
//!
//! Virtual paths are slash-joined strings with no leading or trailing
//! separator; the root is the empty string. Only a bare `..` argument is
//! special: `a/../b` is joined literally.

use std::fmt;

/// Outcome of resolving a `cd`-style argument against a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// `.` or an empty argument. The caller should not move.
    Stay,
    /// `..`: the parent of the cursor. Never needs an existence check.
    Parent(VPath),
    /// Any other argument joined onto the cursor.
    Target(VPath),
}

/// A normalized virtual path.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VPath(String);

impl VPath {
    /// The root path.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Normalize a raw string by stripping leading and trailing separators.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Directory prefix used to match archive entry names: `path/`, or `""` at root.
    pub fn dir_prefix(&self) -> String {
        if self.is_root() {
            String::new()
        } else {
            format!("{}/", self.0)
        }
    }

    /// Join `segment` onto this path with a single separator.
    pub fn join(&self, segment: &str) -> Self {
        Self::new(&format!("{}/{}", self.0, segment))
    }

    /// The path with its last segment removed. Root stays root.
    pub fn parent(&self) -> Self {
        match self.0.rfind('/') {
            Some(idx) => Self(self.0[..idx].to_string()),
            None => Self::root(),
        }
    }

    /// Every proper ancestor, nearest first, ending with root.
    pub fn ancestors(&self) -> impl Iterator<Item = VPath> {
        let mut current = self.clone();
        std::iter::from_fn(move || {
            if current.is_root() {
                return None;
            }
            current = current.parent();
            Some(current.clone())
        })
    }
}

impl fmt::Display for VPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VPath {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Resolve `input` against `cursor`.
pub fn resolve(cursor: &VPath, input: &str) -> Resolved {
    match input {
        ".." => Resolved::Parent(cursor.parent()),
        "." | "" => Resolved::Stay,
        other => Resolved::Target(cursor.join(other)),
    }
}
