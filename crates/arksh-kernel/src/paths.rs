//! XDG Base Directory paths for arksh.
//!
//! | Purpose | XDG Variable | Default |
//! |---------|--------------|---------|
//! | Config | `$XDG_CONFIG_HOME` | `~/.config` |
//! | Data | `$XDG_DATA_HOME` | `~/.local/share` |

use std::path::PathBuf;

use directories::BaseDirs;

/// Get the user's home directory.
///
/// Returns `$HOME` or falls back to `/tmp` if not set.
pub fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

/// Get XDG data home directory.
///
/// Returns `$XDG_DATA_HOME` or falls back to `~/.local/share`.
pub fn xdg_data_home() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| home_dir().join(".local").join("share"))
}

/// Get XDG config home directory.
///
/// Returns `$XDG_CONFIG_HOME` or falls back to `~/.config`.
pub fn xdg_config_home() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| home_dir().join(".config"))
}

/// `$XDG_CONFIG_HOME/arksh`
pub fn config_dir() -> PathBuf {
    xdg_config_home().join("arksh")
}

/// `$XDG_DATA_HOME/arksh`
pub fn data_dir() -> PathBuf {
    xdg_data_home().join("arksh")
}

/// Default location of the kernel configuration file.
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Where the REPL keeps its line history.
pub fn history_file() -> PathBuf {
    data_dir().join("history.txt")
}
