// mediafocus platform abstraction
// Provides the platform-specific config location for Windows, macOS, and Linux.
//
// Uses `cfg(target_os)` for conditional compilation to select the correct
// platform-specific implementation at compile time.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Environment variable that overrides the config directory on every platform.
pub const CONFIG_DIR_ENV: &str = "MEDIAFOCUS_CONFIG_DIR";

/// Returns the configuration directory for mediafocus.
///
/// - **Override**: `$MEDIAFOCUS_CONFIG_DIR`
/// - **Linux**: `~/.config/mediafocus` (or `$XDG_CONFIG_HOME/mediafocus`)
/// - **macOS**: `~/Library/Application Support/MediaFocus`
/// - **Windows**: `%APPDATA%/MediaFocus`
pub fn get_config_dir() -> PathBuf {
    config_dir_with_override(env::var_os(CONFIG_DIR_ENV))
}

fn config_dir_with_override(override_dir: Option<OsString>) -> PathBuf {
    match override_dir {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => native_config_dir(),
    }
}

fn native_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        PathBuf::from(".mediafocus")
    }
}
