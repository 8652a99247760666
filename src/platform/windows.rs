// mediafocus config path for Windows
// Config: %APPDATA%\MediaFocus

use std::env;
use std::path::PathBuf;

/// `%APPDATA%\MediaFocus`, falling back to the user profile when unset.
pub fn get_config_dir() -> PathBuf {
    let base = env::var("APPDATA")
        .or_else(|_| env::var("USERPROFILE").map(|p| format!("{}\\AppData\\Roaming", p)))
        .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(base).join("MediaFocus")
}
