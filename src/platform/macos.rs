// mediafocus config path for macOS
// Config: ~/Library/Application Support/MediaFocus

use std::env;
use std::path::PathBuf;

/// `~/Library/Application Support/MediaFocus`
pub fn get_config_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
        .join("Library")
        .join("Application Support")
        .join("MediaFocus")
}
