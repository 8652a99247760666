// mediafocus config path for Linux
// Config: ~/.config/mediafocus

use std::env;
use std::path::PathBuf;

/// Uses `$XDG_CONFIG_HOME/mediafocus` if set, otherwise `~/.config/mediafocus`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("mediafocus"),
        _ => {
            let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
            PathBuf::from(home).join(".config").join("mediafocus")
        }
    }
}
