//! Static configuration: which sites form the single-playback group and how
//! each site's player is located on the page.
//!
//! Stored as `config.json` in the platform config directory. A missing file
//! means defaults; every field may be omitted.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::match_pattern::{host_in_domain, host_of, MatchPattern};
use crate::platform;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct MediaFocusConfig {
    pub group: GroupDomainConfig,
    pub adapters: AdapterConfig,
}

impl MediaFocusConfig {
    /// Path of the config file in the platform config directory.
    pub fn default_path() -> PathBuf {
        platform::get_config_dir().join("config.json")
    }

    /// Loads the config file, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: MediaFocusConfig = serde_json::from_str(&content)?;
        // Surface a bad pattern at load time rather than on first use.
        config.group.compile()?;
        Ok(config)
    }
}

/// Sites whose tabs must not play concurrently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupDomainConfig {
    pub name: String,
    pub host: String,
    pub url_pattern: String,
}

impl Default for GroupDomainConfig {
    fn default() -> Self {
        Self {
            name: "youtube".to_string(),
            host: "youtube.com".to_string(),
            url_pattern: "*://*.youtube.com/*".to_string(),
        }
    }
}

impl GroupDomainConfig {
    pub fn compile(&self) -> Result<GroupDomain, ConfigError> {
        Ok(GroupDomain {
            name: self.name.clone(),
            host: self.host.clone(),
            pattern: MatchPattern::parse(&self.url_pattern)?,
        })
    }
}

/// Compiled single-playback group classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDomain {
    pub name: String,
    pub host: String,
    pub pattern: MatchPattern,
}

impl GroupDomain {
    pub fn matches_url(&self, url: &str) -> bool {
        host_of(url).is_some_and(|host| host_in_domain(host, &self.host))
    }

    pub fn matches_host(&self, hostname: &str) -> bool {
        host_in_domain(hostname, &self.host)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdapterConfig {
    /// Selector for native media elements.
    pub media_selector: String,
    pub custom_player: CustomPlayerConfig,
    pub external_player: ExternalPlayerConfig,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            media_selector: "video, audio".to_string(),
            custom_player: CustomPlayerConfig::default(),
            external_player: ExternalPlayerConfig::default(),
        }
    }
}

/// A site player wrapping a native `<video>` behind its own controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomPlayerConfig {
    pub host: String,
    pub container_selector: String,
    pub video_selector: String,
    pub button_selector: String,
    pub pause_label: String,
    pub play_label: String,
}

impl Default for CustomPlayerConfig {
    fn default() -> Self {
        Self {
            host: "youtube.com".to_string(),
            container_selector: ".html5-video-player".to_string(),
            video_selector: "video.html5-main-video".to_string(),
            button_selector: ".ytp-play-button".to_string(),
            pause_label: "Pause".to_string(),
            play_label: "Play".to_string(),
        }
    }
}

/// A web player whose media is not reachable from the page, only its controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExternalPlayerConfig {
    pub host: String,
    pub control_selector: String,
    pub pause_label: String,
    pub play_label: String,
}

impl Default for ExternalPlayerConfig {
    fn default() -> Self {
        Self {
            host: "spotify.com".to_string(),
            control_selector: r#"[data-testid="control-button-playpause"]"#.to_string(),
            pause_label: "Pause".to_string(),
            play_label: "Play".to_string(),
        }
    }
}
