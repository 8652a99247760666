use serde::{Deserialize, Serialize};

/// User preferences the coordinator acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionSettings {
    /// Resume media in a newly focused tab even if the coordinator did not pause it.
    pub auto_resume: bool,
}

impl Default for ExtensionSettings {
    fn default() -> Self {
        Self { auto_resume: true }
    }
}

/// What the persistence layer holds; any field may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StoredSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_resume: Option<bool>,
}

impl StoredSettings {
    /// Fills absent fields from the defaults.
    pub fn resolve(self) -> ExtensionSettings {
        let defaults = ExtensionSettings::default();
        ExtensionSettings {
            auto_resume: self.auto_resume.unwrap_or(defaults.auto_resume),
        }
    }
}

impl From<ExtensionSettings> for StoredSettings {
    fn from(settings: ExtensionSettings) -> Self {
        Self {
            auto_resume: Some(settings.auto_resume),
        }
    }
}
