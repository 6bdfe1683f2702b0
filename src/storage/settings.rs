use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{overwrite_json, read_json};

pub const SETTINGS_FILE: &str = "settings.json";

/// User settings: the project every new session is tagged with by default,
/// and the labels offered by the project picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub default_project: Option<String>,
    pub projects: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_project: None,
            projects: vec![
                "Project A".to_owned(),
                "Project B".to_owned(),
                "Project C".to_owned(),
            ],
        }
    }
}

impl Settings {
    /// Lenient load: a missing or unreadable settings file falls back to the
    /// defaults so a broken settings file never blocks tracking.
    pub async fn load(data_dir: &Path) -> Settings {
        match read_json(&data_dir.join(SETTINGS_FILE)).await {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!("Failed to read settings, falling back to defaults: {e:#}");
                Settings::default()
            }
        }
    }

    pub async fn save(&self, data_dir: &Path) -> Result<()> {
        overwrite_json(&data_dir.join(SETTINGS_FILE), self).await
    }
}
