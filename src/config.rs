use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::badges::default_badges;
use crate::storage::StorageError;
use crate::types::{Badge, BadgeCriteria};

pub const DEFAULT_XP_PER_STEP: u64 = 50;

/// Tunables of the progress rules. Defaults match the shipped product values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RulesConfig {
    #[serde(default = "default_xp_per_step")]
    pub xp_per_step: u64,
    #[serde(default = "default_badges")]
    pub badges: Vec<Badge>,
}

fn default_xp_per_step() -> u64 {
    DEFAULT_XP_PER_STEP
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            xp_per_step: DEFAULT_XP_PER_STEP,
            badges: default_badges(),
        }
    }
}

impl RulesConfig {
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = std::collections::HashSet::new();
        for badge in &self.badges {
            if badge.id.trim().is_empty() {
                return Err("Badge id cannot be empty".to_string());
            }
            if !seen.insert(badge.id.as_str()) {
                return Err(format!("Duplicate badge id '{}'", badge.id));
            }
            if let BadgeCriteria::RoadmapCompleted { roadmap_id, .. } = &badge.criteria {
                if roadmap_id.trim().is_empty() {
                    return Err(format!("Badge '{}' has an empty roadmapId", badge.id));
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub rules: RulesConfig,
    /// Overrides the embedded content catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_file: Option<PathBuf>,
}

impl Settings {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join("pathpulse")
            .join("settings.json")
    }

    /// Reads settings from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp = path.with_extension("tmp");
        let mut f = File::create(&temp)?;
        f.write_all(serde_json::to_string_pretty(self)?.as_bytes())?;
        f.sync_all()?;
        fs::rename(temp, path)?;
        Ok(())
    }
}
