use crate::error::{FilterError, Result};
use crate::model::ClassificationChoice;
use crate::registry::{
    default_classifications, FilterRegistry, DEFAULT_RESULT_STATUSES, DEFAULT_TIERS,
    FILTER_PREFIX, UNCLASSIFIED_IDS,
};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "jobfilter.json";

/// Configuration for jobfilter, stored in jobfilter.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterConfig {
    /// Prefix for persisted filter keys (e.g., "filter-")
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Result statuses shown when the store has none
    #[serde(default = "default_result_statuses")]
    pub default_result_statuses: Vec<String>,

    /// Tiers shown when the store has none. Empty means no tier default.
    #[serde(default = "default_tiers")]
    pub default_tiers: Vec<String>,

    /// Classification ids that count as unclassified
    #[serde(default = "default_unclassified_ids")]
    pub unclassified_ids: Vec<u32>,

    #[serde(default = "default_classifications")]
    pub classifications: Vec<ClassificationChoice>,
}

fn default_prefix() -> String {
    FILTER_PREFIX.to_string()
}

fn default_result_statuses() -> Vec<String> {
    DEFAULT_RESULT_STATUSES.iter().map(|s| s.to_string()).collect()
}

fn default_tiers() -> Vec<String> {
    DEFAULT_TIERS.iter().map(|s| s.to_string()).collect()
}

fn default_unclassified_ids() -> Vec<u32> {
    UNCLASSIFIED_IDS.to_vec()
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            default_result_statuses: default_result_statuses(),
            default_tiers: default_tiers(),
            unclassified_ids: default_unclassified_ids(),
            classifications: default_classifications(),
        }
    }
}

impl FilterConfig {
    /// Platform config directory, if the platform has one.
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("org", "jobfilter", "jobfilter").map(|d| d.config_dir().to_path_buf())
    }

    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        Self::load_file(config_dir.as_ref().join(CONFIG_FILENAME))
    }

    /// Load config from an explicit file, or return defaults if not found
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: FilterConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() {
            return Err(FilterError::Config("prefix must not be empty".into()));
        }
        let mut seen = BTreeSet::new();
        for choice in &self.classifications {
            if !seen.insert(choice.id) {
                return Err(FilterError::Config(format!(
                    "duplicate classification id {}",
                    choice.id
                )));
            }
        }
        Ok(())
    }

    pub fn to_registry(&self) -> FilterRegistry {
        FilterRegistry::new(
            &self.prefix,
            self.classifications.clone(),
            self.default_result_statuses.clone(),
            self.default_tiers.clone(),
            self.unclassified_ids.clone(),
        )
    }
}
