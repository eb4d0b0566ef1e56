use crate::constants::*;
use crate::error::{ImportError, Result};
use crate::gateway::firestore::FirestoreSettings;
use crate::row::{RowOptions, StateResolution};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub spreadsheet_path: PathBuf,
    pub sheets: Vec<String>,
    pub geo_cache_path: PathBuf,
    pub ibge_base_url: String,
    pub projects_collection: String,
    pub state_aggregates_collection: String,
    pub state_resolution: StateResolution,
    pub match_threshold: u8,
    pub http_timeout_secs: u64,
    pub output_dir: PathBuf,
    pub firestore: FirestoreConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FirestoreConfig {
    pub project_id: Option<String>,
    pub database: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spreadsheet_path: PathBuf::from(DEFAULT_SPREADSHEET_PATH),
            sheets: DEFAULT_SHEETS.iter().map(|s| s.to_string()).collect(),
            geo_cache_path: PathBuf::from(DEFAULT_GEO_CACHE_PATH),
            ibge_base_url: DEFAULT_IBGE_BASE_URL.to_string(),
            projects_collection: PROJECTS_COLLECTION.to_string(),
            state_aggregates_collection: STATE_AGGREGATES_COLLECTION.to_string(),
            state_resolution: StateResolution::default(),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            firestore: FirestoreConfig::default(),
        }
    }
}

impl Config {
    /// Reads `path`, or `config.toml` when none is given. Only an explicitly
    /// requested file is required to exist; otherwise defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (config_path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        if !config_path.exists() {
            if required {
                return Err(ImportError::Config(format!(
                    "Config file '{}' not found",
                    config_path.display()
                )));
            }
            info!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            ImportError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.match_threshold > 100 {
            return Err(ImportError::Config(format!(
                "match_threshold must be between 0 and 100, got {}",
                self.match_threshold
            )));
        }
        if self.sheets.is_empty() {
            return Err(ImportError::Config("at least one sheet must be listed".into()));
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn row_options(&self) -> RowOptions {
        RowOptions {
            state_resolution: self.state_resolution,
            match_threshold: self.match_threshold,
        }
    }

    /// Firestore connection settings; environment variables win over the file.
    pub fn firestore_settings(&self) -> Result<FirestoreSettings> {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        let project_id = env("FIRESTORE_PROJECT_ID")
            .or_else(|| self.firestore.project_id.clone())
            .ok_or_else(|| {
                ImportError::Config(
                    "Firestore project id missing: set firestore.project_id or FIRESTORE_PROJECT_ID".into(),
                )
            })?;

        Ok(FirestoreSettings {
            project_id,
            database: self
                .firestore
                .database
                .clone()
                .unwrap_or_else(|| "(default)".to_string()),
            access_token: env("FIRESTORE_ACCESS_TOKEN"),
            emulator_host: env("FIRESTORE_EMULATOR_HOST"),
        })
    }
}
