//! Configuration management for docpath
//!
//! Chooses the local directory that the command-line tool exposes as a
//! granted tree. Values come from defaults, an optional `config.toml` and
//! `DOCPATH_*` environment variables, later sources winning.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::path::TreeGrant;
use crate::provider::LocalProvider;

pub const DEFAULT_CONFIG_FILE: &str = "config";
pub const DEFAULT_AUTHORITY: &str = "com.android.externalstorage.documents";
pub const DEFAULT_VOLUME: &str = "primary";
pub const ENV_PREFIX: &str = "DOCPATH";

/// Complete tool configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Directory exposed as the granted tree
    /// Environment: DOCPATH_ROOT_DIR
    pub root_dir: String,

    /// Provider namespace written into every encoded path
    /// Environment: DOCPATH_AUTHORITY
    pub authority: String,

    /// Volume name used in document ids (`volume:relative/path`)
    /// Environment: DOCPATH_VOLUME
    pub volume: String,

    /// Display label of the tree root; defaults to the directory name
    /// Environment: DOCPATH_LABEL
    pub label: Option<String>,
}

impl AppConfig {
    /// Load configuration from `config.toml` with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from the given file (extension optional). A
    /// missing file is not an error; defaults apply.
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, ENV_PREFIX)
    }

    /// Load from `config_path`, taking overrides from `<env_prefix>_*`
    /// environment variables
    pub fn load_with_env(config_path: &str, env_prefix: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("root_dir", ".")?
            .set_default("authority", DEFAULT_AUTHORITY)?
            .set_default("volume", DEFAULT_VOLUME)?
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix(env_prefix))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.root_dir.is_empty() {
            return Err(ConfigError::Message("root_dir cannot be empty".into()));
        }

        if self.authority.is_empty() || self.authority.contains('/') {
            return Err(ConfigError::Message(format!(
                "authority must be non-empty and contain no '/': {:?}",
                self.authority
            )));
        }

        if self.volume.is_empty() || self.volume.contains([':', '/']) {
            return Err(ConfigError::Message(format!(
                "volume must be non-empty and contain no ':' or '/': {:?}",
                self.volume
            )));
        }

        Ok(())
    }

    /// Get tree root as PathBuf
    pub fn root_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.root_dir)
    }

    /// Provider over the configured directory
    pub fn provider(&self) -> LocalProvider {
        LocalProvider::new(&self.authority, &self.volume, self.root_dir_path())
    }

    /// Grant covering the whole configured directory
    pub fn grant(&self) -> TreeGrant {
        let provider = self.provider();
        match self.label.as_deref() {
            Some(label) => provider.grant(Some(label)),
            None => {
                // "." has no file name of its own
                let root = self
                    .root_dir_path()
                    .canonicalize()
                    .unwrap_or_else(|_| self.root_dir_path());
                LocalProvider::new(&self.authority, &self.volume, root).grant(None)
            }
        }
    }
}
