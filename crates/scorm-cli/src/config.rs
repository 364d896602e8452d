//! Viewer configuration from `scorm.toml`.

use anyhow::{Context, Result};
use scorm_pkg::LaunchPolicy;
use scorm_rte::STORAGE_KEY;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "scorm.toml";

/// Directory under the user data dir holding tracking state.
const DATA_DIR_NAME: &str = "scorm-viewer";

/// The complete scorm.toml file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewerConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub launch: LaunchConfig,
}

/// `[storage]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory for tracking state. Defaults to the user data dir.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Storage key. Defaults to `scorm_data`.
    #[serde(default)]
    pub key: Option<String>,
}

/// `[launch]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct LaunchConfig {
    /// Launcher path fragments appended to the built-in ones.
    #[serde(default)]
    pub launcher_fragments: Vec<String>,
}

impl ViewerConfig {
    /// Parse a configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid viewer configuration")
    }

    /// Load `path`, or `scorm.toml` in the current directory.
    ///
    /// A missing default file yields the default configuration; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(CONFIG_FILE), false),
        };

        if !explicit && !path.exists() {
            log::debug!("no {} found, using defaults", CONFIG_FILE);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to load '{}'", path.display()))?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Directory holding tracking state.
    pub fn storage_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.dir {
            return Ok(dir.clone());
        }
        dirs::data_local_dir()
            .map(|dir| dir.join(DATA_DIR_NAME))
            .context("Could not determine a data directory; set [storage] dir in scorm.toml")
    }

    pub fn storage_key(&self) -> &str {
        self.storage.key.as_deref().unwrap_or(STORAGE_KEY)
    }

    /// Launch policy with the configured fragments after the built-in ones.
    pub fn launch_policy(&self) -> LaunchPolicy {
        LaunchPolicy::with_extra_fragments(self.launch.launcher_fragments.iter().cloned())
    }
}
