//! Loader facade: assembles the configuration layers and deserializes the result.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::EditorConfig;
use config::{ConfigError, Environment, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix of environment overrides, e.g. `FRAMETREE__LARGE_DELETION_THRESHOLD=5`.
const ENV_PREFIX: &str = "FRAMETREE";
const ENV_SEPARATOR: &str = "__";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, global file, `<root>/frametree.toml`,
    /// environment.
    pub fn load(workspace_root: &Path) -> Result<EditorConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let config = builder.add_source(Self::environment()).build()?;
        let loaded: EditorConfig = config.try_deserialize()?;
        debug!(workspace = %workspace_root.display(), "Configuration loaded");
        Ok(loaded)
    }

    /// Load configuration from one explicit file (plus defaults and environment).
    pub fn load_from_file(path: &Path) -> Result<EditorConfig, ConfigError> {
        let config = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .add_source(Self::environment())
            .build()?;
        config.try_deserialize()
    }

    /// Path of the global configuration file, when a home directory is known.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
        workspace_file::workspace_config_path(workspace_root)
    }

    /// Built-in defaults only.
    pub fn default() -> EditorConfig {
        EditorConfig::default()
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
    }
}
