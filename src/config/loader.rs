use serde::Deserialize;
use std::{collections::HashMap, env, fs, path::Path};

use crate::errors::ConfigError;

use super::container_config::{
    ContainerConfig, PartialContainerConfig, ENV_DETECT_CYCLES, ENV_MAX_DEPTH, ENV_TRACK_STATS,
};

/// On-disk layout: settings either at the top level or under `[container]`.
/// The `[container]` table wins per field when both are present.
#[derive(Deserialize, Debug, Default)]
struct ConfigFile {
    container: Option<PartialContainerConfig>,
    detect_cycles: Option<bool>,
    max_depth: Option<usize>,
    track_stats: Option<bool>,
}

impl ConfigFile {
    fn into_partial(self) -> PartialContainerConfig {
        let top_level = PartialContainerConfig {
            detect_cycles: self.detect_cycles,
            max_depth: self.max_depth,
            track_stats: self.track_stats,
        };
        match self.container {
            Some(section) => top_level.merge(section),
            None => top_level,
        }
    }
}

/// Configuration loader responsible for loading config from files and environment
pub struct ConfigLoader {
    env_override: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    /// Create a new config loader reading the process environment
    pub fn new() -> Self {
        Self { env_override: None }
    }

    /// Create a config loader with a fixed environment map (for testing)
    pub fn with_env(env_map: HashMap<String, String>) -> Self {
        Self {
            env_override: Some(env_map),
        }
    }

    /// Defaults plus environment overrides
    pub fn load(&self) -> Result<ContainerConfig, ConfigError> {
        ContainerConfig::from_partial_and_env(None, &self.collect_env_vars())
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn load_from_path(&self, path: impl AsRef<Path>) -> Result<ContainerConfig, ConfigError> {
        let path = path.as_ref();
        let source = path.to_string_lossy().to_string();
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::FileRead(source.clone(), e))?;

        let partial = self.parse_partial(&source, &content)?;
        tracing::debug!(path = %path.display(), ?partial, "Loaded container configuration file");

        ContainerConfig::from_partial_and_env(Some(partial), &self.collect_env_vars())
    }

    /// Load configuration from TOML source text
    pub fn load_from_str(&self, content: &str) -> Result<ContainerConfig, ConfigError> {
        let partial = self.parse_partial("<inline>", content)?;
        ContainerConfig::from_partial_and_env(Some(partial), &self.collect_env_vars())
    }

    fn parse_partial(
        &self,
        source: &str,
        content: &str,
    ) -> Result<PartialContainerConfig, ConfigError> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| ConfigError::TomlParse(source.to_string(), e))?;
        Ok(file.into_partial())
    }

    /// Collect relevant environment variables
    fn collect_env_vars(&self) -> HashMap<String, String> {
        if let Some(env_map) = &self.env_override {
            return env_map.clone();
        }

        let env_keys = [ENV_DETECT_CYCLES, ENV_MAX_DEPTH, ENV_TRACK_STATS];

        let mut env_map = HashMap::new();
        for key in &env_keys {
            if let Ok(value) = env::var(key) {
                env_map.insert(key.to_string(), value);
            }
        }
        env_map
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
