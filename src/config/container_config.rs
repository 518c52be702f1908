use serde::Deserialize;
use std::collections::HashMap;

use crate::errors::ConfigError;

// Environment variable names
pub const ENV_DETECT_CYCLES: &str = "NESTDI_DETECT_CYCLES";
pub const ENV_MAX_DEPTH: &str = "NESTDI_MAX_DEPTH";
pub const ENV_TRACK_STATS: &str = "NESTDI_TRACK_STATS";

pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Container behaviour settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerConfig {
    /// 解析时检测别名/工厂循环
    pub detect_cycles: bool,
    /// 解析栈最大深度（别名链 + 父容器链 + 工厂内嵌套解析）
    pub max_depth: usize,
    /// 是否记录解析统计
    pub track_stats: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            detect_cycles: true,
            max_depth: DEFAULT_MAX_DEPTH,
            track_stats: true,
        }
    }
}

/// Partial container configuration for loading from files
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct PartialContainerConfig {
    pub detect_cycles: Option<bool>,
    pub max_depth: Option<usize>,
    pub track_stats: Option<bool>,
}

impl PartialContainerConfig {
    /// 字段级合并，`other` 中已设置的字段优先
    pub fn merge(self, other: PartialContainerConfig) -> Self {
        Self {
            detect_cycles: other.detect_cycles.or(self.detect_cycles),
            max_depth: other.max_depth.or(self.max_depth),
            track_stats: other.track_stats.or(self.track_stats),
        }
    }
}

impl ContainerConfig {
    /// Preserve the unguarded resolution behaviour: no cycle detection and
    /// effectively no depth limit.
    pub fn unguarded() -> Self {
        Self {
            detect_cycles: false,
            max_depth: usize::MAX,
            track_stats: true,
        }
    }

    /// Create ContainerConfig from partial config and environment
    pub fn from_partial_and_env(
        partial: Option<PartialContainerConfig>,
        env_map: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let partial = partial.unwrap_or_default();
        let defaults = Self::default();

        let detect_cycles = match env_map.get(ENV_DETECT_CYCLES) {
            Some(raw) => parse_bool(ENV_DETECT_CYCLES, raw)?,
            None => partial.detect_cycles.unwrap_or(defaults.detect_cycles),
        };

        let max_depth = match env_map.get(ENV_MAX_DEPTH) {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| ConfigError::InvalidValue {
                field: ENV_MAX_DEPTH.to_string(),
                reason: format!("'{}' is not a valid depth: {}", raw, e),
            })?,
            None => partial.max_depth.unwrap_or(defaults.max_depth),
        };

        let track_stats = match env_map.get(ENV_TRACK_STATS) {
            Some(raw) => parse_bool(ENV_TRACK_STATS, raw)?,
            None => partial.track_stats.unwrap_or(defaults.track_stats),
        };

        let config = ContainerConfig {
            detect_cycles,
            max_depth,
            track_stats,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_depth".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_bool(field: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("'{}' is not a boolean", other),
        }),
    }
}
