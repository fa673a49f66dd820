//! Configuration consumed (read-only) by the capture pipeline.
//!
//! Persisted as `actiontrail.toml`. Every field has a default so a missing
//! file, or a file with only the sections the user cares about, behaves
//! sensibly.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "actiontrail.toml";

/// Top-level capture configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default)]
    pub tools: ToolSettings,
    #[serde(default)]
    pub retention: RetentionSettings,
    #[serde(default)]
    pub capture: CaptureSettings,
}

/// The enumerated set of built-in tool names, used for categorization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(default = "default_builtin_tools")]
    pub builtin: Vec<String>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            builtin: default_builtin_tools(),
        }
    }
}

/// Memory bound: oldest closed turns beyond `max_turns` may be dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetentionSettings {
    #[serde(default)]
    pub max_turns: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Accumulate "thinking" text per turn; when false, reasoning deltas
    /// are dropped.
    #[serde(default = "default_true")]
    pub reasoning: bool,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self { reasoning: true }
    }
}

fn default_true() -> bool {
    true
}

fn default_builtin_tools() -> Vec<String> {
    [
        "calculator",
        "editor",
        "environment",
        "file_read",
        "file_write",
        "http_request",
        "python_repl",
        "shell",
        "think",
        "workflow",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl CaptureConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_the_builtin_tool_set() {
        let config = CaptureConfig::default();
        assert!(config.tools.builtin.contains(&"shell".to_string()));
        assert_eq!(config.tools.builtin.len(), 10);
        assert_eq!(config.retention.max_turns, None);
        assert!(config.capture.reasoning);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CaptureConfig::load(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, CaptureConfig::default());
    }

    #[test]
    fn partial_file_falls_back_per_field() {
        let config: CaptureConfig = toml::from_str(
            r#"
            [retention]
            max_turns = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.retention.max_turns, Some(50));
        assert_eq!(config.tools.builtin.len(), 10);
        assert!(config.capture.reasoning);
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut config = CaptureConfig::default();
        config.retention.max_turns = Some(200);
        config.capture.reasoning = false;
        config.save(&path).unwrap();

        let loaded = CaptureConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
