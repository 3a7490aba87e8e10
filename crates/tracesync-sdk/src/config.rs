use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracesync_engine::FrameMapperOptions;

/// Resolve the config file path based on priority:
/// 1. TRACESYNC_CONFIG environment variable
/// 2. XDG config directory
/// 3. ~/.tracesync/config.toml
fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(env_path) = std::env::var("TRACESYNC_CONFIG") {
        return Ok(PathBuf::from(env_path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        return Ok(config_dir.join("tracesync").join("config.toml"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".tracesync").join("config.toml"));
    }

    Err(Error::Config(
        "Could not determine config path: no HOME directory or XDG config directory found"
            .to_string(),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameMappingConfig {
    /// Run frame propagation when a session is built
    pub enabled: bool,
    pub max_ui_pipeline_latency_ns: i64,
    pub max_ime_wm_latency_ns: u64,
}

impl Default for FrameMappingConfig {
    fn default() -> Self {
        let options = FrameMapperOptions::default();
        Self {
            enabled: true,
            max_ui_pipeline_latency_ns: options.max_ui_pipeline_latency_ns,
            max_ime_wm_latency_ns: options.max_ime_wm_latency_ns,
        }
    }
}

impl FrameMappingConfig {
    pub fn mapper_options(&self) -> FrameMapperOptions {
        FrameMapperOptions {
            max_ui_pipeline_latency_ns: self.max_ui_pipeline_latency_ns,
            max_ime_wm_latency_ns: self.max_ime_wm_latency_ns,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub frame_mapping: FrameMappingConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::default_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        resolve_config_path()
    }

    fn validate(&self) -> Result<()> {
        if self.frame_mapping.max_ui_pipeline_latency_ns < 0 {
            return Err(Error::Config(format!(
                "max_ui_pipeline_latency_ns must not be negative, got {}",
                self.frame_mapping.max_ui_pipeline_latency_ns
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.frame_mapping.enabled);
        assert_eq!(config.frame_mapping.max_ui_pipeline_latency_ns, 2_000_000_000);
        assert_eq!(config.frame_mapping.max_ime_wm_latency_ns, 200_000_000);
        assert_eq!(
            config.frame_mapping.mapper_options(),
            FrameMapperOptions::default()
        );
    }

    #[test]
    fn test_config_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.frame_mapping.enabled = false;
        config.frame_mapping.max_ime_wm_latency_ns = 50_000_000;

        config.save_to(&config_path)?;
        assert!(config_path.exists());

        let loaded = Config::load_from(&config_path)?;
        assert_eq!(loaded, config);

        Ok(())
    }

    #[test]
    fn test_partial_config_fills_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[frame_mapping]\nenabled = false\n")?;

        let loaded = Config::load_from(&config_path)?;
        assert!(!loaded.frame_mapping.enabled);
        assert_eq!(loaded.frame_mapping.max_ui_pipeline_latency_ns, 2_000_000_000);

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_returns_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path)?;
        assert_eq!(config, Config::default());

        Ok(())
    }

    #[test]
    fn test_invalid_config_is_rejected() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        std::fs::write(&config_path, "[frame_mapping]\nenabled = \"yes\"\n")?;
        assert!(matches!(Config::load_from(&config_path), Err(Error::Config(_))));

        std::fs::write(
            &config_path,
            "[frame_mapping]\nmax_ui_pipeline_latency_ns = -1\n",
        )?;
        assert!(matches!(Config::load_from(&config_path), Err(Error::Config(_))));

        Ok(())
    }
}
