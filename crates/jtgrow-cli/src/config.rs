//! Configuration file support for the jtgrow CLI
//!
//! Supports loading configuration from .jtgrowrc files in:
//! - Current directory
//! - User home directory
//! - Custom path via environment variable

use anyhow::{Context, Result};
use jtgrow::GrowthConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{LogFormat, RunArgs};

const FILE_NAME: &str = ".jtgrowrc";
const ENV_VAR: &str = "JTGROW_CONFIG";

/// Configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Enable colored output
    pub colored: bool,

    /// Default log filter
    pub log_level: String,

    /// Default log format
    pub log_format: LogFormat,

    /// Synthetic model settings
    pub grid: GridConfig,

    /// Tree construction settings
    pub growth: GrowthConfig,
}

/// Shape of the synthetic grid model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
    /// States per variable
    pub arity: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            colored: true,
            log_level: "warn".to_string(),
            log_format: LogFormat::Compact,
            grid: GridConfig::default(),
            growth: GrowthConfig::default(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 16,
            cols: 16,
            arity: 2,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Find and load configuration file
    ///
    /// Search order:
    /// 1. JTGROW_CONFIG environment variable
    /// 2. .jtgrowrc in current directory
    /// 3. .jtgrowrc in user home directory
    ///
    /// A file that is named explicitly through the environment but cannot be
    /// loaded is an error; the other locations are skipped silently.
    pub fn load_default() -> Result<Self> {
        if let Ok(path) = std::env::var(ENV_VAR) {
            return Self::load(Path::new(&path));
        }

        let current_config = PathBuf::from(FILE_NAME);
        if current_config.exists() {
            if let Ok(config) = Self::load(&current_config) {
                return Ok(config);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(FILE_NAME);
            if home_config.exists() {
                if let Ok(config) = Self::load(&home_config) {
                    return Ok(config);
                }
            }
        }

        Ok(Self::default())
    }

    /// Get configuration file path (env, current or home)
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(ENV_VAR) {
            return PathBuf::from(path);
        }

        let current = PathBuf::from(FILE_NAME);
        if current.exists() {
            return current;
        }

        if let Some(home) = dirs::home_dir() {
            home.join(FILE_NAME)
        } else {
            current
        }
    }

    /// Create a default configuration file
    pub fn create_default() -> Result<PathBuf> {
        let config = Self::default();
        let path = Self::config_path();
        config.save(&path)?;
        Ok(path)
    }

    /// Override file values with command-line flags
    pub fn apply_args(&mut self, args: &RunArgs) {
        if let Some(rows) = args.rows {
            self.grid.rows = rows;
        }
        if let Some(cols) = args.cols {
            self.grid.cols = cols;
        }
        if let Some(arity) = args.arity {
            self.grid.arity = arity;
        }
        if let Some(strategy) = args.strategy {
            self.growth.strategy = strategy.into();
        }
        if let Some(max_width) = args.max_width {
            self.growth.max_width = max_width;
        }
        if let Some(max_factor_size) = args.max_factor_size {
            self.growth.max_factor_size = max_factor_size;
        }
        if let Some(max_vertices) = args.max_vertices {
            self.growth.max_vertices = Some(max_vertices);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StrategyArg;
    use jtgrow::AdmissionStrategy;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.grid.rows, 16);
        assert_eq!(config.growth.max_width, 5);
        assert_eq!(config.log_format, LogFormat::Compact);
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.growth, deserialized.growth);
        assert_eq!(config.grid.cols, deserialized.grid.cols);
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [growth]
            strategy = "min-fill"
            max_vertices = 100
            "#,
        )
        .unwrap();
        assert_eq!(config.growth.strategy, AdmissionStrategy::MinFill);
        assert_eq!(config.growth.max_vertices, Some(100));
        assert_eq!(config.growth.max_factor_size, 32);
        assert!(config.colored);
    }

    #[test]
    fn test_args_override_file() {
        let mut config = Config::default();
        let args = RunArgs {
            rows: Some(4),
            cols: None,
            arity: Some(3),
            root: None,
            strategy: Some(StrategyArg::Replay),
            max_width: Some(3),
            max_factor_size: None,
            max_vertices: Some(10),
            json: false,
        };
        config.apply_args(&args);
        assert_eq!(config.grid.rows, 4);
        assert_eq!(config.grid.cols, 16);
        assert_eq!(config.grid.arity, 3);
        assert_eq!(config.growth.strategy, AdmissionStrategy::Replay);
        assert_eq!(config.growth.max_width, 3);
        assert_eq!(config.growth.max_factor_size, 32);
        assert_eq!(config.growth.max_vertices, Some(10));
    }
}
