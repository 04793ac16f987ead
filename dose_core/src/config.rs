//! Configuration file support for dosecalc.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/dosecalc/config.toml`.

use crate::types::StrengthUnit;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub input: InputConfig,
}

/// Catalog source configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// Path to a custom catalog TOML file; the built-in catalog is used
    /// when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Dose input configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputConfig {
    /// Unit assumed for desired amounts entered without one.
    #[serde(default = "default_unit")]
    pub default_unit: StrengthUnit,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            default_unit: default_unit(),
        }
    }
}

fn default_unit() -> StrengthUnit {
    StrengthUnit::Mg
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("dosecalc").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.default_unit, StrengthUnit::Mg);
        assert!(config.catalog.path.is_none());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config {
            catalog: CatalogConfig {
                path: Some(PathBuf::from("/etc/dosecalc/formulary.toml")),
            },
            input: InputConfig {
                default_unit: StrengthUnit::Mcg,
            },
        };
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.input.default_unit, StrengthUnit::Mcg);
        assert_eq!(parsed.catalog.path, config.catalog.path);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[input]
default_unit = "mEq"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.input.default_unit, StrengthUnit::MEq);
        assert!(config.catalog.path.is_none()); // default
    }

    #[test]
    fn test_save_to_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::default();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.input.default_unit, StrengthUnit::Mg);
    }
}
