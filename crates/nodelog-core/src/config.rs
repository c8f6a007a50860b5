//! Configuration file parsing for nodelog
//!
//! Supports multiple configuration file formats:
//! - TOML (.toml)
//! - YAML (.yaml, .yml)
//! - JSON (.json)

use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::error::{Error, Result};
use crate::types::{LogFormat, RootSpec, RotationParams};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Configuration file structure (nodelog.toml/yaml/json)
#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub roots: Vec<RootConfig>,
    /// Absent table means rotation is disabled
    pub rotation: Option<RotationParams>,
}

/// A single root directory entry
#[derive(Debug, Deserialize)]
pub struct RootConfig {
    pub path: String,
    /// "text" (default) or "json"
    #[serde(default)]
    pub format: LogFormat,
}

impl RootConfig {
    /// Convert to RootSpec, resolving relative paths against `base_dir`
    pub fn into_root(self, base_dir: &Path) -> RootSpec {
        let p = Path::new(&self.path);
        let path = if p.is_absolute() {
            p.to_path_buf()
        } else {
            base_dir.join(p)
        };

        RootSpec::new(path, self.format)
    }
}

impl ConfigFile {
    /// Load config from file, automatically detecting format from extension
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::ConfigError(format!(
                "Unsupported config file extension: {}. Expected .toml, .yaml, .yml, or .json",
                path.display()
            ))
        })?;

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, format)
    }

    /// Parse config content with specified format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let config = match format {
            ConfigFormat::Toml => Self::from_toml(content)?,
            ConfigFormat::Yaml => Self::from_yaml(content)?,
            ConfigFormat::Json => Self::from_json(content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML config content
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ConfigFile = toml::from_str(content)?;
        Ok(config)
    }

    /// Parse YAML config content
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: ConfigFile = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Parse JSON config content
    pub fn from_json(content: &str) -> Result<Self> {
        let config: ConfigFile = serde_json::from_str(content)?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(rotation) = &self.rotation {
            if rotation.frequency_secs == 0 {
                return Err(Error::config("rotation.frequency_secs must be at least 1"));
            }
        }
        for root in &self.roots {
            if root.path.trim().is_empty() {
                return Err(Error::config("root path must not be empty"));
            }
        }
        Ok(())
    }

    /// Find and load a config file from `dir`, falling back to the home config
    pub fn find_and_load(dir: &Path) -> Result<(Self, PathBuf)> {
        let candidates = CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .chain(std::iter::once(home_config_path()));

        for path in candidates {
            if path.exists() {
                let config = Self::load(&path)?;
                return Ok((config, path));
            }
        }
        Err(Error::ConfigError(format!(
            "No config file found in {}. Expected one of: {:?} or {}",
            dir.display(),
            CONFIG_FILES,
            home_config_path().display()
        )))
    }

    /// Rotation parameters, or None when rotation is disabled
    pub fn rotation_params(&self) -> Option<RotationParams> {
        self.rotation.clone()
    }

    /// Distinct (root, format) pairs in a stable order
    pub fn into_roots(self, base_dir: &Path) -> Vec<RootSpec> {
        let roots: BTreeSet<RootSpec> = self
            .roots
            .into_iter()
            .map(|root| root.into_root(base_dir))
            .collect();
        roots.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_format_detection() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("yaml"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("yml"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("txt"), None);
    }

    #[test]
    fn test_config_parse_toml() {
        let config_content = r#"
[[roots]]
path = "/var/log/nodes"
format = "text"

[[roots]]
path = "/var/log/nodes-json"
format = "json"

[rotation]
max_size_bytes = 1048576
max_age_hours = 24
keep_files = 3
"#;
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = ConfigFile::load(file.path()).unwrap();
        assert_eq!(config.roots.len(), 2);
        assert_eq!(config.roots[1].format, LogFormat::Json);

        let params = config.rotation_params().unwrap();
        assert_eq!(params.max_size_bytes, 1_048_576);
        assert_eq!(params.max_age_hours, 24);
        assert_eq!(params.keep_files, 3);
        assert_eq!(params.frequency_secs, DEFAULT_FREQUENCY_SECS);
    }

    #[test]
    fn test_config_parse_yaml() {
        let config_content = r#"
roots:
  - path: /var/log/nodes
rotation:
  max_size_bytes: 100
  max_age_hours: 1
  keep_files: 2
  frequency_secs: 5
"#;
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = ConfigFile::load(file.path()).unwrap();
        assert_eq!(config.roots.len(), 1);
        assert_eq!(config.roots[0].format, LogFormat::Text);
        assert_eq!(config.rotation_params().unwrap().frequency_secs, 5);
    }

    #[test]
    fn test_config_parse_json() {
        let config_content = r#"
{
    "roots": [
        { "path": "/var/log/nodes", "format": "json" }
    ],
    "rotation": {
        "max_size_bytes": 10,
        "max_age_hours": 2,
        "keep_files": 1
    }
}
"#;
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = ConfigFile::load(file.path()).unwrap();
        let roots = config.into_roots(Path::new("/"));
        assert_eq!(roots, vec![RootSpec::new("/var/log/nodes", LogFormat::Json)]);
    }

    #[test]
    fn test_rotation_absent_disables() {
        let config = ConfigFile::parse(
            "[[roots]]\npath = \"/logs\"\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        assert!(config.rotation_params().is_none());
    }

    #[test]
    fn test_zero_frequency_rejected() {
        let content = r#"
[rotation]
max_size_bytes = 10
max_age_hours = 1
keep_files = 1
frequency_secs = 0
"#;
        let result = ConfigFile::parse(content, ConfigFormat::Toml);
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_roots_deduplicated_and_resolved() {
        let content = r#"
[[roots]]
path = "logs"

[[roots]]
path = "/srv/logs"
format = "json"

[[roots]]
path = "logs"
format = "text"

[[roots]]
path = "logs"
format = "json"
"#;
        let config = ConfigFile::parse(content, ConfigFormat::Toml).unwrap();
        let roots = config.into_roots(Path::new("/etc/nodelog"));

        assert_eq!(
            roots,
            vec![
                RootSpec::new("/etc/nodelog/logs", LogFormat::Text),
                RootSpec::new("/etc/nodelog/logs", LogFormat::Json),
                RootSpec::new("/srv/logs", LogFormat::Json),
            ]
        );
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result = ConfigFile::parse(
            "[[roots]]\npath = \"/logs\"\nformat = \"human\"\n",
            ConfigFormat::Toml,
        );
        assert!(matches!(result, Err(Error::TomlError(_))));
    }

    #[test]
    fn test_config_not_found() {
        let result = ConfigFile::load(Path::new("/nonexistent/nodelog.toml"));
        assert!(matches!(result, Err(Error::ConfigNotFound(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = NamedTempFile::with_suffix(".ini").unwrap();
        let result = ConfigFile::load(file.path());
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }
}
