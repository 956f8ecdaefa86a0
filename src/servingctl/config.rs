use crate::error::{Result, ServingError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_NAMESPACE: &str = "default";
const DEFAULT_UPDATE_RETRIES: usize = 3;
const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 600;

pub const CONFIG_KEYS: &[&str] = &[
    "target",
    "namespace",
    "output",
    "update-retries",
    "wait-timeout",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Yaml,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ServingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "table" => Ok(OutputFormat::Table),
            "yaml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            other => Err(ServingError::Config(format!(
                "unknown output format '{}' (expected table, yaml or json)",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Table => "table",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
        };
        f.write_str(name)
    }
}

/// Configuration for servingctl, stored in `<config dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ServingConfig {
    /// Storage root for gitops mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,

    /// Namespace used when no --namespace flag is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default)]
    pub output: OutputFormat,

    /// Attempts made by `service update` before giving up on conflicts
    #[serde(default = "default_update_retries")]
    pub update_retries: usize,

    /// Seconds to wait for a service to become ready
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout: u64,
}

fn default_update_retries() -> usize {
    DEFAULT_UPDATE_RETRIES
}

fn default_wait_timeout() -> u64 {
    DEFAULT_WAIT_TIMEOUT_SECS
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            target: None,
            namespace: None,
            output: OutputFormat::default(),
            update_retries: DEFAULT_UPDATE_RETRIES,
            wait_timeout: DEFAULT_WAIT_TIMEOUT_SECS,
        }
    }
}

impl ServingConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: ServingConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    /// Namespace from the flag, then config, then `default`.
    pub fn resolve_namespace(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .or_else(|| self.namespace.clone())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
    }

    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "target" => self
                .target
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "namespace" => self.namespace.clone().unwrap_or_default(),
            "output" => self.output.to_string(),
            "update-retries" => self.update_retries.to_string(),
            "wait-timeout" => self.wait_timeout.to_string(),
            other => return Err(unknown_key(other)),
        };
        Ok(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "target" => self.target = non_empty(value).map(PathBuf::from),
            "namespace" => self.namespace = non_empty(value).map(str::to_string),
            "output" => self.output = value.parse()?,
            "update-retries" => self.update_retries = parse_number(key, value)?,
            "wait-timeout" => self.wait_timeout = parse_number(key, value)?,
            other => return Err(unknown_key(other)),
        }
        Ok(())
    }
}

fn non_empty(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|v| !v.is_empty())
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ServingError::Config(format!("'{}' expects a number, got '{}'", key, value)))
}

fn unknown_key(key: &str) -> ServingError {
    ServingError::Config(format!(
        "unknown config key '{}' (known keys: {})",
        key,
        CONFIG_KEYS.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ServingConfig::default();
        assert_eq!(config.output, OutputFormat::Table);
        assert_eq!(config.update_retries, 3);
        assert_eq!(config.wait_timeout, 600);
        assert_eq!(config.target, None);
    }

    #[test]
    fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        let config = ServingConfig::load(dir.path().join("absent")).unwrap();
        assert_eq!(config, ServingConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut config = ServingConfig::default();
        config.set("target", "/srv/gitops").unwrap();
        config.set("output", "yaml").unwrap();
        config.save(dir.path()).unwrap();

        let loaded = ServingConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.target, Some(PathBuf::from("/srv/gitops")));
        assert_eq!(loaded.output, OutputFormat::Yaml);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), r#"{"namespace": "team-a"}"#).unwrap();
        let config = ServingConfig::load(dir.path()).unwrap();
        assert_eq!(config.namespace.as_deref(), Some("team-a"));
        assert_eq!(config.update_retries, 3);
    }

    #[test]
    fn test_namespace_resolution_order() {
        let mut config = ServingConfig::default();
        assert_eq!(config.resolve_namespace(None), "default");
        config.namespace = Some("from-config".into());
        assert_eq!(config.resolve_namespace(None), "from-config");
        assert_eq!(config.resolve_namespace(Some("flag")), "flag");
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = ServingConfig::default();
        assert!(config.set("output", "xml").is_err());
        assert!(config.set("update-retries", "many").is_err());
        assert!(config.set("colour", "blue").is_err());
        assert!(config.get("colour").is_err());
    }

    #[test]
    fn test_set_empty_clears_optional_keys() {
        let mut config = ServingConfig::default();
        config.set("namespace", "ns1").unwrap();
        config.set("namespace", "").unwrap();
        assert_eq!(config.namespace, None);
        assert_eq!(config.get("namespace").unwrap(), "");
    }
}
