// file: src/config/loader.rs
// version: 2.0.0
// guid: d4e5f6g7-h8i9-0123-4567-890123defghi

//! Configuration file loading and environment variable substitution

use super::ProvisionConfig;
use crate::Result;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
    env_vars: HashMap<String, String>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self {
            env_vars: std::env::vars().collect(),
        }
    }

    /// Load the configuration from `path`, or return the defaults when no path is given
    pub fn load_or_default(&self, path: Option<&str>) -> Result<ProvisionConfig> {
        let config = match path {
            Some(path) => self.load(Self::expand_path(path)?)?,
            None => ProvisionConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML or TOML file (chosen by extension)
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<ProvisionConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            crate::error::ProvisionError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let expanded = self.expand_env_vars(&content)?;
        let config: ProvisionConfig = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&expanded)?,
            _ => serde_yaml::from_str(&expanded)?,
        };

        debug!("Loaded configuration from {}", path.display());
        config.validate()?;
        Ok(config)
    }

    /// Expand `~` and `$VAR` in a path given on the command line
    fn expand_path(path: &str) -> Result<PathBuf> {
        let expanded = shellexpand::full(path).map_err(|e| {
            crate::error::ProvisionError::ConfigError(format!(
                "Failed to expand config path {}: {}",
                path, e
            ))
        })?;
        Ok(PathBuf::from(expanded.as_ref()))
    }

    /// Expand environment variables in configuration content
    fn expand_env_vars(&self, content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            crate::error::ProvisionError::ConfigError(format!("Invalid regex pattern: {}", e))
        })?;

        let mut result = content.to_string();
        let mut missing_vars = Vec::new();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];

            if let Some(value) = self.env_vars.get(var_name) {
                result = result.replace(placeholder, value);
            } else if !missing_vars.iter().any(|v| v == var_name) {
                missing_vars.push(var_name.to_string());
            }
        }

        if !missing_vars.is_empty() {
            return Err(crate::error::ProvisionError::ConfigError(format!(
                "Missing environment variables: {}",
                missing_vars.join(", ")
            )));
        }

        Ok(result)
    }

    /// Set environment variable for substitution
    pub fn set_env_var(&mut self, key: String, value: String) {
        self.env_vars.insert(key, value);
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
