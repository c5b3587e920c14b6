//! YAML configuration file support for floodjoin.
//!
//! This module lets deployments define the whole suppression pipeline
//! (per-strategy detector windows, routing limits, join formatting) in a
//! single YAML file and load it at runtime.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! # floodjoin pipeline configuration
//! version: "1.0"
//!
//! by_actor:
//!   threshold: 5
//!   delete_window_secs: 15
//!   release_window_secs: 10
//!
//! by_content:
//!   threshold: 5
//!   delete_window_secs: 15
//!   release_window_secs: 10
//!
//! router:
//!   max_content_key_len: 256
//!
//! joiner:
//!   line_cap: 32
//! ```
//!
//! Every section is optional; omitted sections take the reference defaults.
//! Validation happens on load, so an invalid file is a startup error rather
//! than a surprise mid-stream.
use std::fs;
use std::path::Path;

use chrono::Duration;
use detector::DetectorConfig;
use joiner::JoinerConfig;
use router::RouterConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the whole suppression pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FloodjoinConfig {
    /// Configuration format version.
    pub version: String,

    /// Optional configuration name/description.
    #[serde(default)]
    pub name: Option<String>,

    /// Same-actor detector parameters.
    #[serde(default)]
    pub by_actor: DetectorYaml,

    /// Same-content detector parameters.
    #[serde(default)]
    pub by_content: DetectorYaml,

    /// Routing limits.
    #[serde(default)]
    pub router: RouterYaml,

    /// Join formatting parameters.
    #[serde(default)]
    pub joiner: JoinerYaml,
}

impl Default for FloodjoinConfig {
    fn default() -> Self {
        FloodjoinConfig {
            version: "1.0".to_string(),
            name: None,
            by_actor: DetectorYaml::default(),
            by_content: DetectorYaml::default(),
            router: RouterYaml::default(),
            joiner: JoinerYaml::default(),
        }
    }
}

impl FloodjoinConfig {
    /// Load a YAML configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: FloodjoinConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration, including the runtime configs it builds.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => {}
            v => return Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }

        self.router_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.joiner_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        Ok(())
    }

    /// Build the runtime router configuration.
    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            max_content_key_len: self.router.max_content_key_len,
            by_actor: self.by_actor.to_config(),
            by_content: self.by_content.to_config(),
        }
    }

    /// Build the runtime joiner configuration.
    pub fn joiner_config(&self) -> JoinerConfig {
        JoinerConfig {
            line_cap: self.joiner.line_cap,
        }
    }
}

/// YAML shape of one detector's parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DetectorYaml {
    #[serde(default = "DetectorYaml::default_threshold")]
    pub threshold: usize,
    #[serde(default = "DetectorYaml::default_delete_window_secs")]
    pub delete_window_secs: u32,
    #[serde(default = "DetectorYaml::default_release_window_secs")]
    pub release_window_secs: u32,
}

impl DetectorYaml {
    fn default_threshold() -> usize {
        5
    }

    fn default_delete_window_secs() -> u32 {
        15
    }

    fn default_release_window_secs() -> u32 {
        10
    }

    fn to_config(&self) -> DetectorConfig {
        DetectorConfig {
            threshold: self.threshold,
            delete_window: Duration::seconds(i64::from(self.delete_window_secs)),
            release_window: Duration::seconds(i64::from(self.release_window_secs)),
        }
    }
}

impl Default for DetectorYaml {
    fn default() -> Self {
        DetectorYaml {
            threshold: Self::default_threshold(),
            delete_window_secs: Self::default_delete_window_secs(),
            release_window_secs: Self::default_release_window_secs(),
        }
    }
}

/// YAML shape of the routing limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RouterYaml {
    #[serde(default = "RouterYaml::default_max_content_key_len")]
    pub max_content_key_len: usize,
}

impl RouterYaml {
    fn default_max_content_key_len() -> usize {
        256
    }
}

impl Default for RouterYaml {
    fn default() -> Self {
        RouterYaml {
            max_content_key_len: Self::default_max_content_key_len(),
        }
    }
}

/// YAML shape of the join formatting parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JoinerYaml {
    #[serde(default = "JoinerYaml::default_line_cap")]
    pub line_cap: usize,
}

impl JoinerYaml {
    fn default_line_cap() -> usize {
        32
    }
}

impl Default for JoinerYaml {
    fn default() -> Self {
        JoinerYaml {
            line_cap: Self::default_line_cap(),
        }
    }
}
