//! Configuration management for tulsigen
//!
//! Two layers of configuration drive a generation run:
//!
//! - [`GeneratorConfig`]: the project description, loaded from a JSON or YAML
//!   file (`*.tulsigen`, `*.json`, `*.yaml`, `*.yml`). It names the project,
//!   the build labels to include and the options passed to the build tool.
//! - [`GeneratorSettings`]: per-user runtime settings read from environment
//!   variables with sensible defaults.
//!
//! # Environment Variables
//!
//! - `TULSIGEN_USER`: User name for per-user files - default: `$USER`, then "unknown"
//! - `TULSIGEN_LOG_LEVEL`: Logging level - default: "info"
//! - `TULSIGEN_OUTPUT_BASE`: Build tool output base used to locate external repositories
//!
//! # Example
//!
//! ```no_run
//! use tulsigen::config::{GeneratorConfig, GeneratorSettings};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GeneratorConfig::load(Path::new("App.tulsigen"))?;
//! config.validate()?;
//!
//! let settings = GeneratorSettings::default();
//! settings.validate()?;
//! # Ok(())
//! # }
//! ```

use crate::label::BuildLabel;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_USER: &str = "unknown";
const DEFAULT_BUILD_CONFIGURATIONS: &[&str] = &["Debug", "Release"];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration contents
    #[error("Failed to parse {path:?}: {error}")]
    ParseError { path: PathBuf, error: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Description of the project to generate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Name of the generated `.xcodeproj` bundle
    pub project_name: String,

    /// Labels requested for the project
    pub build_targets: Vec<BuildLabel>,

    /// Extra options passed to every build tool invocation
    #[serde(default)]
    pub build_options: Vec<String>,

    /// Workspace-relative files to show in the project without belonging to a target
    #[serde(default)]
    pub additional_file_paths: Vec<String>,

    #[serde(default = "default_build_configurations")]
    pub build_configurations: Vec<String>,

    /// Root of the build tool workspace; relative artifact paths resolve against it
    #[serde(default = "default_workspace_root")]
    pub workspace_root: PathBuf,
}

fn default_build_configurations() -> Vec<String> {
    DEFAULT_BUILD_CONFIGURATIONS
        .iter()
        .map(|name| name.to_string())
        .collect()
}

fn default_workspace_root() -> PathBuf {
    PathBuf::from(".")
}

impl GeneratorConfig {
    pub fn new(project_name: impl Into<String>, build_targets: Vec<BuildLabel>) -> Self {
        Self {
            project_name: project_name.into(),
            build_targets,
            build_options: Vec::new(),
            additional_file_paths: Vec::new(),
            build_configurations: default_build_configurations(),
            workspace_root: default_workspace_root(),
        }
    }

    /// Loads a config file, choosing YAML or JSON by extension
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &contents)
    }

    pub fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let parsed = if is_yaml {
            serde_yaml::from_str(contents).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(contents).map_err(|e| e.to_string())
        };
        parsed.map_err(|error| ConfigError::ParseError {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Validates the configuration
    ///
    /// Checks that the project name can be used as a bundle name and that at
    /// least one target and one build configuration are requested.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = self.project_name.trim();
        if name.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Project name must not be empty".to_string(),
            ));
        }
        if name.contains('/') {
            return Err(ConfigError::ValidationFailed(format!(
                "Project name '{}' must not contain '/'",
                name
            )));
        }
        if self.build_targets.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "At least one build target is required".to_string(),
            ));
        }
        if self.build_configurations.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "At least one build configuration is required".to_string(),
            ));
        }
        Ok(())
    }

    /// File name of the generated project bundle
    pub fn bundle_name(&self) -> String {
        format!("{}.xcodeproj", self.project_name)
    }
}

/// Per-user runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSettings {
    /// User name used for per-user settings and configs
    pub user: String,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Build tool output base, used to resolve external repositories
    pub output_base: Option<PathBuf>,
}

impl Default for GeneratorSettings {
    /// Loads settings from TULSIGEN_* environment variables with defaults
    fn default() -> Self {
        let user = env::var("TULSIGEN_USER")
            .or_else(|_| env::var("USER"))
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER.to_string());

        let log_level = env::var("TULSIGEN_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let output_base = env::var("TULSIGEN_OUTPUT_BASE").ok().map(PathBuf::from);

        Self {
            user,
            log_level,
            output_base,
        }
    }
}

impl GeneratorSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user.contains('/') {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid user name: {}",
                self.user
            )));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }
}
