//! Configuration management for the fraud detection API
//!
//! All settings come from the environment and are optional; defaults keep
//! the service runnable out of the box.

use anyhow::{Context, Result};
use config::Config;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    #[default]
    Local,
    Staging,
    Production,
}

/// Service settings, sourced from environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Display name for the service
    #[serde(default = "default_project_name")]
    pub project_name: String,
    /// Path prefix for the versioned API
    #[serde(default = "default_api_v1_str")]
    pub api_v1_str: String,
    /// Deployment environment (local, staging, production)
    #[serde(default)]
    pub environment: AppEnvironment,
    /// Allowed CORS origins: comma-separated list or JSON array
    #[serde(default)]
    pub backend_cors_origins: String,
    /// Error telemetry endpoint, only honored outside the local environment
    #[serde(default)]
    pub sentry_dsn: Option<String>,
    /// Filesystem path to the serialized model artifact
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// Listen address
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_project_name() -> String {
    "Fraud Detection API".to_string()
}

fn default_api_v1_str() -> String {
    "/api/v1".to_string()
}

fn default_model_path() -> String {
    "app/model/model.bin".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Settings {
    /// Load settings from environment variables (PROJECT_NAME, API_V1_STR,
    /// ENVIRONMENT, BACKEND_CORS_ORIGINS, SENTRY_DSN, MODEL_PATH, HOST, PORT).
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Allowed CORS origins. Accepts either a comma-separated list or a
    /// JSON array; an unparsable JSON array disables CORS rather than
    /// failing startup.
    pub fn all_cors_origins(&self) -> Vec<String> {
        let raw = self.backend_cors_origins.trim();
        if raw.is_empty() {
            return Vec::new();
        }
        if raw.starts_with('[') {
            return match serde_json::from_str::<Vec<String>>(raw) {
                Ok(origins) => origins,
                Err(e) => {
                    warn!(error = %e, "Invalid BACKEND_CORS_ORIGINS JSON array, ignoring");
                    Vec::new()
                }
            };
        }
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Absolute model path: relative values are resolved against the
    /// working directory, absolute values are honored as-is.
    pub fn resolved_model_path(&self) -> Result<PathBuf> {
        let path = Path::new(&self.model_path);
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
            Ok(cwd.join(path))
        }
    }

    /// Whether the telemetry DSN should be honored.
    pub fn telemetry_enabled(&self) -> bool {
        self.sentry_dsn.is_some() && self.environment != AppEnvironment::Local
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            api_v1_str: default_api_v1_str(),
            environment: AppEnvironment::Local,
            backend_cors_origins: String::new(),
            sentry_dsn: None,
            model_path: default_model_path(),
            host: default_host(),
            port: default_port(),
        }
    }
}
