//! Configuration loading from disk and environment.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid environment variable {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration from TOML text without validating it.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load configuration from an optional TOML file, apply overrides from the
/// process environment, and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_config_with_vars(path, &env::vars().collect())
}

/// Same as [`load_config`] with an explicit variable map (for testing).
pub fn load_config_with_vars(
    path: Option<&Path>,
    vars: &HashMap<String, String>,
) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => AppConfig::default(),
    };

    config.apply_env(vars)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

impl AppConfig {
    /// Override fields from `APP_ID`, `APP_CERTIFICATE`, `PORT` and `LOG_LEVEL`.
    pub fn apply_env(&mut self, vars: &HashMap<String, String>) -> Result<(), ConfigError> {
        if let Some(app_id) = non_empty(vars, "APP_ID") {
            self.credentials.app_id = app_id.to_string();
        }
        if let Some(certificate) = non_empty(vars, "APP_CERTIFICATE") {
            self.credentials.app_certificate = certificate.to_string();
        }
        if let Some(level) = non_empty(vars, "LOG_LEVEL") {
            self.observability.log_level = level.to_string();
        }
        if let Some(port) = non_empty(vars, "PORT") {
            let port: u16 = port.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "PORT",
                value: port.to_string(),
            })?;
            let host = self
                .listener
                .bind_address
                .rsplit_once(':')
                .map(|(host, _)| host)
                .unwrap_or("0.0.0.0");
            self.listener.bind_address = format!("{}:{}", host, port);
        }
        Ok(())
    }
}

fn non_empty<'a>(vars: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    vars.get(name).map(String::as_str).filter(|v| !v.is_empty())
}
