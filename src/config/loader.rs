//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: optional TOML file, then environment overrides, then validation.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            parse_config(&content)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Deserialize a TOML document without validating it.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply environment-style overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("BIND_ADDRESS") {
        config.listener.bind_address = v;
    }

    if let Some(v) = lookup("DATABASE_URL") {
        config.database.url = v;
    }
    if let Some(v) = lookup("DATABASE_NAME") {
        config.database.name = v;
    }
    if let Some(v) = lookup("DATABASE_TLS") {
        config.database.tls.enabled = parse_bool("DATABASE_TLS", &v)?;
    }
    if let Some(v) = lookup("DATABASE_TLS_INSECURE") {
        config.database.tls.allow_insecure = parse_bool("DATABASE_TLS_INSECURE", &v)?;
    }
    if let Some(v) = lookup("DATABASE_TLS_CA_FILE") {
        config.database.tls.ca_file = non_empty(v);
    }
    if let Some(v) = lookup("DATABASE_TLS_CERT_FILE") {
        config.database.tls.cert_file = non_empty(v);
    }
    if let Some(v) = lookup("DATABASE_TLS_KEY_FILE") {
        config.database.tls.key_file = non_empty(v);
    }

    if let Some(v) = lookup("CORS_ORIGINS") {
        config.security.cors_origins = split_list(&v);
    }
    if let Some(v) = lookup("API_SECRET_KEY") {
        config.security.api_secret_key = v;
    }
    if let Some(v) = lookup("ALLOWED_HOSTS") {
        config.security.allowed_hosts = split_list(&v);
    }
    if let Some(v) = lookup("TRUST_FORWARDED_FOR") {
        config.security.trust_forwarded_for = parse_bool("TRUST_FORWARDED_FOR", &v)?;
    }

    if let Some(v) = lookup("RATE_LIMIT_REQUESTS") {
        config.rate_limit.max_requests = parse_num("RATE_LIMIT_REQUESTS", &v)?;
    }
    if let Some(v) = lookup("RATE_LIMIT_WINDOW") {
        config.rate_limit.window_secs = parse_num("RATE_LIMIT_WINDOW", &v)?;
    }
    if let Some(v) = lookup("RATE_LIMIT_SWEEP_INTERVAL") {
        config.rate_limit.sweep_interval_secs = parse_num("RATE_LIMIT_SWEEP_INTERVAL", &v)?;
    }

    if let Some(v) = lookup("LOG_LEVEL") {
        config.observability.log_level = v;
    }
    if let Some(v) = lookup("LOG_FORMAT") {
        config.observability.log_format = v;
    }

    Ok(())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            var,
            value: value.to_string(),
        }),
    }
}

fn parse_num<T: FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
    })
}
