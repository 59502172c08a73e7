//! Configuration validation.
//!
//! Semantic checks run after deserialization and environment overrides. All problems
//! are collected so a misconfigured deployment can be fixed in one pass.

use std::net::SocketAddr;

use axum::http::HeaderValue;

use crate::config::schema::AppConfig;
use crate::store::StoreLocation;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("security.cors_origins must list at least one origin (set CORS_ORIGINS)")]
    MissingCorsOrigins,
    #[error("security.cors_origins: \"*\" cannot be combined with credentialed requests")]
    WildcardCorsOrigin,
    #[error("security.cors_origins: invalid origin {0:?}")]
    InvalidCorsOrigin(String),
    #[error("rate_limit.max_requests must be greater than zero")]
    ZeroMaxRequests,
    #[error("rate_limit.window_secs must be greater than zero")]
    ZeroWindow,
    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },
    #[error("database.url: unsupported store {0:?} (expected memory:// or file://<dir>)")]
    UnsupportedDatabaseUrl(String),
    #[error("database.name must not be empty")]
    EmptyDatabaseName,
    #[error("database.tls: cert_file and key_file must be set together")]
    IncompleteTlsIdentity,
    #[error("database.tls: allow_insecure requires tls to be enabled")]
    InsecureWithoutTls,
    #[error("observability.log_format: unknown format {0:?} (expected pretty or json)")]
    UnknownLogFormat(String),
}

/// Validate a fully assembled configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(
        &mut errors,
        "listener.bind_address",
        &config.listener.bind_address,
    );
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let origins = &config.security.cors_origins;
    if origins.iter().all(|o| o.trim().is_empty()) {
        errors.push(ValidationError::MissingCorsOrigins);
    }
    for origin in origins.iter().map(|o| o.trim()).filter(|o| !o.is_empty()) {
        if origin == "*" {
            errors.push(ValidationError::WildcardCorsOrigin);
        } else if HeaderValue::from_str(origin).is_err() {
            errors.push(ValidationError::InvalidCorsOrigin(origin.to_string()));
        }
    }

    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::ZeroMaxRequests);
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::ZeroWindow);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if StoreLocation::parse(&config.database.url).is_none() {
        errors.push(ValidationError::UnsupportedDatabaseUrl(
            config.database.url.clone(),
        ));
    }
    if config.database.name.trim().is_empty() {
        errors.push(ValidationError::EmptyDatabaseName);
    }
    let tls = &config.database.tls;
    if tls.cert_file.is_some() != tls.key_file.is_some() {
        errors.push(ValidationError::IncompleteTlsIdentity);
    }
    if tls.allow_insecure && !tls.enabled {
        errors.push(ValidationError::InsecureWithoutTls);
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::UnknownLogFormat(other.to_string())),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AppConfig {
        let mut config = AppConfig::default();
        config.security.cors_origins = vec!["https://example.com".to_string()];
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert_eq!(validate_config(&valid()), Ok(()));
    }

    #[test]
    fn test_missing_cors_origins_rejected() {
        let mut config = valid();
        config.security.cors_origins = vec![" ".to_string()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingCorsOrigins]);
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = valid();
        config.security.cors_origins.push("*".to_string());
        config.rate_limit.max_requests = 0;
        config.rate_limit.window_secs = 0;
        config.database.url = "postgres://db".to_string();
        config.database.tls.cert_file = Some("client.pem".to_string());
        config.listener.bind_address = "not-an-address".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::WildcardCorsOrigin));
        assert!(errors.contains(&ValidationError::ZeroMaxRequests));
        assert!(errors.contains(&ValidationError::ZeroWindow));
        assert!(errors.contains(&ValidationError::IncompleteTlsIdentity));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnsupportedDatabaseUrl(_))));
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::InvalidAddress { field: "listener.bind_address", .. }
        )));
    }

    #[test]
    fn test_insecure_tls_requires_tls() {
        let mut config = valid();
        config.database.tls.allow_insecure = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InsecureWithoutTls])
        );

        config.database.tls.enabled = true;
        assert_eq!(validate_config(&config), Ok(()));
    }
}
