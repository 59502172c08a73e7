//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files. Every section
//! has defaults so a minimal file (or none at all, with environment overrides) works.

use serde::{Deserialize, Serialize};

/// Root configuration for the status API.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Document store settings.
    pub database: DatabaseConfig,

    /// Authentication, CORS and host checks.
    pub security: SecurityConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Document store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Store location: `memory://` or `file://<directory>`.
    pub url: String,

    /// Database name; the file store uses it to name its data file.
    pub name: String,

    /// Transport security options for networked stores.
    pub tls: DatabaseTlsConfig,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "memory://".to_string(),
            name: "status_api".to_string(),
            tls: DatabaseTlsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DatabaseTlsConfig {
    pub enabled: bool,
    /// Skip certificate verification. Only meaningful with `enabled`.
    pub allow_insecure: bool,
    pub ca_file: Option<String>,
    pub cert_file: Option<String>,
    pub key_file: Option<String>,
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Shared secret for `Authorization: Bearer`. Empty refuses every request
    /// that needs authentication.
    pub api_secret_key: String,

    /// Origins allowed by CORS. Must not be empty.
    pub cors_origins: Vec<String>,

    /// Accepted Host header values. Empty or `*` accepts any host.
    pub allowed_hosts: Vec<String>,

    /// Use the first `X-Forwarded-For` entry as the client address.
    pub trust_forwarded_for: bool,

    /// Enable security headers.
    pub enable_headers: bool,

    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            api_secret_key: String::new(),
            cors_origins: Vec::new(),
            allowed_hosts: vec!["*".to_string()],
            trust_forwarded_for: false,
            enable_headers: true,
            max_body_size: 64 * 1024,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum admitted requests per identifier inside one window.
    pub max_requests: u32,

    /// Window length in seconds.
    pub window_secs: u64,

    /// Interval of the idle-identifier sweep in seconds; 0 disables it.
    pub sweep_interval_secs: u64,

    /// Identifiers idle for this many windows are swept.
    pub idle_windows: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_secs: 60,
            sweep_interval_secs: 0,
            idle_windows: 10,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Requests slower than this are logged as slow, in milliseconds.
    pub slow_request_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            slow_request_ms: 2000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
