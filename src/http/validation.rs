//! Request payload validation.

use std::sync::LazyLock;

use regex::Regex;

pub const CLIENT_NAME_MAX_CHARS: usize = 100;

static CLIENT_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9\s\-_]+$").expect("client name pattern is valid")
});

/// Validate a submitted client name and return it trimmed.
///
/// Length and character rules apply to the name as submitted; a name that is only
/// whitespace is rejected after trimming.
pub fn validate_client_name(raw: &str) -> Result<String, String> {
    let chars = raw.chars().count();
    if chars == 0 {
        return Err("client_name must not be empty".to_string());
    }
    if chars > CLIENT_NAME_MAX_CHARS {
        return Err(format!(
            "client_name must be at most {CLIENT_NAME_MAX_CHARS} characters"
        ));
    }
    if !CLIENT_NAME_PATTERN.is_match(raw) {
        return Err("Client name contains invalid characters".to_string());
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("client_name must not be blank".to_string());
    }
    Ok(trimmed.to_string())
}

/// Clamp a requested list size into `[1, max]`, defaulting when absent.
pub fn clamp_limit(requested: Option<i64>, default: usize, max: usize) -> usize {
    match requested {
        None => default,
        Some(n) if n < 1 => 1,
        Some(n) => (n as u64).min(max as u64) as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_and_trims() {
        assert_eq!(
            validate_client_name("  Memorial Bench 12 ").unwrap(),
            "Memorial Bench 12"
        );
        assert_eq!(validate_client_name("edge_node-3").unwrap(), "edge_node-3");
    }

    #[test]
    fn test_rejects_punctuation() {
        let err = validate_client_name("Memorial Bench #12!").unwrap_err();
        assert!(err.contains("invalid characters"));
        assert!(validate_client_name("a;drop").is_err());
    }

    #[test]
    fn test_rejects_bad_lengths() {
        assert!(validate_client_name("").is_err());
        assert!(validate_client_name("   ").is_err());
        assert!(validate_client_name(&"a".repeat(100)).is_ok());
        assert!(validate_client_name(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(clamp_limit(None, 100, 1000), 100);
        assert_eq!(clamp_limit(Some(0), 100, 1000), 1);
        assert_eq!(clamp_limit(Some(-7), 100, 1000), 1);
        assert_eq!(clamp_limit(Some(5000), 100, 1000), 1000);
        assert_eq!(clamp_limit(Some(42), 100, 1000), 42);
    }
}
