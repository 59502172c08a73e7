//! Trusted Host header checks.

/// Allow-list of Host header values.
///
/// Entries are matched case-insensitively against the host with any port removed.
/// `*` allows every host and `*.example.com` allows any subdomain of `example.com`.
/// An empty list allows every host.
#[derive(Debug, Clone)]
pub struct TrustedHosts {
    allow_any: bool,
    exact: Vec<String>,
    suffixes: Vec<String>,
}

impl TrustedHosts {
    pub fn new(allowed: &[String]) -> Self {
        let mut exact = Vec::new();
        let mut suffixes = Vec::new();
        let mut allow_any = allowed.is_empty();

        for entry in allowed {
            let entry = entry.trim().to_ascii_lowercase();
            if entry == "*" {
                allow_any = true;
            } else if let Some(domain) = entry.strip_prefix("*.") {
                suffixes.push(format!(".{}", domain));
            } else if !entry.is_empty() {
                exact.push(entry);
            }
        }

        Self {
            allow_any,
            exact,
            suffixes,
        }
    }

    pub fn allows_any(&self) -> bool {
        self.allow_any
    }

    /// Check a raw Host header value.
    pub fn is_allowed(&self, host_header: Option<&str>) -> bool {
        if self.allow_any {
            return true;
        }
        let Some(host) = host_header.map(strip_port) else {
            return false;
        };
        let host = host.to_ascii_lowercase();

        self.exact.iter().any(|h| *h == host)
            || self.suffixes.iter().any(|suffix| host.ends_with(suffix.as_str()))
    }
}

fn strip_port(host: &str) -> &str {
    let host = host.trim();
    // Bracketed IPv6 literal, e.g. "[::1]:8080".
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(list: &[&str]) -> TrustedHosts {
        TrustedHosts::new(&list.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_exact_match_ignores_port_and_case() {
        let trusted = hosts(&["api.example.com", "localhost"]);

        assert!(trusted.is_allowed(Some("api.example.com")));
        assert!(trusted.is_allowed(Some("API.Example.com:8443")));
        assert!(trusted.is_allowed(Some("localhost:8080")));
        assert!(!trusted.is_allowed(Some("evil.com")));
        assert!(!trusted.is_allowed(None));
    }

    #[test]
    fn test_wildcard_subdomains() {
        let trusted = hosts(&["*.example.com"]);

        assert!(trusted.is_allowed(Some("a.example.com")));
        assert!(trusted.is_allowed(Some("b.c.example.com:80")));
        assert!(!trusted.is_allowed(Some("example.com.evil.net")));
        assert!(!trusted.is_allowed(Some("notexample.com")));
    }

    #[test]
    fn test_star_and_empty_allow_everything() {
        assert!(hosts(&["*"]).is_allowed(Some("anything")));
        assert!(hosts(&[]).is_allowed(None));
    }

    #[test]
    fn test_ipv6_literal() {
        let trusted = hosts(&["::1"]);
        assert!(trusted.is_allowed(Some("[::1]:8080")));
    }
}
