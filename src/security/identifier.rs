//! Rate-limit key derivation.

use std::net::IpAddr;

use axum::http::HeaderMap;
use sha2::{Digest, Sha256};

/// Placeholder for a missing address or user agent.
pub const UNKNOWN: &str = "unknown";

const FINGERPRINT_LEN: usize = 8;

/// Build the rate-limit key for a client: `<address>:<agent fingerprint>`.
///
/// The agent string is digested so arbitrary header content never lands in a ledger key
/// and key length stays bounded.
pub fn derive_identifier(source: Option<IpAddr>, user_agent: Option<&str>) -> String {
    let address = source
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string());
    format!("{}:{}", address, fingerprint(user_agent.unwrap_or(UNKNOWN)))
}

/// First eight hex characters of the agent digest.
pub fn fingerprint(user_agent: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(user_agent.as_bytes()));
    digest[..FINGERPRINT_LEN].to_string()
}

/// Resolve the client address, honouring `X-Forwarded-For` only when trusted.
pub fn client_address(
    peer: Option<IpAddr>,
    headers: &HeaderMap,
    trust_forwarded_for: bool,
) -> Option<IpAddr> {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok());
        if forwarded.is_some() {
            return forwarded;
        }
    }
    peer
}
