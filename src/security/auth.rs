//! Bearer credential verification.

use axum::http::HeaderValue;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const PREVIEW_LEN: usize = 8;

/// Why a credential was refused. Refusal is an expected outcome, not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    #[error("Missing authorization header")]
    MissingCredential,
    #[error("Malformed authorization header")]
    MalformedCredential,
    #[error("Invalid credentials")]
    InvalidCredential,
}

impl AuthFailure {
    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthFailure::MissingCredential => "missing",
            AuthFailure::MalformedCredential => "malformed",
            AuthFailure::InvalidCredential => "invalid",
        }
    }
}

/// The `Authorization` header as found on a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Credential<'a> {
    #[default]
    Absent,
    /// Present but not visible ASCII.
    Unreadable,
    Header(&'a str),
}

impl<'a> Credential<'a> {
    pub fn from_header(value: Option<&'a HeaderValue>) -> Self {
        match value {
            None => Credential::Absent,
            Some(value) => match value.to_str() {
                Ok(header) => Credential::Header(header),
                Err(_) => Credential::Unreadable,
            },
        }
    }
}

impl<'a> From<Option<&'a str>> for Credential<'a> {
    fn from(header: Option<&'a str>) -> Self {
        header.map_or(Credential::Absent, Credential::Header)
    }
}

/// Identity attached to an authorized request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: String,
    /// First characters of the token followed by `...`, safe for audit logs.
    pub token_preview: String,
}

/// Checks `Authorization: Bearer <token>` against the configured secret.
#[derive(Clone)]
pub struct AuthVerifier {
    /// Digest of the secret, `None` when no secret is configured.
    secret_digest: Option<[u8; 32]>,
}

impl std::fmt::Debug for AuthVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthVerifier")
            .field("configured", &self.secret_digest.is_some())
            .finish()
    }
}

impl AuthVerifier {
    pub fn new(secret: &str) -> Self {
        let secret_digest = if secret.is_empty() {
            None
        } else {
            Some(digest(secret))
        };
        Self { secret_digest }
    }

    /// Whether a secret is configured. Without one every credential is refused.
    pub fn is_configured(&self) -> bool {
        self.secret_digest.is_some()
    }

    /// Verify a credential taken straight from request headers.
    pub fn verify_credential(
        &self,
        credential: Credential<'_>,
    ) -> Result<AuthContext, AuthFailure> {
        match credential {
            Credential::Absent => Err(AuthFailure::MissingCredential),
            Credential::Unreadable => Err(AuthFailure::MalformedCredential),
            Credential::Header(header) => self.verify(Some(header)),
        }
    }

    pub fn verify(&self, header: Option<&str>) -> Result<AuthContext, AuthFailure> {
        let header = header.ok_or(AuthFailure::MissingCredential)?;
        let token = bearer_token(header).ok_or(AuthFailure::MalformedCredential)?;

        // Fixed-width digests keep the comparison independent of token length.
        let presented = digest(token);
        let Some(expected) = self.secret_digest else {
            return Err(AuthFailure::InvalidCredential);
        };
        if !bool::from(presented[..].ct_eq(&expected[..])) {
            return Err(AuthFailure::InvalidCredential);
        }

        Ok(AuthContext {
            user_id: format!("api-client-{}", &hex(&presented)[..8]),
            token_preview: preview(token),
        })
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn digest(value: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(value.as_bytes()));
    out
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn preview(token: &str) -> String {
    let head: String = token.chars().take(PREVIEW_LEN).collect();
    format!("{}...", head)
}
