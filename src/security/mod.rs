//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → host.rs (trusted Host header)
//!     → identifier.rs (address + agent fingerprint)
//!     → rate_limit.rs (sliding window per identifier)
//!     → auth.rs (bearer credential, constant-time)
//!     → Pass to handler
//!
//! Outgoing response:
//!     → headers.rs (security headers, CORS)
//! ```
//!
//! # Design Decisions
//! - Fail closed: an unset secret refuses every credential
//! - Rejections are values, not errors
//! - No trust in client input: agent strings are hashed before use as keys

pub mod auth;
pub mod clock;
pub mod headers;
pub mod host;
pub mod identifier;
pub mod rate_limit;
pub mod sweeper;

pub use auth::{AuthContext, AuthFailure, AuthVerifier, Credential};
pub use clock::{Clock, ManualClock, SystemClock};
pub use host::TrustedHosts;
pub use identifier::derive_identifier;
pub use rate_limit::RateLimiter;
pub use sweeper::LedgerSweeper;
