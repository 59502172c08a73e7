//! Ordered request checks.
//!
//! Every request runs through a fixed list of stages, each of which either lets the
//! request continue or ends it with a [`Rejection`]:
//!
//! ```text
//! RECEIVED → TrustedHost → RateLimit → Authorization → handler
//!                 │            │             │
//!                 └────────────┴─────────────┴──→ REJECTED(reason)
//! ```
//!
//! Bypass paths (`/`, `/health`) only run `TrustedHost`. Nothing here knows about axum;
//! `middleware::guard` adapts it to the router.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::security::identifier::derive_identifier;
use crate::security::{
    AuthContext, AuthFailure, AuthVerifier, Credential, RateLimiter, TrustedHosts,
};

/// Paths that skip rate limiting and authorization.
pub const BYPASS_PATHS: &[&str] = &["/", "/health"];

/// Default slow-request threshold.
pub const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    TrustedHost,
    RateLimit,
    Authorization,
}

const FULL: &[Stage] = &[Stage::TrustedHost, Stage::RateLimit, Stage::Authorization];
const BYPASS: &[Stage] = &[Stage::TrustedHost];

/// What the stages need to know about a request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestFacts<'a> {
    pub path: &'a str,
    pub host: Option<&'a str>,
    pub client: Option<IpAddr>,
    pub user_agent: Option<&'a str>,
    pub authorization: Credential<'a>,
}

/// Terminal outcome of a failed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    UntrustedHost { host: Option<String> },
    RateLimited {
        identifier: String,
        retry_after_secs: u64,
    },
    Unauthorized(AuthFailure),
}

impl Rejection {
    pub fn stage(&self) -> Stage {
        match self {
            Rejection::UntrustedHost { .. } => Stage::TrustedHost,
            Rejection::RateLimited { .. } => Stage::RateLimit,
            Rejection::Unauthorized(_) => Stage::Authorization,
        }
    }
}

/// Whether the rate-limit stage ran and touched the ledger for this outcome.
pub fn consulted_limiter(outcome: &Result<Admission, Rejection>) -> bool {
    match outcome {
        Ok(admission) => admission.identifier.is_some(),
        Err(rejection) => rejection.stage() != Stage::TrustedHost,
    }
}

/// Result of a request that passed every stage it ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Admission {
    /// Rate-limit key, when the request was rate limited.
    pub identifier: Option<String>,
    /// Authorized identity, when the request required one.
    pub auth: Option<AuthContext>,
}

pub struct Pipeline {
    hosts: TrustedHosts,
    limiter: Arc<RateLimiter>,
    verifier: AuthVerifier,
    trust_forwarded_for: bool,
    slow_threshold: Duration,
}

impl Pipeline {
    pub fn new(hosts: TrustedHosts, limiter: Arc<RateLimiter>, verifier: AuthVerifier) -> Self {
        Self {
            hosts,
            limiter,
            verifier,
            trust_forwarded_for: false,
            slow_threshold: SLOW_REQUEST_THRESHOLD,
        }
    }

    pub fn from_config(config: &AppConfig, limiter: Arc<RateLimiter>) -> Self {
        let mut pipeline = Self::new(
            TrustedHosts::new(&config.security.allowed_hosts),
            limiter,
            AuthVerifier::new(&config.security.api_secret_key),
        );
        pipeline.trust_forwarded_for = config.security.trust_forwarded_for;
        pipeline.slow_threshold = Duration::from_millis(config.timeouts.slow_request_ms);
        pipeline
    }

    pub fn is_bypass(path: &str) -> bool {
        BYPASS_PATHS.contains(&path)
    }

    /// Stages run for `path`, in order.
    pub fn stages_for(path: &str) -> &'static [Stage] {
        if Self::is_bypass(path) {
            BYPASS
        } else {
            FULL
        }
    }

    /// Run the stages for a request, stopping at the first rejection.
    pub fn evaluate(&self, facts: &RequestFacts<'_>) -> Result<Admission, Rejection> {
        let mut admission = Admission::default();
        for stage in Self::stages_for(facts.path) {
            self.run_stage(*stage, facts, &mut admission)?;
        }
        Ok(admission)
    }

    fn run_stage(
        &self,
        stage: Stage,
        facts: &RequestFacts<'_>,
        admission: &mut Admission,
    ) -> Result<(), Rejection> {
        match stage {
            Stage::TrustedHost => {
                if !self.hosts.is_allowed(facts.host) {
                    return Err(Rejection::UntrustedHost {
                        host: facts.host.map(String::from),
                    });
                }
            }
            Stage::RateLimit => {
                let identifier = derive_identifier(facts.client, facts.user_agent);
                if !self.limiter.check(&identifier) {
                    return Err(Rejection::RateLimited {
                        identifier,
                        retry_after_secs: self.limiter.window().as_secs(),
                    });
                }
                admission.identifier = Some(identifier);
            }
            Stage::Authorization => {
                let ctx = self
                    .verifier
                    .verify_credential(facts.authorization)
                    .map_err(Rejection::Unauthorized)?;
                admission.auth = Some(ctx);
            }
        }
        Ok(())
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn verifier(&self) -> &AuthVerifier {
        &self.verifier
    }

    pub fn trust_forwarded_for(&self) -> bool {
        self.trust_forwarded_for
    }

    pub fn slow_threshold(&self) -> Duration {
        self.slow_threshold
    }

    /// Requests taking longer than the threshold are reported as slow.
    pub fn is_slow(&self, elapsed: Duration) -> bool {
        elapsed > self.slow_threshold
    }
}
