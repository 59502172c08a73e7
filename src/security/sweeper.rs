//! Periodic removal of idle rate-limit identifiers.
//!
//! # Responsibilities
//! - Bound the ledger's key count under traffic with many distinct clients
//! - Stop cleanly on shutdown

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::config::RateLimitConfig;
use crate::observability::metrics;
use crate::security::rate_limit::RateLimiter;

pub struct LedgerSweeper {
    limiter: Arc<RateLimiter>,
    interval: Duration,
    idle_windows: u32,
}

impl LedgerSweeper {
    pub fn new(limiter: Arc<RateLimiter>, config: &RateLimitConfig) -> Self {
        Self {
            limiter,
            interval: Duration::from_secs(config.sweep_interval_secs),
            idle_windows: config.idle_windows,
        }
    }

    pub fn enabled(&self) -> bool {
        !self.interval.is_zero()
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.enabled() {
            tracing::info!("Rate limit ledger sweep disabled");
            return;
        }

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            idle_windows = self.idle_windows,
            "Ledger sweeper starting"
        );

        let mut ticker = time::interval(self.interval);
        // The first tick completes immediately; skip it.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep_once();
                }
                _ = shutdown.recv() => {
                    tracing::info!("Ledger sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    pub fn sweep_once(&self) -> usize {
        let removed = self.limiter.sweep_idle(self.idle_windows);
        let remaining = self.limiter.tracked_identifiers();
        if removed > 0 {
            tracing::debug!(removed, remaining, "Swept idle rate limit identifiers");
        }
        metrics::record_ledger_size(remaining);
        removed
    }
}
