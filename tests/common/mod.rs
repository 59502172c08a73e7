//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response};
use axum::Router;
use status_api::config::AppConfig;
use status_api::security::{ManualClock, RateLimiter};
use status_api::store::{MemoryStore, StatusCheckDocument, StatusStore, StoreError};
use status_api::{HttpServer, Shutdown};
use tokio::net::TcpListener;

pub const SECRET: &str = "integration-secret-token";
pub const ORIGIN: &str = "http://localhost:3000";

/// Config with a known secret and CORS origin; other values are defaults.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.security.api_secret_key = SECRET.to_string();
    config.security.cors_origins = vec![ORIGIN.to_string()];
    config
}

pub fn bearer() -> String {
    format!("Bearer {SECRET}")
}

/// Router over a fresh memory store, with the limiter driven by a manual clock.
pub fn test_router(config: AppConfig) -> (Router, ManualClock, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let (router, clock) = router_with_store(config, store.clone());
    (router, clock, store)
}

pub fn router_with_store(config: AppConfig, store: Arc<dyn StatusStore>) -> (Router, ManualClock) {
    let clock = ManualClock::new();
    let limiter = Arc::new(RateLimiter::with_clock(
        config.rate_limit.max_requests,
        Duration::from_secs(config.rate_limit.window_secs),
        Arc::new(clock.clone()),
    ));
    let server = HttpServer::with_limiter(config, store, limiter);
    (server.router(), clock)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::USER_AGENT, "integration-test")
        .body(Body::empty())
        .unwrap()
}

pub fn authed_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::USER_AGENT, "integration-test")
        .header(header::AUTHORIZATION, bearer())
        .body(Body::empty())
        .unwrap()
}

pub fn authed_post_json(uri: &str, json: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::USER_AGENT, "integration-test")
        .header(header::AUTHORIZATION, bearer())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Store whose every operation fails.
pub struct FailingStore;

#[async_trait]
impl StatusStore for FailingStore {
    async fn insert(&self, _doc: StatusCheckDocument) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection to 10.1.2.3:27017 refused".into()))
    }

    async fn find_recent(&self, _limit: usize) -> Result<Vec<StatusCheckDocument>, StoreError> {
        Err(StoreError::Unavailable("connection to 10.1.2.3:27017 refused".into()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection to 10.1.2.3:27017 refused".into()))
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

/// Start a real server on an ephemeral port.
pub async fn start_server(config: AppConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let server = HttpServer::new(config, Arc::new(MemoryStore::new()));
    let run_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, run_shutdown).await;
    });

    (addr, shutdown)
}
