//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, guard, timeout, body limit)
//! - Bind to a listener and serve until shutdown
//! - Run the ledger sweeper alongside the server
//!
//! # Layer order (outermost first)
//! ```text
//! SetRequestId → Trace → PropagateRequestId → security headers → CORS
//!     → request_guard → Timeout → RequestBodyLimit → handler
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::http::handlers;
use crate::http::middleware::request_guard;
use crate::http::pipeline::Pipeline;
use crate::lifecycle::Shutdown;
use crate::security::headers::{cors_layer, with_security_headers};
use crate::security::{LedgerSweeper, RateLimiter};
use crate::store::StatusStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StatusStore>,
}

/// HTTP server for the status API.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    limiter: Arc<RateLimiter>,
}

impl HttpServer {
    /// Create a server with a limiter on the system clock.
    pub fn new(config: AppConfig, store: Arc<dyn StatusStore>) -> Self {
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit));
        Self::with_limiter(config, store, limiter)
    }

    /// Create a server around an existing limiter.
    pub fn with_limiter(
        config: AppConfig,
        store: Arc<dyn StatusStore>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        let pipeline = Arc::new(Pipeline::from_config(&config, limiter.clone()));
        if !pipeline.verifier().is_configured() {
            tracing::warn!("API secret key is empty; every authenticated request will be refused");
        }

        let state = AppState { store };
        let router = Self::build_router(&config, state, pipeline);
        Self {
            router,
            config,
            limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &AppConfig, state: AppState, pipeline: Arc<Pipeline>) -> Router {
        let routes = Router::new()
            .route("/", get(handlers::root))
            .route("/health", get(handlers::health))
            .route(
                "/status",
                get(handlers::list_status).post(handlers::create_status),
            )
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(middleware::from_fn_with_state(pipeline, request_guard))
            .layer(cors_layer(&config.security.cors_origins));

        let routes = if config.security.enable_headers {
            with_security_headers(routes)
        } else {
            routes
        };

        routes
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The assembled router, for driving without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            max_requests = self.limiter.max_requests(),
            window_secs = self.limiter.window().as_secs(),
            "HTTP server starting"
        );

        let sweeper = LedgerSweeper::new(self.limiter.clone(), &self.config.rate_limit);
        let sweeper_task = tokio::spawn(sweeper.run(shutdown.subscribe()));

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        let mut stop = shutdown.subscribe();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        shutdown.trigger();
        if let Err(e) = sweeper_task.await {
            tracing::error!(error = %e, "Ledger sweeper task failed");
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
