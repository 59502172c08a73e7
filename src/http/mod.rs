//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → middleware/guard.rs (adapts pipeline.rs to the request)
//!     → pipeline.rs (trusted host → rate limit → authorization)
//!     → handlers.rs (validation.rs, store)
//!     → error.rs ({error, detail} envelopes)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pipeline;
pub mod server;
pub mod validation;

pub use error::ApiError;
pub use pipeline::{Pipeline, Rejection, RequestFacts, Stage};
pub use server::{AppState, HttpServer};
