//! Request middleware.

pub mod guard;

pub use guard::request_guard;
