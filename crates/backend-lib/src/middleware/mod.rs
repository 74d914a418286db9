// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the fintrack server.

pub mod pipeline;
pub mod rate_limit;

pub use pipeline::{session_pipeline, RequestContext, MAX_BODY_BYTES};
pub use rate_limit::{rate_limit, RateLimiter};
