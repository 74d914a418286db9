// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod gate;
pub mod identity;
pub mod password;
pub mod session;
pub mod token_generator;
mod service;
mod service_impl;

pub use gate::{require_authenticated, resolve_identity};
pub use identity::{normalize_email, Identity};
pub use password::{
    check_password_strength, hash_password, hash_password_secure, verify_password,
    PasswordRequirements, MIN_PASSWORD_LENGTH,
};
pub use service::AuthService;
pub use service_impl::DefaultAuth;
pub use session::{Session, SessionId, SessionManager, SESSION_ABSOLUTE_TTL, SESSION_IDLE_TTL};
