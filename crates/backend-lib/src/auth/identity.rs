//! Registered accounts.
use std::fmt;

use chrono::{DateTime, Utc};
use fintrack_common::IdentityId;
use serde::{Deserialize, Serialize};

/// A registered account. Only the scrypt hash of the secret is kept.
#[derive(Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    /// Normalized login key, see [`normalize_email`]
    pub email: String,
    pub secret_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    pub fn new(email: String, secret_hash: String) -> Self {
        Self {
            id: IdentityId::new(),
            email,
            secret_hash,
            created_at: Utc::now(),
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("secret_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Emails compare case-insensitively and ignore surrounding whitespace
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
