use async_trait::async_trait;
use fintrack_common::IdentityId;

use super::Identity;
use crate::error::AppError;

/// Credential store front: registration and verification.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account. Fails with `DuplicateEmail` or `Validation`.
    async fn register(&self, email: &str, secret: String) -> Result<Identity, AppError>;

    /// Confirm a claimed email/secret pair. Unknown emails and wrong secrets
    /// both fail with `InvalidCredentials`.
    async fn verify(&self, email: &str, secret: String) -> Result<Identity, AppError>;

    /// Look up an account by id
    async fn identity(&self, id: IdentityId) -> Result<Option<Identity>, AppError>;
}
