// ============================
// crates/backend-lib/src/storage/mod.rs
// ============================
//! Storage abstraction with in-memory and flat-file implementations.
//!
//! Every resource call takes the owner as part of the lookup key, so a record
//! belonging to someone else is indistinguishable from one that does not
//! exist.
use async_trait::async_trait;
use fintrack_common::{Budget, Expense, IdentityId, RecordId};
use thiserror::Error;

use crate::auth::Identity;
use crate::resources::{ListFilter, OwnedResource};

mod flat_file;
mod memory;

pub use flat_file::FlatFileStorage;
pub use memory::MemoryStore;

/// Storage failures
#[derive(Error, Debug)]
pub enum StoreError {
    /// The normalized email is already claimed
    #[error("email already registered")]
    Duplicate,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt store entry: {0}")]
    Corrupt(String),
}

/// Accounts, keyed by id and by normalized email
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new identity. Fails with [`StoreError::Duplicate`] when the
    /// email is taken; the check and the insert are one atomic step.
    async fn insert_identity(&self, identity: Identity) -> Result<(), StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError>;

    async fn find_identity(&self, id: IdentityId) -> Result<Option<Identity>, StoreError>;
}

/// Owner-scoped records of one kind
#[async_trait]
pub trait ResourceStore<R: OwnedResource>: Send + Sync {
    /// Matching records of `owner`, in the kind's display order
    async fn list(&self, owner: IdentityId, filter: &ListFilter) -> Result<Vec<R>, StoreError>;

    async fn find(&self, owner: IdentityId, id: RecordId) -> Result<Option<R>, StoreError>;

    async fn insert(&self, record: R) -> Result<(), StoreError>;

    /// Apply validated fields to an owned record. `None` when absent.
    async fn update(
        &self,
        owner: IdentityId,
        id: RecordId,
        fields: R::Fields,
    ) -> Result<Option<R>, StoreError>;

    /// Remove an owned record. `false` when absent.
    async fn delete(&self, owner: IdentityId, id: RecordId) -> Result<bool, StoreError>;
}

/// Everything the application needs from a backend
pub trait Storage:
    CredentialStore + ResourceStore<Expense> + ResourceStore<Budget> + Clone + 'static
{
}

impl<T> Storage for T where
    T: CredentialStore + ResourceStore<Expense> + ResourceStore<Budget> + Clone + 'static
{
}
