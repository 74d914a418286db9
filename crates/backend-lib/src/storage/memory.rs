use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use fintrack_common::{IdentityId, RecordId};

use super::{CredentialStore, ResourceStore, StoreError};
use crate::auth::Identity;
use crate::resources::{select, ListFilter, OwnedResource};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RecordKey {
    collection: &'static str,
    owner: IdentityId,
    id: RecordId,
}

/// Process-local store. Cloning shares the underlying maps.
#[derive(Clone, Default)]
pub struct MemoryStore {
    identities: Arc<DashMap<IdentityId, Identity>>,
    emails: Arc<DashMap<String, IdentityId>>,
    records: Arc<DashMap<RecordKey, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn insert_identity(&self, identity: Identity) -> Result<(), StoreError> {
        // The email entry stays locked until the identity is in place.
        match self.emails.entry(identity.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate),
            Entry::Vacant(slot) => {
                self.identities.insert(identity.id, identity.clone());
                slot.insert(identity.id);
                Ok(())
            },
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        let id = match self.emails.get(email) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.identities.get(&id).map(|i| i.clone()))
    }

    async fn find_identity(&self, id: IdentityId) -> Result<Option<Identity>, StoreError> {
        Ok(self.identities.get(&id).map(|i| i.clone()))
    }
}

#[async_trait]
impl<R: OwnedResource> ResourceStore<R> for MemoryStore {
    async fn list(&self, owner: IdentityId, filter: &ListFilter) -> Result<Vec<R>, StoreError> {
        let owned = self
            .records
            .iter()
            .filter(|entry| entry.key().collection == R::COLLECTION && entry.key().owner == owner)
            .map(|entry| serde_json::from_value::<R>(entry.value().clone()))
            .collect::<Result<Vec<R>, _>>()?;
        Ok(select(owned, filter))
    }

    async fn find(&self, owner: IdentityId, id: RecordId) -> Result<Option<R>, StoreError> {
        let key = RecordKey {
            collection: R::COLLECTION,
            owner,
            id,
        };
        match self.records.get(&key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, record: R) -> Result<(), StoreError> {
        let key = RecordKey {
            collection: R::COLLECTION,
            owner: record.owner(),
            id: record.id(),
        };
        self.records.insert(key, serde_json::to_value(&record)?);
        Ok(())
    }

    async fn update(
        &self,
        owner: IdentityId,
        id: RecordId,
        fields: R::Fields,
    ) -> Result<Option<R>, StoreError> {
        let key = RecordKey {
            collection: R::COLLECTION,
            owner,
            id,
        };
        let Some(mut slot) = self.records.get_mut(&key) else {
            return Ok(None);
        };
        let mut record: R = serde_json::from_value(slot.value().clone())?;
        record.apply(fields, Utc::now());
        *slot = serde_json::to_value(&record)?;
        Ok(Some(record))
    }

    async fn delete(&self, owner: IdentityId, id: RecordId) -> Result<bool, StoreError> {
        let key = RecordKey {
            collection: R::COLLECTION,
            owner,
            id,
        };
        Ok(self.records.remove(&key).is_some())
    }
}
