//! Flat-file backend.
//!
//! Layout under the data root:
//!
//! ```text
//! identities/<identity-id>.json
//! emails/<base64url(sha256(email))>    contains the identity id
//! <collection>/<owner-id>/<record-id>.json
//! ```
//!
//! Email claims use `create_new`, so two concurrent registrations cannot both
//! succeed. Claim names are digests, so every valid email fits in a file name. Record writes go through a temp file and a rename.
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use dashmap::DashMap;
use fintrack_common::{IdentityId, RecordId};
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use tokio::{fs as tokio_fs, io::AsyncWriteExt, sync::Mutex};
use uuid::Uuid;

use super::{CredentialStore, ResourceStore, StoreError};
use crate::auth::Identity;
use crate::resources::{select, ListFilter, OwnedResource};

const IDENTITIES_DIR: &str = "identities";
const EMAILS_DIR: &str = "emails";

/// Flat-file implementation of the storage traits
#[derive(Clone)]
pub struct FlatFileStorage {
    root: PathBuf,
    record_locks: Arc<DashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl FlatFileStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(IDENTITIES_DIR))?;
        fs::create_dir_all(root.join(EMAILS_DIR))?;
        Ok(Self {
            root,
            record_locks: Arc::new(DashMap::new()),
        })
    }

    fn record_lock(&self, path: &Path) -> Arc<Mutex<()>> {
        self.record_locks
            .entry(path.to_path_buf())
            .or_default()
            .clone()
    }

    fn identity_path(&self, id: IdentityId) -> PathBuf {
        self.root.join(IDENTITIES_DIR).join(format!("{id}.json"))
    }

    fn email_path(&self, email: &str) -> PathBuf {
        let digest = Sha256::digest(email.as_bytes());
        self.root.join(EMAILS_DIR).join(URL_SAFE_NO_PAD.encode(digest))
    }

    fn owner_dir(&self, collection: &str, owner: IdentityId) -> PathBuf {
        self.root.join(collection).join(owner.to_string())
    }

    fn record_path(&self, collection: &str, owner: IdentityId, id: RecordId) -> PathBuf {
        self.owner_dir(collection, owner).join(format!("{id}.json"))
    }
}

/// Read and decode a JSON file; a missing file is `None`.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match tokio_fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Replace `path` with the serialized value in one rename.
async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let parent = path
        .parent()
        .ok_or_else(|| StoreError::Corrupt(format!("no parent for {}", path.display())))?;
    tokio_fs::create_dir_all(parent).await?;

    let tmp = parent.join(format!(".{}.tmp", Uuid::new_v4()));
    let json = serde_json::to_vec_pretty(value)?;
    tokio_fs::write(&tmp, json).await?;
    if let Err(e) = tokio_fs::rename(&tmp, path).await {
        let _ = tokio_fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

async fn write_claim(file: &mut tokio_fs::File, id: IdentityId) -> Result<(), StoreError> {
    file.write_all(id.to_string().as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

#[async_trait]
impl CredentialStore for FlatFileStorage {
    async fn insert_identity(&self, identity: Identity) -> Result<(), StoreError> {
        let claim = self.email_path(&identity.email);
        let mut file = match tokio_fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&claim)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Err(StoreError::Duplicate),
            Err(e) => return Err(e.into()),
        };

        let written = match write_claim(&mut file, identity.id).await {
            Ok(()) => write_json(&self.identity_path(identity.id), &identity).await,
            Err(e) => Err(e),
        };

        if written.is_err() {
            // release the claim so the email can be registered again
            let _ = tokio_fs::remove_file(&claim).await;
        }
        written
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        let raw = match tokio_fs::read_to_string(self.email_path(email)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let id = Uuid::parse_str(raw.trim())
            .map(IdentityId)
            .map_err(|_| StoreError::Corrupt(format!("bad email index entry for {email}")))?;
        self.find_identity(id).await
    }

    async fn find_identity(&self, id: IdentityId) -> Result<Option<Identity>, StoreError> {
        read_json(&self.identity_path(id)).await
    }
}

#[async_trait]
impl<R: OwnedResource> ResourceStore<R> for FlatFileStorage {
    async fn list(&self, owner: IdentityId, filter: &ListFilter) -> Result<Vec<R>, StoreError> {
        let dir = self.owner_dir(R::COLLECTION, owner);
        let mut entries = match tokio_fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_record = path.extension().is_some_and(|ext| ext == "json")
                && !entry.file_name().to_string_lossy().starts_with('.');
            if !is_record {
                continue;
            }
            // a concurrent delete may remove the file between listing and reading
            if let Some(record) = read_json::<R>(&path).await? {
                records.push(record);
            }
        }
        Ok(select(records, filter))
    }

    async fn find(&self, owner: IdentityId, id: RecordId) -> Result<Option<R>, StoreError> {
        read_json(&self.record_path(R::COLLECTION, owner, id)).await
    }

    async fn insert(&self, record: R) -> Result<(), StoreError> {
        let path = self.record_path(R::COLLECTION, record.owner(), record.id());
        write_json(&path, &record).await
    }

    async fn update(
        &self,
        owner: IdentityId,
        id: RecordId,
        fields: R::Fields,
    ) -> Result<Option<R>, StoreError> {
        let path = self.record_path(R::COLLECTION, owner, id);
        let lock = self.record_lock(&path);
        let _held = lock.lock().await;

        let Some(mut record) = read_json::<R>(&path).await? else {
            self.record_locks.remove(&path);
            return Ok(None);
        };
        record.apply(fields, Utc::now());
        write_json(&path, &record).await?;
        Ok(Some(record))
    }

    async fn delete(&self, owner: IdentityId, id: RecordId) -> Result<bool, StoreError> {
        let path = self.record_path(R::COLLECTION, owner, id);
        let lock = self.record_lock(&path);
        let _held = lock.lock().await;

        let removed = match tokio_fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        };
        self.record_locks.remove(&path);
        removed
    }
}
