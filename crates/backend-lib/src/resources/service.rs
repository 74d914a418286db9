//! Resource operations shared by the page flow and the JSON API.
//!
//! Every function takes the caller's identity; the store never sees a request
//! that is not scoped to it.
use chrono::Utc;
use fintrack_common::{IdentityId, ListQuery, RecordId};

use super::{ListFilter, OwnedResource};
use crate::error::AppError;
use crate::storage::ResourceStore;

fn parse_id<R: OwnedResource>(raw: &str) -> Result<RecordId, AppError> {
    RecordId::parse(raw).ok_or_else(|| AppError::NotFound(R::LABEL.to_string()))
}

pub async fn list<R, S>(store: &S, owner: IdentityId, query: ListQuery) -> Result<Vec<R>, AppError>
where
    R: OwnedResource,
    S: ResourceStore<R>,
{
    let filter = ListFilter::from_query(query)?;
    Ok(ResourceStore::<R>::list(store, owner, &filter).await?)
}

pub async fn create<R, S>(store: &S, owner: IdentityId, form: R::Form) -> Result<R, AppError>
where
    R: OwnedResource,
    S: ResourceStore<R>,
{
    let fields = R::validate(form)?;

    let existing = ResourceStore::<R>::list(store, owner, &ListFilter::default()).await?;
    if existing.iter().any(|r| r.duplicates(&fields)) {
        return Err(AppError::DuplicateDetected(R::LABEL.to_lowercase()));
    }

    let record = R::create(RecordId::new(), owner, fields, Utc::now());
    ResourceStore::<R>::insert(store, record.clone()).await?;
    tracing::debug!(kind = R::COLLECTION, id = %record.id(), "record created");
    Ok(record)
}

pub async fn get<R, S>(store: &S, owner: IdentityId, raw_id: &str) -> Result<R, AppError>
where
    R: OwnedResource,
    S: ResourceStore<R>,
{
    let id = parse_id::<R>(raw_id)?;
    ResourceStore::<R>::find(store, owner, id)
        .await?
        .ok_or_else(|| AppError::NotFound(R::LABEL.to_string()))
}

pub async fn update<R, S>(
    store: &S,
    owner: IdentityId,
    raw_id: &str,
    form: R::Form,
) -> Result<R, AppError>
where
    R: OwnedResource,
    S: ResourceStore<R>,
{
    let id = parse_id::<R>(raw_id)?;
    let fields = R::validate(form)?;
    ResourceStore::<R>::update(store, owner, id, fields)
        .await?
        .ok_or_else(|| AppError::NotFound(R::LABEL.to_string()))
}

pub async fn delete<R, S>(store: &S, owner: IdentityId, raw_id: &str) -> Result<(), AppError>
where
    R: OwnedResource,
    S: ResourceStore<R>,
{
    let id = parse_id::<R>(raw_id)?;
    if ResourceStore::<R>::delete(store, owner, id).await? {
        tracing::debug!(kind = R::COLLECTION, id = %id, "record deleted");
        Ok(())
    } else {
        Err(AppError::NotFound(R::LABEL.to_string()))
    }
}
