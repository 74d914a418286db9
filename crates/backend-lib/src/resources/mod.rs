// ============================
// crates/backend-lib/src/resources/mod.rs
// ============================
//! Owned resources: the record kinds a signed-in account can manage.
use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use fintrack_common::{IdentityId, ListQuery, RecordId};
use serde::{de::DeserializeOwned, Serialize};

use crate::validation::{parse_date, ValidationError, ValidationResult};

mod budget;
mod expense;
pub mod service;

/// A record kind that always carries an owner
pub trait OwnedResource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name used in routes and on disk
    const COLLECTION: &'static str;
    /// Capitalized display name used in notices
    const LABEL: &'static str;

    /// Raw submission
    type Form: DeserializeOwned + Send + 'static;
    /// Validated submission
    type Fields: Send + Sync + 'static;

    fn validate(form: Self::Form) -> ValidationResult<Self::Fields>;

    fn create(id: RecordId, owner: IdentityId, fields: Self::Fields, now: DateTime<Utc>) -> Self;

    /// Overwrite editable fields; owner, id and creation time are kept
    fn apply(&mut self, fields: Self::Fields, now: DateTime<Utc>);

    fn id(&self) -> RecordId;

    fn owner(&self) -> IdentityId;

    fn matches(&self, filter: &ListFilter) -> bool;

    /// Whether creating `fields` would repeat this record
    fn duplicates(&self, fields: &Self::Fields) -> bool;

    /// Display order, newest first
    fn newest_first(a: &Self, b: &Self) -> Ordering;
}

/// Parsed list query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Lowercased substring to look for
    pub text: Option<String>,
    /// Inclusive lower bound
    pub start: Option<NaiveDate>,
    /// Inclusive upper bound
    pub end: Option<NaiveDate>,
}

impl ListFilter {
    pub fn from_query(query: ListQuery) -> ValidationResult<Self> {
        let text = query
            .category
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty());
        let start = Self::bound(query.start_date, "startDate")?;
        let end = Self::bound(query.end_date, "endDate")?;
        Ok(Self { text, start, end })
    }

    fn bound(raw: Option<String>, field: &'static str) -> ValidationResult<Option<NaiveDate>> {
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => parse_date(value)
                .map(Some)
                .ok_or(ValidationError::InvalidFilter { field }),
        }
    }

    pub fn text_matches(&self, haystack: &str) -> bool {
        self.text
            .as_deref()
            .map_or(true, |needle| haystack.to_lowercase().contains(needle))
    }

    pub fn date_matches(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

/// Filter and order records for display
pub fn select<R: OwnedResource>(records: impl IntoIterator<Item = R>, filter: &ListFilter) -> Vec<R> {
    let mut selected: Vec<R> = records.into_iter().filter(|r| r.matches(filter)).collect();
    selected.sort_by(R::newest_first);
    selected
}
