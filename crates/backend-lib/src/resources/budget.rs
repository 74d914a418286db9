use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use fintrack_common::{Budget, BudgetFields, BudgetForm, IdentityId, RecordId};

use super::{ListFilter, OwnedResource};
use crate::validation::{validate_budget, ValidationResult};

impl OwnedResource for Budget {
    const COLLECTION: &'static str = "budgets";
    const LABEL: &'static str = "Budget";

    type Form = BudgetForm;
    type Fields = BudgetFields;

    fn validate(form: BudgetForm) -> ValidationResult<BudgetFields> {
        validate_budget(form)
    }

    fn create(id: RecordId, owner: IdentityId, fields: BudgetFields, now: DateTime<Utc>) -> Self {
        Budget {
            id,
            owner,
            name: fields.name,
            limit: fields.limit,
            period: fields.period,
            active: fields.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, fields: BudgetFields, now: DateTime<Utc>) {
        self.name = fields.name;
        self.limit = fields.limit;
        self.period = fields.period;
        if let Some(active) = fields.active {
            self.active = active;
        }
        self.updated_at = now;
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn owner(&self) -> IdentityId {
        self.owner
    }

    // budgets filter by name and by the day they were created
    fn matches(&self, filter: &ListFilter) -> bool {
        filter.text_matches(&self.name) && filter.date_matches(self.created_at.date_naive())
    }

    fn duplicates(&self, fields: &BudgetFields) -> bool {
        self.period == fields.period && self.name.to_lowercase() == fields.name.to_lowercase()
    }

    fn newest_first(a: &Self, b: &Self) -> Ordering {
        b.created_at.cmp(&a.created_at)
    }
}
