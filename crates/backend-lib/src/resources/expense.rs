use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use fintrack_common::{Expense, ExpenseFields, ExpenseForm, IdentityId, RecordId};

use super::{ListFilter, OwnedResource};
use crate::validation::{validate_expense, ValidationResult};

impl OwnedResource for Expense {
    const COLLECTION: &'static str = "expenses";
    const LABEL: &'static str = "Expense";

    type Form = ExpenseForm;
    type Fields = ExpenseFields;

    fn validate(form: ExpenseForm) -> ValidationResult<ExpenseFields> {
        validate_expense(form)
    }

    fn create(id: RecordId, owner: IdentityId, fields: ExpenseFields, now: DateTime<Utc>) -> Self {
        Expense {
            id,
            owner,
            title: fields.title,
            amount: fields.amount,
            category: fields.category,
            date: fields.date,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, fields: ExpenseFields, now: DateTime<Utc>) {
        self.title = fields.title;
        self.amount = fields.amount;
        self.category = fields.category;
        self.date = fields.date;
        self.updated_at = now;
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn owner(&self) -> IdentityId {
        self.owner
    }

    fn matches(&self, filter: &ListFilter) -> bool {
        filter.text_matches(&self.category) && filter.date_matches(self.date)
    }

    fn duplicates(&self, fields: &ExpenseFields) -> bool {
        self.title == fields.title
            && self.amount == fields.amount
            && self.category == fields.category
            && self.date == fields.date
    }

    fn newest_first(a: &Self, b: &Self) -> Ordering {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    }
}
