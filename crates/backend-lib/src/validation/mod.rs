// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Input validation module.
//!
//! Turns raw form submissions into validated field sets. Messages are the
//! user-facing texts shown in notices and API error bodies.

use chrono::NaiveDate;
use fintrack_common::{BudgetFields, BudgetForm, BudgetPeriod, ExpenseFields, ExpenseForm, FormValue};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// Common validation constants
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit
const MAX_TITLE_LENGTH: usize = 100;
const MAX_CATEGORY_LENGTH: usize = 50;
const MIN_BUDGET_NAME_LENGTH: usize = 3;

/// Date format accepted in forms and list filters
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Possible validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    InvalidEmail(String),

    #[error("{0}")]
    InvalidPassword(String),

    #[error("Please provide {0}")]
    MissingField(&'static str),

    #[error("{message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error("Invalid {field} filter: expected YYYY-MM-DD")]
    InvalidFilter { field: &'static str },
}

impl ValidationError {
    fn field(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field,
            message: message.into(),
        }
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate an email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if email.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "Email address cannot be empty".to_string(),
        ));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email address cannot exceed {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(
            "Invalid email address format".to_string(),
        ));
    }

    Ok(email)
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

fn required_text(value: Option<String>, field: &'static str) -> ValidationResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn required_amount(
    value: Option<FormValue>,
    field: &'static str,
    negative_message: &str,
) -> ValidationResult<f64> {
    let amount = match value.as_ref().and_then(FormValue::as_number) {
        None => return Err(ValidationError::MissingField(field)),
        Some(Err(raw)) => {
            return Err(ValidationError::field(
                field,
                format!("Invalid {field}: {raw}"),
            ))
        },
        Some(Ok(n)) => n,
    };

    if !amount.is_finite() {
        return Err(ValidationError::field(field, format!("Invalid {field}")));
    }
    if amount < 0.0 {
        return Err(ValidationError::field(field, negative_message));
    }
    Ok(amount)
}

/// Validate an expense submission
pub fn validate_expense(form: ExpenseForm) -> ValidationResult<ExpenseFields> {
    let title = required_text(form.title, "title")?;
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ValidationError::field(
            "title",
            format!("Title cannot exceed {MAX_TITLE_LENGTH} characters"),
        ));
    }

    let amount = required_amount(form.amount, "amount", "Amount cannot be negative")?;

    let category = required_text(form.category, "category")?;
    if category.chars().count() > MAX_CATEGORY_LENGTH {
        return Err(ValidationError::field(
            "category",
            format!("Category cannot exceed {MAX_CATEGORY_LENGTH} characters"),
        ));
    }

    let raw_date = required_text(form.date, "date")?;
    let date = parse_date(&raw_date).ok_or_else(|| {
        ValidationError::field("date", format!("Invalid date: {raw_date}"))
    })?;

    Ok(ExpenseFields {
        title,
        amount,
        category,
        date,
    })
}

/// Validate a budget submission
pub fn validate_budget(form: BudgetForm) -> ValidationResult<BudgetFields> {
    let name = form
        .name
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ValidationError::field("name", "Budget name is required"))?;
    if name.chars().count() < MIN_BUDGET_NAME_LENGTH {
        return Err(ValidationError::field(
            "name",
            format!("Budget name must be at least {MIN_BUDGET_NAME_LENGTH} characters long"),
        ));
    }

    let limit = match form.limit.as_ref().and_then(FormValue::as_number) {
        None => return Err(ValidationError::field("limit", "Budget limit is required")),
        Some(_) => required_amount(form.limit, "limit", "Limit must be positive")?,
    };

    let period = form
        .period
        .as_deref()
        .and_then(BudgetPeriod::parse)
        .ok_or_else(|| {
            ValidationError::field("period", "Period must be weekly, monthly, or yearly")
        })?;

    let active = match form.active {
        None => None,
        Some(value) => Some(value.as_flag().ok_or_else(|| {
            ValidationError::field("active", "Active must be true or false")
        })?),
    };

    Ok(BudgetFields {
        name,
        limit,
        period,
        active,
    })
}
