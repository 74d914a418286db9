// ================
// common/src/lib.rs
// ================
//! Common types shared between the fintrack server and its clients.
//! This module defines the records, form payloads and page payloads that
//! cross the HTTP boundary.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a registered account
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct IdentityId(pub Uuid);

impl IdentityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for IdentityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of an owned record (expense or budget)
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a record id from a path segment. Malformed ids yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Severity of a flash notice
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Error,
}

/// One-shot, human-readable message shown on the next rendered page
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

/// A single spending entry
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: RecordId,
    pub owner: IdentityId,
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated expense input
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseFields {
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
}

/// Budget reset period
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

/// A spending limit over a period
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: RecordId,
    pub owner: IdentityId,
    pub name: String,
    pub limit: f64,
    pub period: BudgetPeriod,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated budget input. `active` is optional so that an update can leave
/// the flag untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetFields {
    pub name: String,
    pub limit: f64,
    pub period: BudgetPeriod,
    pub active: Option<bool>,
}

/// A scalar submitted either by an HTML form (always text) or by a JSON
/// client (number / bool).
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum FormValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl FormValue {
    /// Numeric reading of the value; blank text counts as absent.
    pub fn as_number(&self) -> Option<Result<f64, String>> {
        match self {
            FormValue::Number(n) => Some(Ok(*n)),
            FormValue::Text(t) if t.trim().is_empty() => None,
            FormValue::Text(t) => Some(t.trim().parse::<f64>().map_err(|_| t.clone())),
            FormValue::Flag(b) => Some(Err(b.to_string())),
        }
    }

    /// Checkbox reading: `on`, `true`, `1` are set; `off`, `false`, `0` are clear.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FormValue::Flag(b) => Some(*b),
            FormValue::Number(n) => Some(*n != 0.0),
            FormValue::Text(t) => match t.trim().to_ascii_lowercase().as_str() {
                "on" | "true" | "1" | "yes" => Some(true),
                "off" | "false" | "0" | "no" | "" => Some(false),
                _ => None,
            },
        }
    }
}

/// Raw expense submission
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ExpenseForm {
    pub title: Option<String>,
    pub amount: Option<FormValue>,
    pub category: Option<String>,
    pub date: Option<String>,
}

/// Raw budget submission
#[derive(Deserialize, Debug, Clone, Default)]
pub struct BudgetForm {
    pub name: Option<String>,
    pub limit: Option<FormValue>,
    pub period: Option<String>,
    pub active: Option<FormValue>,
}

/// Registration form. `password1` is the confirmation field.
#[derive(Deserialize, Clone, Default)]
pub struct RegisterForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub password1: Option<String>,
}

/// Logon form
#[derive(Deserialize, Clone, Default)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Query string accepted by list endpoints
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ListQuery {
    pub category: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

/// Records returned by a list endpoint
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RecordList<T> {
    pub records: Vec<T>,
    pub count: usize,
}

impl<T> RecordList<T> {
    pub fn new(records: Vec<T>) -> Self {
        let count = records.len();
        Self { records, count }
    }
}

/// Everything a renderer needs to draw one page
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PageView<T> {
    /// Token to embed in every form on the page
    pub csrf_token: String,
    /// Email of the signed-in account, if any
    pub user: Option<String>,
    /// Notices drained for this render
    pub notices: Vec<Notice>,
    pub data: T,
}
