//! The module contains the `Entry` type representing one income or expense
//! record in the ledger.
use core::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, util::normalize_text};

/// Category used when the user leaves the field blank.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Stable identifier of an entry.
///
/// Entries keep their id across edits and reorderings, so update and delete
/// never depend on the position of the entry in the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First 8 hex digits, enough to tell entries apart in listings.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }

    pub(crate) fn simple(&self) -> String {
        self.0.simple().to_string()
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| EngineError::KeyNotFound(s.to_string()))
    }
}

/// Whether an entry adds to or subtracts from the balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidEntry(format!(
                "unknown entry type: {other}"
            ))),
        }
    }
}

/// One persisted ledger record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    pub amount: Money,
}

/// User input for a new entry, before validation.
#[derive(Clone, Debug)]
pub struct EntryDraft {
    pub kind: EntryKind,
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    pub amount: Money,
}

/// Partial update of an entry: `None` keeps the stored value.
#[derive(Clone, Debug, Default)]
pub struct EntryPatch {
    pub kind: Option<EntryKind>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub amount: Option<Money>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.date.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.amount.is_none()
    }
}

impl Entry {
    /// Validates a draft and assigns it a fresh id.
    pub(crate) fn from_draft(draft: EntryDraft) -> ResultEngine<Self> {
        ensure_amount(draft.amount)?;
        Ok(Self {
            id: EntryId::new(),
            kind: draft.kind,
            date: draft.date,
            description: normalize_text(&draft.description),
            category: normalize_category(&draft.category),
            amount: draft.amount,
        })
    }

    /// Applies a patch in place. Validation happens before any field changes.
    pub(crate) fn apply(&mut self, patch: EntryPatch) -> ResultEngine<()> {
        if let Some(amount) = patch.amount {
            ensure_amount(amount)?;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(description) = patch.description {
            self.description = normalize_text(&description);
        }
        if let Some(category) = patch.category {
            self.category = normalize_category(&category);
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        Ok(())
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} ({})",
            self.kind, self.date, self.amount, self.description, self.category
        )
    }
}

fn ensure_amount(amount: Money) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::InvalidAmount(
            "amount must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn normalize_category(input: &str) -> String {
    let normalized = normalize_text(input);
    if normalized.is_empty() {
        UNCATEGORIZED.to_string()
    } else {
        normalized
    }
}
