//! Entry store: the ordered list of ledger entries.
//!
//! Every operation reloads the list from storage; mutations write the whole
//! list back inside the same transaction.

use std::{fmt, str::FromStr};

use sea_orm::ConnectionTrait;

use crate::{
    EngineError, Entry, EntryDraft, EntryId, EntryPatch, ResultEngine, aggregate,
    storage::{self, RecordKey},
};

use super::{Engine, with_tx};

const MIN_PREFIX_LEN: usize = 4;

/// How the user points at an entry.
///
/// - a full id (`3f2a…-…`), or a unique prefix of at least 4 hex digits;
/// - a 1-based position in the history listing: `#2`, or a bare number
///   shorter than 4 digits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryRef {
    Id(EntryId),
    Prefix(String),
    Position(usize),
}

impl From<EntryId> for EntryRef {
    fn from(id: EntryId) -> Self {
        Self::Id(id)
    }
}

impl fmt::Display for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Prefix(prefix) => f.write_str(prefix),
            Self::Position(pos) => write!(f, "#{pos}"),
        }
    }
}

impl FromStr for EntryRef {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || EngineError::InvalidEntry(format!("not an entry reference: {trimmed}"));

        if let Some(pos) = trimmed.strip_prefix('#') {
            return pos.parse().map(Self::Position).map_err(|_| invalid());
        }
        if trimmed.len() < MIN_PREFIX_LEN && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return trimmed.parse().map(Self::Position).map_err(|_| invalid());
        }
        if let Ok(id) = trimmed.parse::<EntryId>() {
            return Ok(Self::Id(id));
        }

        let prefix: String = trimmed
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if prefix.len() >= MIN_PREFIX_LEN && prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(Self::Prefix(prefix));
        }
        Err(invalid())
    }
}

impl EntryRef {
    /// Index of the referenced entry in `entries`.
    fn locate(&self, entries: &[Entry]) -> ResultEngine<usize> {
        let not_found = || EngineError::KeyNotFound(self.to_string());
        match self {
            Self::Id(id) => entries
                .iter()
                .position(|entry| entry.id == *id)
                .ok_or_else(not_found),
            Self::Position(pos) => {
                if *pos == 0 || *pos > entries.len() {
                    return Err(not_found());
                }
                Ok(pos - 1)
            }
            Self::Prefix(prefix) => {
                let mut matches = entries
                    .iter()
                    .enumerate()
                    .filter(|(_, entry)| entry.id.simple().starts_with(prefix.as_str()));
                let (idx, _) = matches.next().ok_or_else(not_found)?;
                if matches.next().is_some() {
                    return Err(EngineError::AmbiguousId(prefix.clone()));
                }
                Ok(idx)
            }
        }
    }
}

async fn load_entries<C: ConnectionTrait>(conn: &C) -> ResultEngine<Vec<Entry>> {
    storage::load_with::<_, Vec<Entry>>(conn, RecordKey::Entries)
        .await?
        .or_default_for(RecordKey::Entries, Vec::new())
}

impl Engine {
    /// All entries in insertion order.
    pub async fn entries(&self) -> ResultEngine<Vec<Entry>> {
        self.require_active().await?;
        self.storage
            .load::<Vec<Entry>>(RecordKey::Entries)
            .await?
            .or_default_for(RecordKey::Entries, Vec::new())
    }

    pub async fn entry(&self, reference: &EntryRef) -> ResultEngine<Entry> {
        let entries = self.entries().await?;
        let idx = reference.locate(&entries)?;
        Ok(entries[idx].clone())
    }

    /// Appends a new entry at the end of the list.
    ///
    /// Rejected with [`EngineError::InvalidAmount`] when the list totals would
    /// no longer fit in [`crate::Money`].
    pub async fn add_entry(&self, draft: EntryDraft) -> ResultEngine<Entry> {
        self.require_active().await?;
        let entry = Entry::from_draft(draft)?;

        with_tx!(self, |db_tx| {
            let mut entries = load_entries(&db_tx).await?;
            entries.push(entry.clone());
            aggregate::totals(&entries)?;
            storage::save_with(&db_tx, RecordKey::Entries, &entries).await?;
            Ok::<_, EngineError>(())
        })?;

        tracing::info!(id = %entry.id, kind = %entry.kind, "entry added");
        Ok(entry)
    }

    /// Changes the fields set in `patch`; the entry keeps its id and position.
    pub async fn update_entry(&self, reference: &EntryRef, patch: EntryPatch) -> ResultEngine<Entry> {
        self.require_active().await?;

        let updated = with_tx!(self, |db_tx| {
            let mut entries = load_entries(&db_tx).await?;
            let idx = reference.locate(&entries)?;
            entries[idx].apply(patch)?;
            aggregate::totals(&entries)?;
            let updated = entries[idx].clone();
            storage::save_with(&db_tx, RecordKey::Entries, &entries).await?;
            Ok::<_, EngineError>(updated)
        })?;

        tracing::info!(id = %updated.id, "entry updated");
        Ok(updated)
    }

    /// Removes one entry, keeping the order of the others.
    pub async fn delete_entry(&self, reference: &EntryRef) -> ResultEngine<Entry> {
        self.require_active().await?;

        let removed = with_tx!(self, |db_tx| {
            let mut entries = load_entries(&db_tx).await?;
            let idx = reference.locate(&entries)?;
            let removed = entries.remove(idx);
            storage::save_with(&db_tx, RecordKey::Entries, &entries).await?;
            Ok::<_, EngineError>(removed)
        })?;

        tracing::info!(id = %removed.id, "entry deleted");
        Ok(removed)
    }
}
