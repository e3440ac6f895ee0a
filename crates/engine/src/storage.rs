//! Durable key-value storage.
//!
//! Each [`RecordKey`] maps to one row of the `records` table holding a JSON
//! document. A write replaces the whole document, so a record is either fully
//! old or fully new.
//!
//! Consistency model: single writer, read-modify-write. Callers that need to
//! read a record, change it and write it back do so through the `*_with`
//! functions inside one database transaction.

use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseConnection, DatabaseTransaction, TransactionTrait,
    prelude::*, sea_query::OnConflict,
};
use serde::{Serialize, de::DeserializeOwned};

use crate::{EngineError, ResultEngine, records};

/// Keys of the durable records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKey {
    User,
    Entries,
}

impl RecordKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Entries => "entries",
        }
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of reading a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loaded<T> {
    /// Nothing stored under the key.
    Absent,
    /// A value is stored but does not decode into `T`.
    Corrupt(String),
    Present(T),
}

impl<T> Loaded<T> {
    /// Maps `Absent` to `default`, `Corrupt` to [`EngineError::CorruptRecord`].
    pub fn or_default_for(self, key: RecordKey, default: T) -> ResultEngine<T> {
        match self {
            Self::Absent => Ok(default),
            Self::Corrupt(reason) => Err(EngineError::CorruptRecord {
                key: key.to_string(),
                reason,
            }),
            Self::Present(value) => Ok(value),
        }
    }

    /// Maps `Absent` to `None`, `Corrupt` to [`EngineError::CorruptRecord`].
    pub fn optional(self, key: RecordKey) -> ResultEngine<Option<T>> {
        match self {
            Self::Absent => Ok(None),
            Self::Corrupt(reason) => Err(EngineError::CorruptRecord {
                key: key.to_string(),
                reason,
            }),
            Self::Present(value) => Ok(Some(value)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Storage {
    database: DatabaseConnection,
}

impl Storage {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    pub async fn load<T: DeserializeOwned>(&self, key: RecordKey) -> ResultEngine<Loaded<T>> {
        load_with(&self.database, key).await
    }

    pub async fn save<T: Serialize>(&self, key: RecordKey, value: &T) -> ResultEngine<()> {
        save_with(&self.database, key, value).await
    }

    pub async fn remove(&self, key: RecordKey) -> ResultEngine<()> {
        records::Entity::delete_by_id(key.as_str().to_string())
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// Deletes every durable record.
    pub async fn clear(&self) -> ResultEngine<()> {
        let res = records::Entity::delete_many().exec(&self.database).await?;
        tracing::debug!(rows = res.rows_affected, "storage cleared");
        Ok(())
    }

    pub(crate) async fn begin(&self) -> ResultEngine<DatabaseTransaction> {
        Ok(self.database.begin().await?)
    }
}

pub(crate) async fn load_with<C, T>(conn: &C, key: RecordKey) -> ResultEngine<Loaded<T>>
where
    C: ConnectionTrait,
    T: DeserializeOwned,
{
    let Some(model) = records::Entity::find_by_id(key.as_str().to_string())
        .one(conn)
        .await?
    else {
        return Ok(Loaded::Absent);
    };

    match serde_json::from_str(&model.value) {
        Ok(value) => Ok(Loaded::Present(value)),
        Err(err) => {
            tracing::warn!(%key, "stored record does not decode: {err}");
            Ok(Loaded::Corrupt(err.to_string()))
        }
    }
}

pub(crate) async fn save_with<C, T>(conn: &C, key: RecordKey, value: &T) -> ResultEngine<()>
where
    C: ConnectionTrait,
    T: Serialize,
{
    let payload = serde_json::to_string(value)?;
    let bytes = payload.len();
    let model = records::ActiveModel {
        name: ActiveValue::Set(key.as_str().to_string()),
        value: ActiveValue::Set(payload),
        updated_at: ActiveValue::Set(Utc::now()),
    };
    records::Entity::insert(model)
        .on_conflict(
            OnConflict::column(records::Column::Name)
                .update_columns([records::Column::Value, records::Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    tracing::debug!(%key, bytes, "record saved");
    Ok(())
}
