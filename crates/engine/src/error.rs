//! The module contains the errors the engine can throw.
//!
//! Validation errors ([`InvalidPin`], [`InvalidAmount`], ...) are meant to be
//! shown to the user as-is. [`CorruptRecord`] is raised when a persisted record
//! exists but cannot be decoded: the engine never treats it as "no data".
//!
//!  [`InvalidPin`]: EngineError::InvalidPin
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`CorruptRecord`]: EngineError::CorruptRecord
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("PIN must be a 4-digit number")]
    InvalidPin,
    #[error("Incorrect PIN")]
    WrongPin,
    #[error("No profile registered")]
    NotRegistered,
    #[error("A profile is already registered")]
    AlreadyRegistered,
    #[error("Not logged in")]
    NotAuthenticated,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" matches more than one entry")]
    AmbiguousId(String),
    #[error("Stored record \"{key}\" is corrupt: {reason}")]
    CorruptRecord { key: String, reason: String },
    #[error("Unsupported image type: {0}")]
    UnsupportedImage(String),
    #[error("Cannot read photo: {0}")]
    Photo(std::io::Error),
    #[error("Report export failed: {0}")]
    Export(String),
    #[error("Session store error: {0}")]
    Session(std::io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidPin, Self::InvalidPin) => true,
            (Self::WrongPin, Self::WrongPin) => true,
            (Self::NotRegistered, Self::NotRegistered) => true,
            (Self::AlreadyRegistered, Self::AlreadyRegistered) => true,
            (Self::NotAuthenticated, Self::NotAuthenticated) => true,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidEntry(a), Self::InvalidEntry(b)) => a == b,
            (Self::InvalidProfile(a), Self::InvalidProfile(b)) => a == b,
            (Self::InvalidDateRange(a), Self::InvalidDateRange(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::AmbiguousId(a), Self::AmbiguousId(b)) => a == b,
            (
                Self::CorruptRecord { key: a, .. },
                Self::CorruptRecord { key: b, .. },
            ) => a == b,
            (Self::UnsupportedImage(a), Self::UnsupportedImage(b)) => a == b,
            (Self::Export(a), Self::Export(b)) => a == b,
            (Self::Photo(a), Self::Photo(b)) => a.kind() == b.kind(),
            (Self::Session(a), Self::Session(b)) => a.kind() == b.kind(),
            (Self::Serialization(a), Self::Serialization(b)) => a.to_string() == b.to_string(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
