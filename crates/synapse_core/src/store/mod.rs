//! Local persisted state: key-value entries, activity cache and session.
//!
//! # Responsibility
//! - Provide a string-keyed durable store (`KvStore`) over SQLite.
//! - Own the bounded newest-first activity list and the access credential.
//!
//! # Invariants
//! - Every mutation updates in-memory state before it is persisted, so a
//!   persistence failure never hides a capture from the running session.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod activity;
pub mod kv;
pub mod session;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure while reading or writing local state.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Encode(serde_json::Error),
    Decode {
        key: &'static str,
        source: serde_json::Error,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode local state: {err}"),
            Self::Decode { key, source } => {
                write!(f, "invalid persisted value under `{key}`: {source}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Decode { source, .. } => Some(source),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
