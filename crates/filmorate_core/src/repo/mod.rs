//! Repository contracts and their two storage backends.
//!
//! # Responsibility
//! - Define one trait per entity family (`GenreRepository`, `MpaRepository`,
//!   `FilmRepository`, `UserRepository`).
//! - Provide a durable SQLite implementation and a transient in-memory
//!   implementation with identical caller-visible semantics.
//!
//! # Invariants
//! - Write paths validate payloads before any mutation.
//! - Missing ids surface as `RepoError::NotFound { kind, id }`.
//! - Edge operations report whether the edge set changed; they never fail on
//!   a duplicate or missing edge. Conflict policy belongs to the services.
//! - Multi-entry writes (genre replace, symmetric friendship) are atomic.

use crate::db::DbError;
use crate::model::{EntityKind, ValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};

pub mod catalog_repo;
pub mod film_repo;
pub mod memory;
pub mod storage;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by every repository operation.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Validation(ValidationError),
    /// Referenced entity does not exist.
    NotFound { kind: EntityKind, id: i64 },
    /// Persisted state cannot be mapped back to a domain record.
    InvalidData(String),
    /// A previous holder of the storage lock panicked.
    StoragePoisoned(&'static str),
}

impl RepoError {
    pub fn not_found(kind: EntityKind, id: i64) -> Self {
        Self::NotFound { kind, id }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} with id {id} does not exist"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::StoragePoisoned(what) => write!(f, "{what} lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
            Self::StoragePoisoned(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn lock<'a, T>(
    mutex: &'a Mutex<T>,
    what: &'static str,
) -> RepoResult<MutexGuard<'a, T>> {
    mutex.lock().map_err(|_| RepoError::StoragePoisoned(what))
}
