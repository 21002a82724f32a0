//! Core use-case services.
//!
//! # Responsibility
//! - Validate caller-supplied ids and counts before storage is touched.
//! - Turn edge no-ops reported by repositories into explicit conflicts.
//! - Keep callers decoupled from the selected storage backend.

use crate::model::{EntityKind, ValidationError};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod catalog_service;
pub mod film_service;
pub mod id_guard;
pub mod user_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Coarse error class for status mapping at an outer boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Conflict,
    Internal,
}

/// Service error for every use-case.
#[derive(Debug)]
pub enum ServiceError {
    /// No id was supplied where one is required.
    MissingId(EntityKind),
    /// Supplied id is zero or negative.
    NonPositiveId { kind: EntityKind, id: i64 },
    /// Requested popular-list size is zero or negative.
    InvalidCount(i64),
    /// Create payload already carries an id.
    IdAssignedByStorage { kind: EntityKind, id: i64 },
    NotFound { kind: EntityKind, id: i64 },
    /// Edge already present, edge absent, or self-friendship.
    Conflict(String),
    Validation(ValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingId(_) | Self::NonPositiveId { .. } | Self::NotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::InvalidCount(_) | Self::IdAssignedByStorage { .. } | Self::Validation(_) => {
                ErrorKind::InvalidArgument
            }
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Repo(_) => ErrorKind::Internal,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingId(kind) => write!(f, "{kind} id is required"),
            Self::NonPositiveId { kind, id } => {
                write!(f, "{kind} id must be positive, got {id}")
            }
            Self::InvalidCount(count) => write!(f, "count must be positive, got {count}"),
            Self::IdAssignedByStorage { kind, id } => {
                write!(f, "new {kind} must not carry an id, got {id}")
            }
            Self::NotFound { kind, id } => write!(f, "{kind} with id {id} does not exist"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, ServiceError};
    use crate::model::{EntityKind, ValidationError};
    use crate::repo::RepoError;

    #[test]
    fn repo_not_found_keeps_kind_and_id() {
        let err = ServiceError::from(RepoError::not_found(EntityKind::Genre, 9999));
        assert!(matches!(
            err,
            ServiceError::NotFound {
                kind: EntityKind::Genre,
                id: 9999
            }
        ));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("9999"));
    }

    #[test]
    fn classifies_every_variant() {
        assert_eq!(
            ServiceError::MissingId(EntityKind::Film).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(ServiceError::InvalidCount(0).kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            ServiceError::from(RepoError::from(ValidationError::BlankLogin)).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            ServiceError::Conflict("like exists".to_string()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            ServiceError::from(RepoError::StoragePoisoned("memory store")).kind(),
            ErrorKind::Internal
        );
    }
}
