//! Domain model for the film catalogue and its social graph.
//!
//! # Responsibility
//! - Define canonical records for films, users, genres and MPA ratings.
//! - Own field-level validation rules shared by every storage backend.
//!
//! # Invariants
//! - Every record is identified by a positive integer id assigned by storage.
//! - Like and friendship edges are never embedded in entity values; they live
//!   in backend-owned collections keyed by entity id.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod catalog;
pub mod film;
pub mod user;

/// Id carried by a record that has not been persisted yet.
pub const UNASSIGNED_ID: i64 = 0;

/// Entity families addressed by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Film,
    User,
    Genre,
    Mpa,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Film => "film",
            Self::User => "user",
            Self::Genre => "genre",
            Self::Mpa => "mpa",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field rule violated by a film or user payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Film name is empty after trim.
    BlankName,
    /// Film description exceeds the character limit.
    DescriptionTooLong { chars: usize, max: usize },
    /// Film release date precedes the first public film screening.
    ReleaseDateTooEarly(chrono::NaiveDate),
    /// Film duration must be at least one minute.
    NonPositiveDuration,
    BlankEmail,
    InvalidEmail(String),
    BlankLogin,
    LoginContainsWhitespace(String),
    BirthdayInFuture(chrono::NaiveDate),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "film name must not be blank"),
            Self::DescriptionTooLong { chars, max } => write!(
                f,
                "film description has {chars} characters; at most {max} allowed"
            ),
            Self::ReleaseDateTooEarly(date) => write!(
                f,
                "film release date {date} is earlier than {}",
                film::earliest_release_date()
            ),
            Self::NonPositiveDuration => write!(f, "film duration must be positive"),
            Self::BlankEmail => write!(f, "user email must not be blank"),
            Self::InvalidEmail(value) => write!(f, "user email `{value}` is malformed"),
            Self::BlankLogin => write!(f, "user login must not be blank"),
            Self::LoginContainsWhitespace(value) => {
                write!(f, "user login `{value}` must not contain whitespace")
            }
            Self::BirthdayInFuture(date) => write!(f, "user birthday {date} is in the future"),
        }
    }
}

impl Error for ValidationError {}
