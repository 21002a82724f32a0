//! Film domain model.
//!
//! # Responsibility
//! - Define the canonical film record with its rating and genre references.
//! - Validate scalar fields before any storage write.
//!
//! # Invariants
//! - `mpa` is required; `genres` are unique by id once persisted and are
//!   returned sorted by ascending genre id.
//! - Equality ignores `id`: two films with the same content are equal.

use crate::model::catalog::{Genre, GenreId, Mpa};
use crate::model::{ValidationError, UNASSIGNED_ID};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type FilmId = i64;

/// Maximum description length, counted in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 200;

/// Release dates before the first public screening are rejected.
pub fn earliest_release_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1895, 12, 28).unwrap_or(NaiveDate::MIN)
}

/// Canonical film record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    /// Storage-assigned id; `UNASSIGNED_ID` before the first `add`.
    #[serde(default)]
    pub id: FilmId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub release_date: NaiveDate,
    /// Duration in minutes.
    pub duration: u32,
    pub mpa: Mpa,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl Film {
    /// Creates an unsaved film without genres.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        release_date: NaiveDate,
        duration: u32,
        mpa: Mpa,
    ) -> Self {
        Self {
            id: UNASSIGNED_ID,
            name: name.into(),
            description: description.into(),
            release_date,
            duration,
            mpa,
            genres: Vec::new(),
        }
    }

    /// Replaces the genre references with id-only entries.
    pub fn with_genres(mut self, ids: impl IntoIterator<Item = GenreId>) -> Self {
        self.genres = ids.into_iter().map(Genre::reference).collect();
        self
    }

    /// Deduplicated genre ids in ascending order.
    pub fn genre_ids(&self) -> Vec<GenreId> {
        self.genres
            .iter()
            .map(|genre| genre.id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Checks scalar field rules.
    ///
    /// Reference resolution (rating, genres) is a storage concern and is not
    /// covered here.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankName);
        }

        let chars = self.description.chars().count();
        if chars > DESCRIPTION_MAX_CHARS {
            return Err(ValidationError::DescriptionTooLong {
                chars,
                max: DESCRIPTION_MAX_CHARS,
            });
        }

        if self.release_date < earliest_release_date() {
            return Err(ValidationError::ReleaseDateTooEarly(self.release_date));
        }

        if self.duration == 0 {
            return Err(ValidationError::NonPositiveDuration);
        }

        Ok(())
    }
}

impl PartialEq for Film {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.release_date == other.release_date
            && self.duration == other.duration
            && self.mpa.id == other.mpa.id
            && self.genre_ids() == other.genre_ids()
    }
}

impl Eq for Film {}
