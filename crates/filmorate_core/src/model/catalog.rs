//! Read-only lookup entities: genres and MPA ratings.
//!
//! Both tables are seeded out of band and never mutated by callers. A film
//! refers to them by id; names are resolved by the storage backend on read.

use serde::{Deserialize, Serialize};

pub type GenreId = i64;
pub type MpaId = i64;

/// Film genre.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    #[serde(default)]
    pub name: String,
}

impl Genre {
    pub fn new(id: GenreId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Id-only reference, as submitted by callers attaching genres to a film.
    pub fn reference(id: GenreId) -> Self {
        Self::new(id, String::new())
    }
}

/// MPA age/content classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mpa {
    pub id: MpaId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Mpa {
    pub fn new(id: MpaId, name: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.map(str::to_string),
        }
    }

    /// Id-only reference to a seeded rating.
    pub fn reference(id: MpaId) -> Self {
        Self {
            id,
            name: String::new(),
            description: None,
        }
    }
}

/// Genres seeded into every fresh backend, ascending by id.
pub fn seed_genres() -> Vec<Genre> {
    [
        (1, "Comedy"),
        (2, "Drama"),
        (3, "Cartoon"),
        (4, "Thriller"),
        (5, "Documentary"),
        (6, "Action"),
    ]
    .into_iter()
    .map(|(id, name)| Genre::new(id, name))
    .collect()
}

/// MPA ratings seeded into every fresh backend, ascending by id.
///
/// Must stay in sync with `db/migrations/0002_seed_catalog.sql`.
pub fn seed_mpa() -> Vec<Mpa> {
    [
        (1, "G", "General audiences, all ages admitted"),
        (2, "PG", "Parental guidance suggested"),
        (3, "PG-13", "Parents strongly cautioned under 13"),
        (4, "R", "Restricted, under 17 requires accompanying adult"),
        (5, "NC-17", "Adults only, no one 17 and under admitted"),
    ]
    .into_iter()
    .map(|(id, name, description)| Mpa::new(id, name, Some(description)))
    .collect()
}
