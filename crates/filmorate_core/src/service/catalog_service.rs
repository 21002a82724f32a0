//! Read-only lookups over genres and MPA ratings.

use crate::model::catalog::{Genre, Mpa};
use crate::model::EntityKind;
use crate::repo::catalog_repo::{GenreRepository, MpaRepository};
use crate::service::id_guard::require_id;
use crate::service::ServiceResult;

/// Catalog service facade over repository implementations.
pub struct CatalogService<G: GenreRepository, M: MpaRepository> {
    genres: G,
    mpa: M,
}

impl<G: GenreRepository, M: MpaRepository> CatalogService<G, M> {
    pub fn new(genres: G, mpa: M) -> Self {
        Self { genres, mpa }
    }

    /// All genres, ascending by id.
    pub fn genres(&self) -> ServiceResult<Vec<Genre>> {
        Ok(self.genres.get_all()?)
    }

    pub fn genre_by_id(&self, id: Option<i64>) -> ServiceResult<Genre> {
        let id = require_id(EntityKind::Genre, id)?;
        Ok(self.genres.get_by_id(id)?)
    }

    /// All ratings, ascending by id.
    pub fn mpas(&self) -> ServiceResult<Vec<Mpa>> {
        Ok(self.mpa.get_all()?)
    }

    pub fn mpa_by_id(&self, id: Option<i64>) -> ServiceResult<Mpa> {
        let id = require_id(EntityKind::Mpa, id)?;
        Ok(self.mpa.get_by_id(id)?)
    }
}
