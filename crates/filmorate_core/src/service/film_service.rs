//! Film use-case service.
//!
//! # Responsibility
//! - Film CRUD with id preconditions.
//! - Like edges with conflict reporting.
//! - Popular-film ranking with count defaulting and clamping.
//!
//! # Invariants
//! - Ids are checked by `require_id` before any repository call.
//! - A duplicate like or a missing like is a `Conflict`.

use crate::model::film::{Film, FilmId};
use crate::model::user::UserId;
use crate::model::{EntityKind, UNASSIGNED_ID};
use crate::repo::film_repo::FilmRepository;
use crate::service::id_guard::require_id;
use crate::service::{ServiceError, ServiceResult};
use log::{info, warn};

/// Popular-list size used when the caller gives none.
pub const DEFAULT_POPULAR_COUNT: i64 = 10;

/// Film service facade over repository implementations.
pub struct FilmService<F: FilmRepository> {
    films: F,
}

impl<F: FilmRepository> FilmService<F> {
    pub fn new(films: F) -> Self {
        Self { films }
    }

    /// Stores a new film. Storage assigns the id.
    pub fn create(&self, film: &Film) -> ServiceResult<Film> {
        if film.id != UNASSIGNED_ID {
            return Err(ServiceError::IdAssignedByStorage {
                kind: EntityKind::Film,
                id: film.id,
            });
        }
        Ok(self.films.add(film)?)
    }

    /// Overwrites the film addressed by `film.id`.
    pub fn update(&self, film: &Film) -> ServiceResult<Film> {
        require_id(EntityKind::Film, Some(film.id))?;
        Ok(self.films.update(film)?)
    }

    pub fn get_all(&self) -> ServiceResult<Vec<Film>> {
        Ok(self.films.get_all()?)
    }

    pub fn get_by_id(&self, id: Option<i64>) -> ServiceResult<Film> {
        let id = require_id(EntityKind::Film, id)?;
        Ok(self.films.get_by_id(id)?)
    }

    pub fn add_like(&self, film_id: Option<i64>, user_id: Option<i64>) -> ServiceResult<()> {
        let (film_id, user_id) = like_ids(film_id, user_id)?;
        if self.films.add_like(film_id, user_id)? {
            info!("event=like_add module=service status=ok film_id={film_id} user_id={user_id}");
            Ok(())
        } else {
            Err(like_conflict(film_id, user_id, "already likes"))
        }
    }

    pub fn delete_like(&self, film_id: Option<i64>, user_id: Option<i64>) -> ServiceResult<()> {
        let (film_id, user_id) = like_ids(film_id, user_id)?;
        if self.films.delete_like(film_id, user_id)? {
            info!(
                "event=like_delete module=service status=ok film_id={film_id} user_id={user_id}"
            );
            Ok(())
        } else {
            Err(like_conflict(film_id, user_id, "does not like"))
        }
    }

    /// Ids of the users who like the film, ascending.
    pub fn likes(&self, film_id: Option<i64>) -> ServiceResult<Vec<UserId>> {
        let film_id = require_id(EntityKind::Film, film_id)?;
        Ok(self.films.likes(film_id)?)
    }

    /// Most liked films first.
    ///
    /// `count` defaults to `DEFAULT_POPULAR_COUNT` and is clamped to the
    /// number of stored films.
    ///
    /// # Errors
    /// - `ServiceError::InvalidCount` when `count <= 0`.
    pub fn popular(&self, count: Option<i64>) -> ServiceResult<Vec<Film>> {
        let count = count.unwrap_or(DEFAULT_POPULAR_COUNT);
        if count <= 0 {
            warn!("event=popular_rejected module=service status=error count={count}");
            return Err(ServiceError::InvalidCount(count));
        }

        let requested = usize::try_from(count).unwrap_or(usize::MAX);
        let limit = requested.min(self.films.count()?);
        Ok(self.films.popular(limit)?)
    }

    /// Drops every film and like.
    pub fn reset(&self) -> ServiceResult<()> {
        Ok(self.films.reset()?)
    }
}

fn like_ids(film_id: Option<i64>, user_id: Option<i64>) -> ServiceResult<(FilmId, UserId)> {
    Ok((
        require_id(EntityKind::Film, film_id)?,
        require_id(EntityKind::User, user_id)?,
    ))
}

fn like_conflict(film_id: FilmId, user_id: UserId, relation: &str) -> ServiceError {
    warn!(
        "event=like_conflict module=service status=error film_id={film_id} user_id={user_id}"
    );
    ServiceError::Conflict(format!("user {user_id} {relation} film {film_id}"))
}
