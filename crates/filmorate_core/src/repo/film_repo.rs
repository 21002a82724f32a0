//! Film repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over film rows joined with their rating and genre set.
//! - Own the like-edge set and the popularity ranking.
//!
//! # Invariants
//! - `add`/`update` validate the payload and resolve rating + genres before
//!   writing; scalar and genre writes share one immediate transaction.
//! - An empty genre submission clears the film's associations.
//! - Ranking is `like_count DESC, id ASC`.
//! - Like edges check user existence with `user_repo::ensure_user_exists`,
//!   the helper behind `UserRepository::exists`, on the same connection so
//!   the check and the write see one snapshot.

use crate::db::SharedConnection;
use crate::model::catalog::Mpa;
use crate::model::film::{Film, FilmId};
use crate::model::user::UserId;
use crate::model::EntityKind;
use crate::repo::catalog_repo::{
    ensure_genres_exist, ensure_mpa_exists, load_film_genres, replace_film_genres, row_exists,
};
use crate::repo::user_repo::ensure_user_exists;
use crate::repo::{lock, RepoError, RepoResult};
use log::info;
use rusqlite::{params, Connection, Row, TransactionBehavior};
use std::sync::Arc;

const FILM_SELECT_SQL: &str = "SELECT
    f.id AS id,
    f.name AS name,
    f.description AS description,
    f.release_date AS release_date,
    f.duration AS duration,
    f.mpa_id AS mpa_id,
    m.name AS mpa_name,
    m.description AS mpa_description
FROM films f
INNER JOIN mpa m ON m.id = f.mpa_id";

/// Repository interface for films and their like edges.
pub trait FilmRepository: Send + Sync {
    /// Persists a new film and returns it with the assigned id.
    fn add(&self, film: &Film) -> RepoResult<Film>;
    /// Overwrites an existing film, including its genre set.
    fn update(&self, film: &Film) -> RepoResult<Film>;
    fn get_all(&self) -> RepoResult<Vec<Film>>;
    fn get_by_id(&self, id: FilmId) -> RepoResult<Film>;
    fn count(&self) -> RepoResult<usize>;
    /// Returns `true` when a new like edge was stored.
    fn add_like(&self, film_id: FilmId, user_id: UserId) -> RepoResult<bool>;
    /// Returns `true` when an existing like edge was removed.
    fn delete_like(&self, film_id: FilmId, user_id: UserId) -> RepoResult<bool>;
    /// Liking user ids, ascending.
    fn likes(&self, film_id: FilmId) -> RepoResult<Vec<UserId>>;
    /// Up to `limit` films ordered by like count, most liked first.
    fn popular(&self, limit: usize) -> RepoResult<Vec<Film>>;
    /// Drops every film, genre association and like.
    fn reset(&self) -> RepoResult<()>;
}

impl<T: FilmRepository + ?Sized> FilmRepository for Arc<T> {
    fn add(&self, film: &Film) -> RepoResult<Film> {
        (**self).add(film)
    }

    fn update(&self, film: &Film) -> RepoResult<Film> {
        (**self).update(film)
    }

    fn get_all(&self) -> RepoResult<Vec<Film>> {
        (**self).get_all()
    }

    fn get_by_id(&self, id: FilmId) -> RepoResult<Film> {
        (**self).get_by_id(id)
    }

    fn count(&self) -> RepoResult<usize> {
        (**self).count()
    }

    fn add_like(&self, film_id: FilmId, user_id: UserId) -> RepoResult<bool> {
        (**self).add_like(film_id, user_id)
    }

    fn delete_like(&self, film_id: FilmId, user_id: UserId) -> RepoResult<bool> {
        (**self).delete_like(film_id, user_id)
    }

    fn likes(&self, film_id: FilmId) -> RepoResult<Vec<UserId>> {
        (**self).likes(film_id)
    }

    fn popular(&self, limit: usize) -> RepoResult<Vec<Film>> {
        (**self).popular(limit)
    }

    fn reset(&self) -> RepoResult<()> {
        (**self).reset()
    }
}

/// SQLite-backed film repository.
pub struct SqliteFilmRepository {
    conn: SharedConnection,
}

impl SqliteFilmRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl FilmRepository for SqliteFilmRepository {
    fn add(&self, film: &Film) -> RepoResult<Film> {
        film.validate()?;
        let genre_ids = film.genre_ids();

        let mut conn = lock(&self.conn, "sqlite connection")?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_mpa_exists(&tx, film.mpa.id)?;
        ensure_genres_exist(&tx, &genre_ids)?;

        tx.execute(
            "INSERT INTO films (name, description, release_date, duration, mpa_id)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                film.name.as_str(),
                film.description.as_str(),
                film.release_date,
                film.duration,
                film.mpa.id,
            ],
        )?;
        let id = tx.last_insert_rowid();
        if !genre_ids.is_empty() {
            replace_film_genres(&tx, id, &genre_ids)?;
        }

        let stored = load_film(&tx, id)?
            .ok_or_else(|| RepoError::InvalidData(format!("film {id} missing after insert")))?;
        tx.commit()?;

        info!(
            "event=film_add module=repo status=ok backend=sqlite film_id={id} genres={}",
            genre_ids.len()
        );
        Ok(stored)
    }

    fn update(&self, film: &Film) -> RepoResult<Film> {
        film.validate()?;
        let genre_ids = film.genre_ids();

        let mut conn = lock(&self.conn, "sqlite connection")?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_film_exists(&tx, film.id)?;
        ensure_mpa_exists(&tx, film.mpa.id)?;
        ensure_genres_exist(&tx, &genre_ids)?;

        tx.execute(
            "UPDATE films
             SET
                name = ?1,
                description = ?2,
                release_date = ?3,
                duration = ?4,
                mpa_id = ?5
             WHERE id = ?6;",
            params![
                film.name.as_str(),
                film.description.as_str(),
                film.release_date,
                film.duration,
                film.mpa.id,
                film.id,
            ],
        )?;
        replace_film_genres(&tx, film.id, &genre_ids)?;

        let stored = load_film(&tx, film.id)?
            .ok_or(RepoError::not_found(EntityKind::Film, film.id))?;
        tx.commit()?;

        info!(
            "event=film_update module=repo status=ok backend=sqlite film_id={} genres={}",
            film.id,
            genre_ids.len()
        );
        Ok(stored)
    }

    fn get_all(&self) -> RepoResult<Vec<Film>> {
        let conn = lock(&self.conn, "sqlite connection")?;
        let mut stmt = conn.prepare(&format!("{FILM_SELECT_SQL} ORDER BY f.id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut films = Vec::new();
        while let Some(row) = rows.next()? {
            films.push(parse_film_row(&conn, row)?);
        }
        Ok(films)
    }

    fn get_by_id(&self, id: FilmId) -> RepoResult<Film> {
        let conn = lock(&self.conn, "sqlite connection")?;
        load_film(&conn, id)?.ok_or(RepoError::not_found(EntityKind::Film, id))
    }

    fn count(&self) -> RepoResult<usize> {
        let conn = lock(&self.conn, "sqlite connection")?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM films;", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative film count {count}")))
    }

    fn add_like(&self, film_id: FilmId, user_id: UserId) -> RepoResult<bool> {
        let conn = lock(&self.conn, "sqlite connection")?;
        ensure_film_exists(&conn, film_id)?;
        ensure_user_exists(&conn, user_id)?;

        let changed = conn.execute(
            "INSERT OR IGNORE INTO likes (film_id, user_id) VALUES (?1, ?2);",
            params![film_id, user_id],
        )?;
        Ok(changed > 0)
    }

    fn delete_like(&self, film_id: FilmId, user_id: UserId) -> RepoResult<bool> {
        let conn = lock(&self.conn, "sqlite connection")?;
        ensure_film_exists(&conn, film_id)?;
        ensure_user_exists(&conn, user_id)?;

        let changed = conn.execute(
            "DELETE FROM likes WHERE film_id = ?1 AND user_id = ?2;",
            params![film_id, user_id],
        )?;
        Ok(changed > 0)
    }

    fn likes(&self, film_id: FilmId) -> RepoResult<Vec<UserId>> {
        let conn = lock(&self.conn, "sqlite connection")?;
        ensure_film_exists(&conn, film_id)?;

        let mut stmt =
            conn.prepare("SELECT user_id FROM likes WHERE film_id = ?1 ORDER BY user_id ASC;")?;
        let mut rows = stmt.query([film_id])?;
        let mut user_ids = Vec::new();
        while let Some(row) = rows.next()? {
            user_ids.push(row.get(0)?);
        }
        Ok(user_ids)
    }

    fn popular(&self, limit: usize) -> RepoResult<Vec<Film>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let conn = lock(&self.conn, "sqlite connection")?;
        let mut stmt = conn.prepare(&format!(
            "{FILM_SELECT_SQL}
             LEFT JOIN likes l ON l.film_id = f.id
             GROUP BY f.id
             ORDER BY COUNT(l.user_id) DESC, f.id ASC
             LIMIT ?1;"
        ))?;
        let mut rows = stmt.query([limit])?;
        let mut films = Vec::new();
        while let Some(row) = rows.next()? {
            films.push(parse_film_row(&conn, row)?);
        }
        Ok(films)
    }

    fn reset(&self) -> RepoResult<()> {
        let mut conn = lock(&self.conn, "sqlite connection")?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute_batch(
            "DELETE FROM likes;
             DELETE FROM film_genres;
             DELETE FROM films;",
        )?;
        tx.commit()?;

        info!("event=storage_reset module=repo status=ok backend=sqlite scope=films");
        Ok(())
    }
}

fn ensure_film_exists(conn: &Connection, id: FilmId) -> RepoResult<()> {
    if row_exists(conn, "SELECT EXISTS(SELECT 1 FROM films WHERE id = ?1);", id)? {
        Ok(())
    } else {
        Err(RepoError::not_found(EntityKind::Film, id))
    }
}

fn load_film(conn: &Connection, id: FilmId) -> RepoResult<Option<Film>> {
    let mut stmt = conn.prepare(&format!("{FILM_SELECT_SQL} WHERE f.id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_film_row(conn, row)?)),
        None => Ok(None),
    }
}

fn parse_film_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Film> {
    let id: FilmId = row.get("id")?;
    let duration: i64 = row.get("duration")?;
    let duration = u32::try_from(duration).map_err(|_| {
        RepoError::InvalidData(format!("invalid duration `{duration}` in films.duration"))
    })?;

    // Field rules gate writes only; a stored row is returned as it is.
    Ok(Film {
        id,
        name: row.get("name")?,
        description: row.get("description")?,
        release_date: row.get("release_date")?,
        duration,
        mpa: Mpa {
            id: row.get("mpa_id")?,
            name: row.get("mpa_name")?,
            description: row.get("mpa_description")?,
        },
        genres: load_film_genres(conn, id)?,
    })
}
