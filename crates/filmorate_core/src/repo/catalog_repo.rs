//! Genre and MPA lookup repositories.
//!
//! # Responsibility
//! - Read-only access to seeded catalog rows.
//! - SQL helpers used by the film repository to check and replace a film's
//!   genre associations inside its own transaction.
//!
//! # Invariants
//! - `get_all` is ascending by id for both tables.
//! - Film genre lists are always returned ascending by genre id.

use crate::db::SharedConnection;
use crate::model::catalog::{Genre, GenreId, Mpa, MpaId};
use crate::model::film::FilmId;
use crate::model::EntityKind;
use crate::repo::{lock, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;

/// Read access to seeded genres.
pub trait GenreRepository: Send + Sync {
    fn get_all(&self) -> RepoResult<Vec<Genre>>;
    fn get_by_id(&self, id: GenreId) -> RepoResult<Genre>;
}

/// Read access to seeded MPA ratings.
pub trait MpaRepository: Send + Sync {
    fn get_all(&self) -> RepoResult<Vec<Mpa>>;
    fn get_by_id(&self, id: MpaId) -> RepoResult<Mpa>;
}

impl<T: GenreRepository + ?Sized> GenreRepository for Arc<T> {
    fn get_all(&self) -> RepoResult<Vec<Genre>> {
        (**self).get_all()
    }

    fn get_by_id(&self, id: GenreId) -> RepoResult<Genre> {
        (**self).get_by_id(id)
    }
}

impl<T: MpaRepository + ?Sized> MpaRepository for Arc<T> {
    fn get_all(&self) -> RepoResult<Vec<Mpa>> {
        (**self).get_all()
    }

    fn get_by_id(&self, id: MpaId) -> RepoResult<Mpa> {
        (**self).get_by_id(id)
    }
}

/// SQLite-backed genre repository.
pub struct SqliteGenreRepository {
    conn: SharedConnection,
}

impl SqliteGenreRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl GenreRepository for SqliteGenreRepository {
    fn get_all(&self) -> RepoResult<Vec<Genre>> {
        let conn = lock(&self.conn, "sqlite connection")?;
        let mut stmt = conn.prepare("SELECT id, name FROM genres ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut genres = Vec::new();
        while let Some(row) = rows.next()? {
            genres.push(parse_genre_row(row)?);
        }
        Ok(genres)
    }

    fn get_by_id(&self, id: GenreId) -> RepoResult<Genre> {
        let conn = lock(&self.conn, "sqlite connection")?;
        conn.query_row(
            "SELECT id, name FROM genres WHERE id = ?1;",
            [id],
            parse_genre_row,
        )
        .optional()?
        .ok_or(RepoError::not_found(EntityKind::Genre, id))
    }
}

/// SQLite-backed MPA repository.
pub struct SqliteMpaRepository {
    conn: SharedConnection,
}

impl SqliteMpaRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl MpaRepository for SqliteMpaRepository {
    fn get_all(&self) -> RepoResult<Vec<Mpa>> {
        let conn = lock(&self.conn, "sqlite connection")?;
        let mut stmt = conn.prepare("SELECT id, name, description FROM mpa ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut ratings = Vec::new();
        while let Some(row) = rows.next()? {
            ratings.push(parse_mpa_row(row)?);
        }
        Ok(ratings)
    }

    fn get_by_id(&self, id: MpaId) -> RepoResult<Mpa> {
        let conn = lock(&self.conn, "sqlite connection")?;
        conn.query_row(
            "SELECT id, name, description FROM mpa WHERE id = ?1;",
            [id],
            parse_mpa_row,
        )
        .optional()?
        .ok_or(RepoError::not_found(EntityKind::Mpa, id))
    }
}

pub(crate) fn ensure_mpa_exists(conn: &Connection, id: MpaId) -> RepoResult<()> {
    if row_exists(conn, "SELECT EXISTS(SELECT 1 FROM mpa WHERE id = ?1);", id)? {
        Ok(())
    } else {
        Err(RepoError::not_found(EntityKind::Mpa, id))
    }
}

pub(crate) fn ensure_genres_exist(conn: &Connection, ids: &[GenreId]) -> RepoResult<()> {
    for &id in ids {
        if !row_exists(conn, "SELECT EXISTS(SELECT 1 FROM genres WHERE id = ?1);", id)? {
            return Err(RepoError::not_found(EntityKind::Genre, id));
        }
    }
    Ok(())
}

/// Replaces the full genre set of one film. An empty slice clears it.
pub(crate) fn replace_film_genres(
    conn: &Connection,
    film_id: FilmId,
    genre_ids: &[GenreId],
) -> RepoResult<()> {
    conn.execute("DELETE FROM film_genres WHERE film_id = ?1;", [film_id])?;
    let mut insert =
        conn.prepare("INSERT OR IGNORE INTO film_genres (film_id, genre_id) VALUES (?1, ?2);")?;
    for genre_id in genre_ids {
        insert.execute(params![film_id, genre_id])?;
    }
    Ok(())
}

pub(crate) fn load_film_genres(conn: &Connection, film_id: FilmId) -> RepoResult<Vec<Genre>> {
    let mut stmt = conn.prepare(
        "SELECT g.id, g.name
         FROM film_genres fg
         INNER JOIN genres g ON g.id = fg.genre_id
         WHERE fg.film_id = ?1
         ORDER BY g.id ASC;",
    )?;
    let mut rows = stmt.query([film_id])?;
    let mut genres = Vec::new();
    while let Some(row) = rows.next()? {
        genres.push(parse_genre_row(row)?);
    }
    Ok(genres)
}

pub(crate) fn row_exists(conn: &Connection, sql: &str, id: i64) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(sql, [id], |row| row.get(0))?;
    Ok(exists == 1)
}

fn parse_genre_row(row: &Row<'_>) -> rusqlite::Result<Genre> {
    Ok(Genre {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}

fn parse_mpa_row(row: &Row<'_>) -> rusqlite::Result<Mpa> {
    Ok(Mpa {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
    })
}
