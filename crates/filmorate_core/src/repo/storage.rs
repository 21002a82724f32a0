//! Backend selection.
//!
//! `Storage` bundles the four repository handles of one backend instance as
//! trait objects, so callers are wired once at startup and never learn which
//! backend they talk to.

use crate::config::{BackendKind, StorageConfig};
use crate::db::{open_db, open_db_in_memory, share, SharedConnection};
use crate::repo::catalog_repo::{
    GenreRepository, MpaRepository, SqliteGenreRepository, SqliteMpaRepository,
};
use crate::repo::film_repo::{FilmRepository, SqliteFilmRepository};
use crate::repo::memory::{
    MemoryFilmRepository, MemoryGenreRepository, MemoryMpaRepository, MemoryStore,
    MemoryUserRepository,
};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::RepoResult;
use log::info;
use rusqlite::Connection;
use std::sync::Arc;

/// Repository handles of one backend instance.
#[derive(Clone)]
pub struct Storage {
    backend: BackendKind,
    pub genres: Arc<dyn GenreRepository>,
    pub mpa: Arc<dyn MpaRepository>,
    pub films: Arc<dyn FilmRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Storage {
    /// Builds the backend named by `config`.
    ///
    /// # Errors
    /// - Returns `RepoError::Db` when the SQLite file cannot be opened or
    ///   migrated.
    pub fn open(config: &StorageConfig) -> RepoResult<Self> {
        let storage = match config.backend {
            BackendKind::Memory => Self::in_memory(),
            BackendKind::Sqlite => Self::sqlite(open_db(&config.db_path)?),
        };
        info!(
            "event=storage_open module=repo status=ok backend={}",
            storage.backend
        );
        Ok(storage)
    }

    /// Fresh transient backend.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            backend: BackendKind::Memory,
            genres: Arc::new(MemoryGenreRepository::new(Arc::clone(&store))),
            mpa: Arc::new(MemoryMpaRepository::new(Arc::clone(&store))),
            films: Arc::new(MemoryFilmRepository::new(Arc::clone(&store))),
            users: Arc::new(MemoryUserRepository::new(store)),
        }
    }

    /// Durable backend over an already migrated connection.
    pub fn sqlite(conn: Connection) -> Self {
        Self::sqlite_shared(share(conn))
    }

    /// Durable backend over a fresh in-memory SQLite database.
    pub fn sqlite_in_memory() -> RepoResult<Self> {
        Ok(Self::sqlite(open_db_in_memory()?))
    }

    fn sqlite_shared(conn: SharedConnection) -> Self {
        Self {
            backend: BackendKind::Sqlite,
            genres: Arc::new(SqliteGenreRepository::new(Arc::clone(&conn))),
            mpa: Arc::new(SqliteMpaRepository::new(Arc::clone(&conn))),
            films: Arc::new(SqliteFilmRepository::new(Arc::clone(&conn))),
            users: Arc::new(SqliteUserRepository::new(conn)),
        }
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }
}
