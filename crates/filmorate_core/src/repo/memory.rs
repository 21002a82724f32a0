//! Transient in-process backend.
//!
//! # Responsibility
//! - Hold every table of one backend instance in a single owned
//!   `MemoryStore`, guarded by one mutex.
//! - Expose the same repository contracts as the SQLite backend through thin
//!   per-entity handles sharing the store.
//!
//! # Invariants
//! - Each repository call is one lock scope, so multi-entry edits (genre
//!   replace, symmetric friendship) are all-or-nothing.
//! - Ids come from per-instance counters and are never reused, not even after
//!   `reset`.
//! - Entity values are stored as snapshots; edges live in separate maps.
//! - Cross-entity checks (a like needs its user) read the shared state
//!   directly instead of calling another handle, which would re-enter the lock.

use crate::model::catalog::{seed_genres, seed_mpa, Genre, GenreId, Mpa, MpaId};
use crate::model::film::{Film, FilmId};
use crate::model::user::{User, UserId};
use crate::model::EntityKind;
use crate::repo::catalog_repo::{GenreRepository, MpaRepository};
use crate::repo::film_repo::FilmRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::{lock, RepoError, RepoResult};
use log::info;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// Owned state of one in-memory backend instance.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug)]
struct MemoryState {
    genres: BTreeMap<GenreId, Genre>,
    mpa: BTreeMap<MpaId, Mpa>,
    /// Film snapshots with id-only rating and no genres.
    films: BTreeMap<FilmId, Film>,
    film_genres: BTreeMap<FilmId, BTreeSet<GenreId>>,
    likes: BTreeMap<FilmId, BTreeSet<UserId>>,
    users: BTreeMap<UserId, User>,
    friends: BTreeMap<UserId, BTreeSet<UserId>>,
    last_film_id: FilmId,
    last_user_id: UserId,
}

impl MemoryStore {
    /// Creates an empty store seeded with the genre and MPA catalogs.
    pub fn new() -> Self {
        let state = MemoryState {
            genres: seed_genres()
                .into_iter()
                .map(|genre| (genre.id, genre))
                .collect(),
            mpa: seed_mpa().into_iter().map(|mpa| (mpa.id, mpa)).collect(),
            films: BTreeMap::new(),
            film_genres: BTreeMap::new(),
            likes: BTreeMap::new(),
            users: BTreeMap::new(),
            friends: BTreeMap::new(),
            last_film_id: 0,
            last_user_id: 0,
        };
        Self {
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> RepoResult<MutexGuard<'_, MemoryState>> {
        lock(&self.state, "memory store")
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryState {
    fn ensure_film(&self, id: FilmId) -> RepoResult<()> {
        if self.films.contains_key(&id) {
            Ok(())
        } else {
            Err(RepoError::not_found(EntityKind::Film, id))
        }
    }

    fn ensure_user(&self, id: UserId) -> RepoResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(RepoError::not_found(EntityKind::User, id))
        }
    }

    fn ensure_references(&self, film: &Film, genre_ids: &[GenreId]) -> RepoResult<()> {
        if !self.mpa.contains_key(&film.mpa.id) {
            return Err(RepoError::not_found(EntityKind::Mpa, film.mpa.id));
        }
        if let Some(&missing) = genre_ids.iter().find(|id| !self.genres.contains_key(id)) {
            return Err(RepoError::not_found(EntityKind::Genre, missing));
        }
        Ok(())
    }

    fn store_film(&mut self, id: FilmId, film: &Film, genre_ids: Vec<GenreId>) {
        let mut snapshot = film.clone();
        snapshot.id = id;
        snapshot.genres.clear();
        self.films.insert(id, snapshot);
        if genre_ids.is_empty() {
            self.film_genres.remove(&id);
        } else {
            self.film_genres.insert(id, genre_ids.into_iter().collect());
        }
    }

    /// Joins a film snapshot with its rating and genres.
    fn resolve_film(&self, id: FilmId) -> RepoResult<Film> {
        let mut film = self
            .films
            .get(&id)
            .cloned()
            .ok_or(RepoError::not_found(EntityKind::Film, id))?;

        film.mpa = self.mpa.get(&film.mpa.id).cloned().ok_or_else(|| {
            RepoError::InvalidData(format!("film {id} references unknown mpa {}", film.mpa.id))
        })?;
        film.genres = self
            .film_genres
            .get(&id)
            .into_iter()
            .flatten()
            .map(|genre_id| {
                self.genres.get(genre_id).cloned().ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "film {id} references unknown genre {genre_id}"
                    ))
                })
            })
            .collect::<RepoResult<Vec<_>>>()?;
        Ok(film)
    }

    fn like_count(&self, id: FilmId) -> usize {
        self.likes.get(&id).map_or(0, BTreeSet::len)
    }

    fn friend_ids(&self, id: UserId) -> BTreeSet<UserId> {
        self.friends.get(&id).cloned().unwrap_or_default()
    }

    fn resolve_users(&self, ids: impl IntoIterator<Item = UserId>) -> RepoResult<Vec<User>> {
        ids.into_iter()
            .map(|id| {
                self.users
                    .get(&id)
                    .cloned()
                    .ok_or(RepoError::not_found(EntityKind::User, id))
            })
            .collect()
    }
}

/// Genre handle over a shared `MemoryStore`.
pub struct MemoryGenreRepository {
    store: Arc<MemoryStore>,
}

impl MemoryGenreRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

impl GenreRepository for MemoryGenreRepository {
    fn get_all(&self) -> RepoResult<Vec<Genre>> {
        Ok(self.store.state()?.genres.values().cloned().collect())
    }

    fn get_by_id(&self, id: GenreId) -> RepoResult<Genre> {
        self.store
            .state()?
            .genres
            .get(&id)
            .cloned()
            .ok_or(RepoError::not_found(EntityKind::Genre, id))
    }
}

/// MPA handle over a shared `MemoryStore`.
pub struct MemoryMpaRepository {
    store: Arc<MemoryStore>,
}

impl MemoryMpaRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

impl MpaRepository for MemoryMpaRepository {
    fn get_all(&self) -> RepoResult<Vec<Mpa>> {
        Ok(self.store.state()?.mpa.values().cloned().collect())
    }

    fn get_by_id(&self, id: MpaId) -> RepoResult<Mpa> {
        self.store
            .state()?
            .mpa
            .get(&id)
            .cloned()
            .ok_or(RepoError::not_found(EntityKind::Mpa, id))
    }
}

/// Film handle over a shared `MemoryStore`.
pub struct MemoryFilmRepository {
    store: Arc<MemoryStore>,
}

impl MemoryFilmRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

impl FilmRepository for MemoryFilmRepository {
    fn add(&self, film: &Film) -> RepoResult<Film> {
        film.validate()?;
        let genre_ids = film.genre_ids();

        let mut state = self.store.state()?;
        state.ensure_references(film, &genre_ids)?;
        state.last_film_id += 1;
        let id = state.last_film_id;
        state.store_film(id, film, genre_ids);

        info!("event=film_add module=repo status=ok backend=memory film_id={id}");
        state.resolve_film(id)
    }

    fn update(&self, film: &Film) -> RepoResult<Film> {
        film.validate()?;
        let genre_ids = film.genre_ids();

        let mut state = self.store.state()?;
        state.ensure_film(film.id)?;
        state.ensure_references(film, &genre_ids)?;
        state.store_film(film.id, film, genre_ids);

        info!(
            "event=film_update module=repo status=ok backend=memory film_id={}",
            film.id
        );
        state.resolve_film(film.id)
    }

    fn get_all(&self) -> RepoResult<Vec<Film>> {
        let state = self.store.state()?;
        state
            .films
            .keys()
            .map(|&id| state.resolve_film(id))
            .collect()
    }

    fn get_by_id(&self, id: FilmId) -> RepoResult<Film> {
        self.store.state()?.resolve_film(id)
    }

    fn count(&self) -> RepoResult<usize> {
        Ok(self.store.state()?.films.len())
    }

    fn add_like(&self, film_id: FilmId, user_id: UserId) -> RepoResult<bool> {
        let mut state = self.store.state()?;
        state.ensure_film(film_id)?;
        state.ensure_user(user_id)?;
        Ok(state.likes.entry(film_id).or_default().insert(user_id))
    }

    fn delete_like(&self, film_id: FilmId, user_id: UserId) -> RepoResult<bool> {
        let mut state = self.store.state()?;
        state.ensure_film(film_id)?;
        state.ensure_user(user_id)?;
        Ok(state
            .likes
            .get_mut(&film_id)
            .is_some_and(|users| users.remove(&user_id)))
    }

    fn likes(&self, film_id: FilmId) -> RepoResult<Vec<UserId>> {
        let state = self.store.state()?;
        state.ensure_film(film_id)?;
        Ok(state
            .likes
            .get(&film_id)
            .map(|users| users.iter().copied().collect())
            .unwrap_or_default())
    }

    fn popular(&self, limit: usize) -> RepoResult<Vec<Film>> {
        let state = self.store.state()?;
        let mut ranked: Vec<FilmId> = state.films.keys().copied().collect();
        // Stable sort keeps ascending id order among equal counts.
        ranked.sort_by_key(|&id| Reverse(state.like_count(id)));
        ranked
            .into_iter()
            .take(limit)
            .map(|id| state.resolve_film(id))
            .collect()
    }

    fn reset(&self) -> RepoResult<()> {
        let mut state = self.store.state()?;
        state.films.clear();
        state.film_genres.clear();
        state.likes.clear();

        info!("event=storage_reset module=repo status=ok backend=memory scope=films");
        Ok(())
    }
}

/// User handle over a shared `MemoryStore`.
pub struct MemoryUserRepository {
    store: Arc<MemoryStore>,
}

impl MemoryUserRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

impl UserRepository for MemoryUserRepository {
    fn add(&self, user: &User) -> RepoResult<User> {
        user.validate()?;

        let mut state = self.store.state()?;
        state.last_user_id += 1;
        let mut stored = user.clone();
        stored.id = state.last_user_id;
        state.users.insert(stored.id, stored.clone());

        info!(
            "event=user_add module=repo status=ok backend=memory user_id={}",
            stored.id
        );
        Ok(stored)
    }

    fn update(&self, user: &User) -> RepoResult<User> {
        user.validate()?;

        let mut state = self.store.state()?;
        let slot = state
            .users
            .get_mut(&user.id)
            .ok_or(RepoError::not_found(EntityKind::User, user.id))?;
        *slot = user.clone();

        info!(
            "event=user_update module=repo status=ok backend=memory user_id={}",
            user.id
        );
        Ok(user.clone())
    }

    fn get_all(&self) -> RepoResult<Vec<User>> {
        Ok(self.store.state()?.users.values().cloned().collect())
    }

    fn get_by_id(&self, id: UserId) -> RepoResult<User> {
        self.store
            .state()?
            .users
            .get(&id)
            .cloned()
            .ok_or(RepoError::not_found(EntityKind::User, id))
    }

    fn exists(&self, id: UserId) -> RepoResult<bool> {
        Ok(self.store.state()?.users.contains_key(&id))
    }

    fn add_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<bool> {
        let mut state = self.store.state()?;
        state.ensure_user(user_id)?;
        state.ensure_user(friend_id)?;
        if user_id == friend_id {
            return Ok(false);
        }

        let forward = state.friends.entry(user_id).or_default().insert(friend_id);
        let backward = state.friends.entry(friend_id).or_default().insert(user_id);
        if forward || backward {
            info!(
                "event=friend_add module=repo status=ok backend=memory user_id={user_id} friend_id={friend_id}"
            );
        }
        Ok(forward || backward)
    }

    fn delete_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<bool> {
        let mut state = self.store.state()?;
        state.ensure_user(user_id)?;
        state.ensure_user(friend_id)?;

        let forward = state
            .friends
            .get_mut(&user_id)
            .is_some_and(|ids| ids.remove(&friend_id));
        let backward = state
            .friends
            .get_mut(&friend_id)
            .is_some_and(|ids| ids.remove(&user_id));
        if forward || backward {
            info!(
                "event=friend_delete module=repo status=ok backend=memory user_id={user_id} friend_id={friend_id}"
            );
        }
        Ok(forward || backward)
    }

    fn friends(&self, user_id: UserId) -> RepoResult<Vec<User>> {
        let state = self.store.state()?;
        state.ensure_user(user_id)?;
        state.resolve_users(state.friend_ids(user_id))
    }

    fn mutual_friends(&self, user_id: UserId, other_id: UserId) -> RepoResult<Vec<User>> {
        let state = self.store.state()?;
        state.ensure_user(user_id)?;
        state.ensure_user(other_id)?;
        let other_friends = state.friend_ids(other_id);
        let mutual = state
            .friend_ids(user_id)
            .intersection(&other_friends)
            .copied()
            .collect::<Vec<_>>();
        state.resolve_users(mutual)
    }

    fn reset(&self) -> RepoResult<()> {
        let mut state = self.store.state()?;
        state.users.clear();
        state.friends.clear();
        state.likes.clear();

        info!("event=storage_reset module=repo status=ok backend=memory scope=users");
        Ok(())
    }
}
