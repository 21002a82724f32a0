//! Storage and service core for the filmorate film catalogue.
//! Business invariants for films, users, likes and friendships live here.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{BackendKind, StorageConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_env, logging_status};
pub use model::catalog::{Genre, Mpa};
pub use model::film::Film;
pub use model::user::User;
pub use model::{EntityKind, ValidationError};
pub use repo::catalog_repo::{GenreRepository, MpaRepository};
pub use repo::film_repo::FilmRepository;
pub use repo::storage::Storage;
pub use repo::user_repo::UserRepository;
pub use repo::{RepoError, RepoResult};
pub use service::catalog_service::CatalogService;
pub use service::film_service::FilmService;
pub use service::user_service::UserService;
pub use service::{ErrorKind, ServiceError, ServiceResult};

/// Minimal health-check API for embedding processes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
