//! Process-level storage and logging configuration.
//!
//! Values come from environment variables with defaults, read once at
//! startup by the embedding process.

use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_STORAGE: &str = "FILMORATE_STORAGE";
pub const ENV_DB_PATH: &str = "FILMORATE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "FILMORATE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "FILMORATE_LOG_DIR";

const DEFAULT_DB_PATH: &str = "filmorate.sqlite3";

/// Storage backend selected at process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Transient state owned by the process.
    #[default]
    Memory,
    /// SQLite database file.
    Sqlite,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" | "inmemory" => Ok(Self::Memory),
            "sqlite" | "db" | "database" => Ok(Self::Sqlite),
            other => Err(format!(
                "unsupported storage backend `{other}`; expected memory|sqlite"
            )),
        }
    }
}

/// Storage selection plus the database location for the durable backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: BackendKind,
    /// Only read when `backend == BackendKind::Sqlite`.
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

impl StorageConfig {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn sqlite(db_path: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendKind::Sqlite,
            db_path: db_path.into(),
        }
    }

    /// Reads `FILMORATE_STORAGE` and `FILMORATE_DB_PATH`.
    ///
    /// # Errors
    /// - Returns an error when the backend name is not recognized.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let backend = match lookup(ENV_STORAGE) {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => BackendKind::default(),
        };
        let db_path = lookup(ENV_DB_PATH)
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from);

        Ok(Self { backend, db_path })
    }
}
