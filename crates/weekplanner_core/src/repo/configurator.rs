//! Data-directory configuration for planner gateways.
//!
//! # Responsibility
//! - Validate the data directory and resolve the files each backend uses.
//! - Build the JSON gateway or open the migrated SQLite database.
//!
//! # Invariants
//! - The data directory is absolute and exists once a config is built.

use crate::db::open_db;
use crate::repo::json_repo::JsonPlannerRepository;
use crate::repo::RepoResult;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const PLANNER_FILE_NAME: &str = "Planner.json";
pub const TASK_NAMES_FILE_NAME: &str = "TaskNames.json";
pub const DATABASE_FILE_NAME: &str = "planner.sqlite3";

/// Storage implementation behind the planner gateways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
}

impl StorageBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Error raised while building a [`RepositoryConfig`].
#[derive(Debug)]
pub enum ConfigError {
    EmptyDataDir,
    RelativeDataDir(PathBuf),
    CreateDataDir { path: PathBuf, source: std::io::Error },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDataDir => write!(f, "data directory must not be empty"),
            Self::RelativeDataDir(path) => {
                write!(f, "data directory must be absolute: `{}`", path.display())
            }
            Self::CreateDataDir { path, source } => write!(
                f,
                "failed to create data directory `{}`: {source}",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDataDir { source, .. } => Some(source),
            Self::EmptyDataDir | Self::RelativeDataDir(_) => None,
        }
    }
}

/// Resolved planner storage locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    data_dir: PathBuf,
    backend: StorageBackend,
}

impl RepositoryConfig {
    /// Validates `data_dir` and creates it when missing.
    pub fn from_data_dir(
        data_dir: impl AsRef<Path>,
        backend: StorageBackend,
    ) -> Result<Self, ConfigError> {
        let data_dir = data_dir.as_ref();
        if data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        if !data_dir.is_absolute() {
            return Err(ConfigError::RelativeDataDir(data_dir.to_path_buf()));
        }
        std::fs::create_dir_all(data_dir).map_err(|source| ConfigError::CreateDataDir {
            path: data_dir.to_path_buf(),
            source,
        })?;

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            backend,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn backend(&self) -> StorageBackend {
        self.backend
    }

    pub fn planner_path(&self) -> PathBuf {
        self.data_dir.join(PLANNER_FILE_NAME)
    }

    pub fn task_names_path(&self) -> PathBuf {
        self.data_dir.join(TASK_NAMES_FILE_NAME)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE_NAME)
    }

    pub fn json_repository(&self) -> JsonPlannerRepository {
        JsonPlannerRepository::new(self.planner_path(), self.task_names_path())
    }

    /// Opens the planner database with migrations applied.
    ///
    /// Wrap the connection in `SqlitePlannerRepository::try_new`.
    pub fn open_database(&self) -> RepoResult<Connection> {
        Ok(open_db(self.database_path())?)
    }
}
