//! Persistence gateways for the schedule and the task-name catalog.
//!
//! # Responsibility
//! - Define load/save contracts the services depend on.
//! - Keep file and SQL details out of service orchestration.
//!
//! # Invariants
//! - `Ok(None)` from a load means "no prior data"; callers start empty.
//! - Loaded content is validated; invalid persisted state is an error,
//!   never silently repaired.

use crate::db::DbError;
use crate::model::schedule::Schedule;
use crate::model::task::TaskValidationError;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod configurator;
pub mod json_repo;
pub mod memory_repo;
pub mod sqlite_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error raised by persistence gateways.
#[derive(Debug)]
pub enum RepoError {
    /// File-system failure.
    Io(std::io::Error),
    /// JSON encode/decode failure, including invalid task content.
    Json(serde_json::Error),
    /// SQLite/bootstrap failure.
    Db(DbError),
    /// Persisted task failed validation.
    Validation(TaskValidationError),
    /// Persisted data cannot be converted into a valid model.
    InvalidData(String),
    /// Connection schema does not match the migrations this binary knows.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted planner data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "planner connection is not ready: expected schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::InvalidData(_) | Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<std::io::Error> for RepoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Load/save contract for the weekly schedule.
pub trait ScheduleRepository {
    fn load_schedule(&self) -> RepoResult<Option<Schedule>>;
    fn save_schedule(&self, schedule: &Schedule) -> RepoResult<()>;
}

/// Load/save contract for the task-name catalog.
pub trait TaskNamesRepository {
    fn load_task_names(&self) -> RepoResult<Option<BTreeSet<String>>>;
    fn save_task_names(&self, names: &BTreeSet<String>) -> RepoResult<()>;
}

impl<R: ScheduleRepository + ?Sized> ScheduleRepository for &R {
    fn load_schedule(&self) -> RepoResult<Option<Schedule>> {
        (**self).load_schedule()
    }

    fn save_schedule(&self, schedule: &Schedule) -> RepoResult<()> {
        (**self).save_schedule(schedule)
    }
}

impl<R: TaskNamesRepository + ?Sized> TaskNamesRepository for &R {
    fn load_task_names(&self) -> RepoResult<Option<BTreeSet<String>>> {
        (**self).load_task_names()
    }

    fn save_task_names(&self, names: &BTreeSet<String>) -> RepoResult<()> {
        (**self).save_task_names(names)
    }
}
