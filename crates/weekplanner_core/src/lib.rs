//! Weekly planner core: schedule store, task lifecycle and persistence.
//! This crate is the single source of truth for planner invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod overview;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::mirror::{task_label, MirrorEntry, WeekdayMirror};
pub use model::schedule::{scoring, Schedule, ScheduleDataError};
pub use model::task::{SlotError, Task, TaskSlot, TaskValidationError, MAX_PRIORITY, MIN_PRIORITY};
pub use model::weekday::Weekday;
pub use notify::{Notification, Notifier, QueuedNotifier};
pub use overview::{CellLabel, DayTotals, OverviewRow, WeeklyOverview};
pub use repo::configurator::{ConfigError, RepositoryConfig, StorageBackend};
pub use repo::json_repo::JsonPlannerRepository;
pub use repo::memory_repo::MemoryPlannerRepository;
pub use repo::sqlite_repo::SqlitePlannerRepository;
pub use repo::{RepoError, RepoResult, ScheduleRepository, TaskNamesRepository};
pub use service::mirror_service::MirrorService;
pub use service::planner_service::PlannerService;
pub use service::rollback::rollback;
pub use service::schedule_service::ScheduleService;
pub use service::task_names_service::TaskNamesService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
