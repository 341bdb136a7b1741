//! In-process gateway used by tests and ephemeral sessions.

use crate::model::schedule::Schedule;
use crate::repo::{RepoError, RepoResult, ScheduleRepository, TaskNamesRepository};
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

/// Planner gateway that keeps the last saved state in memory.
///
/// `fail_saves` switches every save into an error so callers can exercise
/// their persistence-failure paths.
#[derive(Debug, Default)]
pub struct MemoryPlannerRepository {
    schedule: RefCell<Option<Schedule>>,
    task_names: RefCell<Option<BTreeSet<String>>>,
    fail_saves: Cell<bool>,
    save_count: Cell<usize>,
}

impl MemoryPlannerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the stored schedule as if it had been saved earlier.
    pub fn with_schedule(schedule: Schedule) -> Self {
        let repo = Self::default();
        repo.schedule.replace(Some(schedule));
        repo
    }

    /// Seeds the stored task-name catalog.
    pub fn with_task_names(names: BTreeSet<String>) -> Self {
        let repo = Self::default();
        repo.task_names.replace(Some(names));
        repo
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    /// Number of successful saves across both kinds.
    pub fn save_count(&self) -> usize {
        self.save_count.get()
    }

    /// Last saved schedule, if any.
    pub fn stored_schedule(&self) -> Option<Schedule> {
        self.schedule.borrow().clone()
    }

    fn check_writable(&self) -> RepoResult<()> {
        if self.fail_saves.get() {
            return Err(RepoError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "planner storage is read-only",
            )));
        }
        Ok(())
    }
}

impl ScheduleRepository for MemoryPlannerRepository {
    fn load_schedule(&self) -> RepoResult<Option<Schedule>> {
        Ok(self.schedule.borrow().clone())
    }

    fn save_schedule(&self, schedule: &Schedule) -> RepoResult<()> {
        self.check_writable()?;
        self.schedule.replace(Some(schedule.clone()));
        self.save_count.set(self.save_count.get() + 1);
        Ok(())
    }
}

impl TaskNamesRepository for MemoryPlannerRepository {
    fn load_task_names(&self) -> RepoResult<Option<BTreeSet<String>>> {
        Ok(self.task_names.borrow().clone())
    }

    fn save_task_names(&self, names: &BTreeSet<String>) -> RepoResult<()> {
        self.check_writable()?;
        self.task_names.replace(Some(names.clone()));
        self.save_count.set(self.save_count.get() + 1);
        Ok(())
    }
}
