//! Task lifecycle engine over the authoritative schedule.
//!
//! # Responsibility
//! - Apply add/delete/edit as compound operations with compensation.
//! - Load the schedule at startup and save it on request.
//! - Answer schedule queries and point aggregates.
//!
//! # Invariants
//! - A task moves Absent -> Present -> Absent; nothing else mutates the schedule.
//! - `add_task` never overwrites an occupied slot.
//! - `delete_task` only removes a task value-equal to the caller's.
//! - `edit_task` reports failure whenever it had to undo its own delete.
//! - Persistence failures are notified and leave the in-memory schedule as is.

use crate::model::clock::format_hhmm;
use crate::model::schedule::{scoring, Schedule};
use crate::model::task::{SlotError, Task};
use crate::model::weekday::Weekday;
use crate::notify::Notifier;
use crate::repo::ScheduleRepository;
use crate::service::rollback::rollback;
use chrono::NaiveTime;
use log::{error, info, warn};
use std::collections::BTreeSet;
use std::rc::Rc;

/// Title used when the stored schedule cannot be read.
pub const LOAD_FAILED_TITLE: &str = "Could not load planner";
/// Title used when the schedule cannot be written.
pub const SAVE_FAILED_TITLE: &str = "Could not save planner";

/// Lifecycle engine owning the schedule and its gateway.
pub struct ScheduleService<R: ScheduleRepository> {
    repo: R,
    schedule: Schedule,
    notifier: Rc<dyn Notifier>,
}

impl<R: ScheduleRepository> ScheduleService<R> {
    /// Loads the persisted schedule, starting empty when none exists.
    ///
    /// A failed load is notified and also starts empty.
    pub fn load(repo: R, notifier: Rc<dyn Notifier>) -> Self {
        let mut service = Self::with_schedule(repo, Schedule::new(), notifier);
        service.reload();
        service
    }

    /// Wraps an already built schedule without touching the gateway.
    pub fn with_schedule(repo: R, schedule: Schedule, notifier: Rc<dyn Notifier>) -> Self {
        Self {
            repo,
            schedule,
            notifier,
        }
    }

    /// Replaces the schedule with persisted content.
    ///
    /// `None` from the gateway empties the schedule. On error the current
    /// schedule is kept, the failure is notified and `false` is returned.
    pub fn reload(&mut self) -> bool {
        match self.repo.load_schedule() {
            Ok(Some(schedule)) => {
                info!(
                    "event=schedule_load module=schedule status=ok tasks={}",
                    schedule.len()
                );
                self.schedule = schedule;
                true
            }
            Ok(None) => {
                info!("event=schedule_load module=schedule status=empty");
                self.schedule = Schedule::new();
                true
            }
            Err(err) => {
                error!("event=schedule_load module=schedule status=error error={err}");
                self.notifier.notify(LOAD_FAILED_TITLE, &err.to_string());
                false
            }
        }
    }

    /// Persists the whole schedule; notifies and returns `false` on failure.
    pub fn save(&self) -> bool {
        match self.repo.save_schedule(&self.schedule) {
            Ok(()) => {
                info!(
                    "event=schedule_save module=schedule status=ok tasks={}",
                    self.schedule.len()
                );
                true
            }
            Err(err) => {
                error!("event=schedule_save module=schedule status=error error={err}");
                self.notifier.notify(SAVE_FAILED_TITLE, &err.to_string());
                false
            }
        }
    }

    /// Adds `task` when its slot is free.
    ///
    /// Returns whether the task is retrievable afterwards.
    pub fn add_task(&mut self, task: &Task) -> bool {
        let added = add_to(&mut self.schedule, task);
        log_outcome("task_add", task, added);
        added
    }

    /// Deletes the stored task equal to `task`.
    pub fn delete_task(&mut self, task: &Task) -> bool {
        let deleted = delete_from(&mut self.schedule, task);
        log_outcome("task_delete", task, deleted);
        deleted
    }

    /// Replaces `old` with `new`.
    ///
    /// If `new` cannot be added, `old` is restored and `false` is returned
    /// regardless of whether the restore succeeded.
    pub fn edit_task(&mut self, old: &Task, new: &Task) -> bool {
        if old == new {
            log_outcome("task_edit", old, false);
            return false;
        }
        if !delete_from(&mut self.schedule, old) {
            log_outcome("task_edit", old, false);
            return false;
        }
        if !add_to(&mut self.schedule, new) {
            let restored = rollback(
                &mut self.schedule,
                old,
                restore_into,
                |schedule, task| schedule.contains(task),
                self.notifier.as_ref(),
            );
            warn!(
                "event=task_edit module=schedule status=rolled_back weekday={} time={} restored={restored}",
                new.weekday(),
                format_hhmm(new.time())
            );
            // The edit did not happen, so a successful restore must not read as success.
            return false;
        }

        let edited = !self.schedule.contains(old) && self.schedule.contains(new);
        log_outcome("task_edit", new, edited);
        edited
    }

    /// Returns whether a value-equal task is stored at its slot.
    pub fn is_task_in_schedule(&self, task: &Task) -> bool {
        self.schedule.contains(task)
    }

    pub fn task_at(&self, weekday: Weekday, time: NaiveTime) -> Option<&Task> {
        self.schedule.get(weekday, time)
    }

    /// Tasks of `weekday`, ascending by time.
    pub fn tasks_for_weekday(&self, weekday: Weekday) -> Vec<&Task> {
        self.schedule.tasks(weekday).collect()
    }

    pub fn collect_sorted_times(&self) -> BTreeSet<NaiveTime> {
        self.schedule.collect_sorted_times()
    }

    pub fn count_points<F>(&self, weekday: Weekday, scoring: F) -> u32
    where
        F: Fn(&Task) -> u32,
    {
        self.schedule.count_points(weekday, scoring)
    }

    /// Points earned on `weekday` by completed tasks.
    pub fn points_earned(&self, weekday: Weekday) -> u32 {
        self.count_points(weekday, scoring::earned)
    }

    /// Points available on `weekday` if every task were done.
    pub fn points_possible(&self, weekday: Weekday) -> u32 {
        self.count_points(weekday, scoring::possible)
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn notifier(&self) -> &Rc<dyn Notifier> {
        &self.notifier
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }
}

fn add_to(schedule: &mut Schedule, task: &Task) -> bool {
    if schedule.is_slot_occupied(task.weekday(), task.time()) {
        return false;
    }
    schedule.put(task.clone());
    schedule.contains(task)
}

fn delete_from(schedule: &mut Schedule, task: &Task) -> bool {
    if !schedule.contains(task) {
        return false;
    }
    schedule.remove(task.weekday(), task.time(), task)
}

fn restore_into(schedule: &mut Schedule, task: &Task) -> Result<(), SlotError> {
    if add_to(schedule, task) {
        Ok(())
    } else {
        Err(SlotError::Occupied(task.slot()))
    }
}

fn log_outcome(event: &str, task: &Task, ok: bool) {
    let status = if ok { "ok" } else { "rejected" };
    info!(
        "event={event} module=schedule status={status} weekday={} time={}",
        task.weekday(),
        format_hhmm(task.time())
    );
}

#[cfg(test)]
mod tests {
    use super::{ScheduleService, SAVE_FAILED_TITLE};
    use crate::model::clock::minute_time;
    use crate::model::task::Task;
    use crate::model::weekday::Weekday;
    use crate::notify::QueuedNotifier;
    use crate::repo::memory_repo::MemoryPlannerRepository;
    use std::rc::Rc;

    fn task(name: &str, hour: u32, priority: u8) -> Task {
        Task::new(name, "", minute_time(hour, 0).unwrap(), false, Weekday::Friday, priority)
            .unwrap()
    }

    #[test]
    fn add_rejects_occupied_slot_without_mutation() {
        let notifier = Rc::new(QueuedNotifier::new());
        let mut engine = ScheduleService::load(MemoryPlannerRepository::new(), notifier);
        let first = task("a", 8, 2);
        let rival = task("b", 8, 9);

        assert!(engine.add_task(&first));
        assert!(!engine.add_task(&rival));
        assert_eq!(engine.task_at(Weekday::Friday, first.time()), Some(&first));
    }

    #[test]
    fn failed_save_is_notified_and_keeps_schedule() {
        let notifier = Rc::new(QueuedNotifier::new());
        let repo = MemoryPlannerRepository::new();
        repo.set_fail_saves(true);
        let mut engine = ScheduleService::load(&repo, notifier.clone());
        assert!(engine.add_task(&task("a", 8, 2)));

        assert!(!engine.save());
        assert_eq!(engine.schedule().len(), 1);
        let drained = notifier.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].title, SAVE_FAILED_TITLE);
    }
}
