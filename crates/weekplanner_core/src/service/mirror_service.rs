//! Mirror synchronizer.
//!
//! # Responsibility
//! - Patch the display mirror with the same add/delete/edit sequence the
//!   engine applies to the schedule.
//!
//! # Invariants
//! - Lanes stay strictly ascending by time after every call.
//! - `edit_task` restores the old entry when the new one cannot be placed,
//!   and reports failure in that case.

use crate::model::clock::format_hhmm;
use crate::model::mirror::{MirrorEntry, WeekdayMirror};
use crate::model::schedule::Schedule;
use crate::model::task::Task;
use crate::model::weekday::Weekday;
use crate::notify::Notifier;
use crate::service::rollback::rollback;
use log::{debug, warn};
use std::rc::Rc;

/// Owner of the display mirror.
pub struct MirrorService {
    mirror: WeekdayMirror,
    notifier: Rc<dyn Notifier>,
}

impl MirrorService {
    pub fn new(mirror: WeekdayMirror, notifier: Rc<dyn Notifier>) -> Self {
        Self { mirror, notifier }
    }

    /// Builds lanes for every task already in `schedule`.
    pub fn from_schedule(schedule: &Schedule, notifier: Rc<dyn Notifier>) -> Self {
        Self::new(WeekdayMirror::from_schedule(schedule), notifier)
    }

    /// Inserts an entry for `task` at its ordered position.
    pub fn add_task(&mut self, task: &Task) -> bool {
        match self.mirror.insert(task) {
            Ok(index) => {
                debug!(
                    "event=mirror_add module=mirror status=ok weekday={} time={} index={index}",
                    task.weekday(),
                    format_hhmm(task.time())
                );
                true
            }
            Err(err) => {
                debug!("event=mirror_add module=mirror status=rejected reason=\"{err}\"");
                false
            }
        }
    }

    /// Removes the entry representing `task`.
    pub fn delete_task(&mut self, task: &Task) -> bool {
        match self.mirror.remove(task) {
            Ok(index) => {
                debug!(
                    "event=mirror_delete module=mirror status=ok weekday={} time={} index={index}",
                    task.weekday(),
                    format_hhmm(task.time())
                );
                true
            }
            Err(err) => {
                debug!("event=mirror_delete module=mirror status=rejected reason=\"{err}\"");
                false
            }
        }
    }

    /// Replaces the entry for `old` with one for `new`.
    pub fn edit_task(&mut self, old: &Task, new: &Task) -> bool {
        if old == new || !self.delete_task(old) {
            return false;
        }
        if !self.add_task(new) {
            let restored = rollback(
                &mut self.mirror,
                old,
                |mirror, task| mirror.insert(task).map(|_| ()),
                |mirror, task| mirror.is_represented(task),
                self.notifier.as_ref(),
            );
            warn!(
                "event=mirror_edit module=mirror status=rolled_back weekday={} time={} restored={restored}",
                new.weekday(),
                format_hhmm(new.time())
            );
            return false;
        }
        !self.mirror.is_represented(old) && self.mirror.is_represented(new)
    }

    pub fn is_task_in_weekday_planner(&self, task: &Task) -> bool {
        self.mirror.is_represented(task)
    }

    pub fn entries(&self, weekday: Weekday) -> &[MirrorEntry] {
        self.mirror.entries(weekday)
    }

    pub fn mirror(&self) -> &WeekdayMirror {
        &self.mirror
    }

    /// Discards all entries and rebuilds them from `schedule`.
    pub fn rebuild(&mut self, schedule: &Schedule) {
        self.mirror.rebuild(schedule);
        debug!(
            "event=mirror_rebuild module=mirror status=ok entries={}",
            self.mirror.len()
        );
    }
}
