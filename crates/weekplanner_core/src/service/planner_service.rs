//! Planner coordinator over the engine and the mirror.
//!
//! # Responsibility
//! - Apply each task operation to the schedule first, then to the mirror.
//! - Undo the schedule step through `rollback` when the mirror step fails.
//! - Offer bulk operations (clear weekdays, reset points) and persistence.
//!
//! # Invariants
//! - After any call returns, the mirror matches the schedule unless a
//!   compensation itself failed, which is notified.
//! - Bulk operations go through the single-task operations one task at a time.

use crate::model::clock::format_hhmm;
use crate::model::mirror::{MirrorEntry, WeekdayMirror};
use crate::model::schedule::Schedule;
use crate::model::task::{SlotError, Task};
use crate::model::weekday::Weekday;
use crate::notify::Notifier;
use crate::overview::WeeklyOverview;
use crate::repo::ScheduleRepository;
use crate::service::mirror_service::MirrorService;
use crate::service::rollback::rollback;
use crate::service::schedule_service::ScheduleService;
use chrono::NaiveTime;
use log::{info, warn};
use std::rc::Rc;

/// Coordinator keeping the schedule and its mirror in step.
pub struct PlannerService<R: ScheduleRepository> {
    engine: ScheduleService<R>,
    mirror: MirrorService,
    notifier: Rc<dyn Notifier>,
}

impl<R: ScheduleRepository> PlannerService<R> {
    /// Loads the schedule through `repo` and builds the mirror from it.
    pub fn load(repo: R, notifier: Rc<dyn Notifier>) -> Self {
        Self::new(ScheduleService::load(repo, notifier))
    }

    /// Wraps an engine and builds a matching mirror.
    pub fn new(engine: ScheduleService<R>) -> Self {
        let notifier = Rc::clone(engine.notifier());
        let mirror = MirrorService::from_schedule(engine.schedule(), Rc::clone(&notifier));
        Self::from_parts(engine, mirror, notifier)
    }

    /// Assembles a coordinator from independently built parts.
    pub fn from_parts(
        engine: ScheduleService<R>,
        mirror: MirrorService,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        Self {
            engine,
            mirror,
            notifier,
        }
    }

    pub fn add_task(&mut self, task: &Task) -> bool {
        if !self.engine.add_task(task) {
            return false;
        }
        if !self.mirror.add_task(task) {
            let undone = rollback(
                &mut self.engine,
                task,
                |engine, task| {
                    if engine.delete_task(task) {
                        Ok(())
                    } else {
                        Err(SlotError::Missing(task.slot()))
                    }
                },
                |engine, task| !engine.is_task_in_schedule(task),
                self.notifier.as_ref(),
            );
            log_compensation("planner_add", task, undone);
            return false;
        }
        self.engine.is_task_in_schedule(task) && self.mirror.is_task_in_weekday_planner(task)
    }

    pub fn delete_task(&mut self, task: &Task) -> bool {
        if !self.engine.delete_task(task) {
            return false;
        }
        if !self.mirror.delete_task(task) {
            let undone = rollback(
                &mut self.engine,
                task,
                |engine, task| {
                    if engine.add_task(task) {
                        Ok(())
                    } else {
                        Err(SlotError::Occupied(task.slot()))
                    }
                },
                |engine, task| engine.is_task_in_schedule(task),
                self.notifier.as_ref(),
            );
            log_compensation("planner_delete", task, undone);
            return false;
        }
        !self.engine.is_task_in_schedule(task) && !self.mirror.is_task_in_weekday_planner(task)
    }

    pub fn edit_task(&mut self, old: &Task, new: &Task) -> bool {
        if !self.engine.edit_task(old, new) {
            return false;
        }
        if !self.mirror.edit_task(old, new) {
            let undone = rollback(
                &mut self.engine,
                old,
                |engine, old| {
                    if engine.edit_task(new, old) {
                        Ok(())
                    } else {
                        Err(SlotError::Missing(new.slot()))
                    }
                },
                |engine, old| engine.is_task_in_schedule(old) && !engine.is_task_in_schedule(new),
                self.notifier.as_ref(),
            );
            log_compensation("planner_edit", new, undone);
            return false;
        }
        !self.engine.is_task_in_schedule(old)
            && self.engine.is_task_in_schedule(new)
            && !self.mirror.is_task_in_weekday_planner(old)
            && self.mirror.is_task_in_weekday_planner(new)
    }

    /// Deletes whatever task is stored at `(weekday, time)`.
    pub fn delete_selected(&mut self, weekday: Weekday, time: NaiveTime) -> bool {
        match self.engine.task_at(weekday, time).cloned() {
            Some(stored) => self.delete_task(&stored),
            None => false,
        }
    }

    /// Marks the task at `(weekday, time)` done or not done.
    pub fn set_done(&mut self, weekday: Weekday, time: NaiveTime, done: bool) -> bool {
        match self.engine.task_at(weekday, time).cloned() {
            Some(stored) => self.edit_task(&stored, &stored.with_done(done)),
            None => false,
        }
    }

    /// Deletes every task of `weekdays`; returns how many were removed.
    pub fn clear_weekdays(&mut self, weekdays: &[Weekday]) -> usize {
        let mut removed = 0;
        for &weekday in weekdays {
            let tasks: Vec<Task> = self.engine.schedule().tasks(weekday).cloned().collect();
            removed += tasks.iter().filter(|task| self.delete_task(task)).count();
        }
        info!("event=planner_clear module=planner status=ok removed={removed}");
        removed
    }

    /// Marks every done task of `weekdays` as not done; returns how many changed.
    pub fn reset_points(&mut self, weekdays: &[Weekday]) -> usize {
        let mut reset = 0;
        for &weekday in weekdays {
            let done: Vec<Task> = self
                .engine
                .schedule()
                .tasks(weekday)
                .filter(|task| task.is_done())
                .cloned()
                .collect();
            reset += done
                .iter()
                .filter(|task| self.edit_task(task, &task.with_done(false)))
                .count();
        }
        info!("event=planner_reset module=planner status=ok reset={reset}");
        reset
    }

    pub fn save(&self) -> bool {
        self.engine.save()
    }

    /// Reloads the schedule and rebuilds the mirror from it.
    pub fn reload(&mut self) -> bool {
        let loaded = self.engine.reload();
        self.mirror.rebuild(self.engine.schedule());
        loaded
    }

    pub fn is_consistent(&self) -> bool {
        self.mirror.mirror().is_consistent_with(self.engine.schedule())
    }

    pub fn overview(&self) -> WeeklyOverview {
        WeeklyOverview::build(self.engine.schedule())
    }

    pub fn entries(&self, weekday: Weekday) -> &[MirrorEntry] {
        self.mirror.entries(weekday)
    }

    pub fn schedule(&self) -> &Schedule {
        self.engine.schedule()
    }

    pub fn mirror(&self) -> &WeekdayMirror {
        self.mirror.mirror()
    }

    pub fn engine(&self) -> &ScheduleService<R> {
        &self.engine
    }
}

fn log_compensation(event: &str, task: &Task, undone: bool) {
    warn!(
        "event={event} module=planner status=compensated weekday={} time={} restored={undone}",
        task.weekday(),
        format_hhmm(task.time())
    );
}
