//! Display-ordered mirror of schedule membership.
//!
//! # Responsibility
//! - Hold one ordered lane of entries per weekday for incremental display updates.
//! - Provide the presentation strings each entry renders.
//!
//! # Invariants
//! - Each lane is strictly ascending by time; one entry per time.
//! - An entry is keyed by its task's `(weekday, time)` and holds a snapshot
//!   of that task. A snapshot that differs from the caller's task means the
//!   entry is stale and the task is treated as not represented.

use crate::model::clock::format_hhmm;
use crate::model::schedule::Schedule;
use crate::model::task::{SlotError, Task, TaskSlot};
use crate::model::weekday::Weekday;
use chrono::NaiveTime;
use std::collections::BTreeMap;

/// Renders the `name(earned/priority)` label shown for a task.
pub fn task_label(task: &Task) -> String {
    format!(
        "{}({}/{})",
        task.name(),
        task.calculate_points(),
        task.priority()
    )
}

/// One displayed task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorEntry {
    task: Task,
}

impl MirrorEntry {
    fn new(task: Task) -> Self {
        Self { task }
    }

    /// Slot this entry is keyed by.
    pub fn key(&self) -> TaskSlot {
        self.task.slot()
    }

    pub fn time(&self) -> NaiveTime {
        self.task.time()
    }

    /// Task snapshot backing this entry.
    pub fn task(&self) -> &Task {
        &self.task
    }

    /// Widget identifier, `HH:MM_name`.
    pub fn id(&self) -> String {
        format!("{}_{}", self.time_text(), self.task.name())
    }

    pub fn time_text(&self) -> String {
        format_hhmm(self.task.time())
    }

    pub fn label(&self) -> String {
        task_label(&self.task)
    }

    pub fn description(&self) -> &str {
        self.task.description()
    }

    /// Returns whether this entry represents exactly `task`.
    pub fn matches(&self, task: &Task) -> bool {
        self.key() == task.slot() && self.task == *task
    }
}

/// Ordered per-weekday lanes of mirror entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekdayMirror {
    lanes: BTreeMap<Weekday, Vec<MirrorEntry>>,
}

impl Default for WeekdayMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl WeekdayMirror {
    /// Creates seven empty lanes.
    pub fn new() -> Self {
        Self {
            lanes: Weekday::ALL
                .into_iter()
                .map(|weekday| (weekday, Vec::new()))
                .collect(),
        }
    }

    /// Builds lanes matching `schedule` exactly.
    pub fn from_schedule(schedule: &Schedule) -> Self {
        let mut mirror = Self::new();
        for weekday in Weekday::ALL {
            let lane = mirror.lanes.entry(weekday).or_default();
            lane.extend(schedule.tasks(weekday).cloned().map(MirrorEntry::new));
        }
        mirror
    }

    /// Entries of one weekday in display order.
    pub fn entries(&self, weekday: Weekday) -> &[MirrorEntry] {
        self.lanes.get(&weekday).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total number of entries across all lanes.
    pub fn len(&self) -> usize {
        self.lanes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.values().all(Vec::is_empty)
    }

    /// Returns whether an up-to-date entry for `task` exists.
    pub fn is_represented(&self, task: &Task) -> bool {
        self.position_of(task).is_some()
    }

    /// Display position of the entry representing `task`.
    pub fn position_of(&self, task: &Task) -> Option<usize> {
        self.entries(task.weekday())
            .iter()
            .position(|entry| entry.matches(task))
    }

    /// Returns whether any entry, stale or not, occupies `(weekday, time)`.
    pub fn is_time_taken(&self, weekday: Weekday, time: NaiveTime) -> bool {
        self.entries(weekday).iter().any(|entry| entry.time() == time)
    }

    /// Index before the first entry strictly after `time`, or the lane length.
    pub fn insertion_index(&self, weekday: Weekday, time: NaiveTime) -> usize {
        let lane = self.entries(weekday);
        lane.iter()
            .position(|entry| entry.time() > time)
            .unwrap_or(lane.len())
    }

    /// Inserts an entry for `task` at its ordered position.
    ///
    /// Returns the display index of the new entry.
    pub(crate) fn insert(&mut self, task: &Task) -> Result<usize, SlotError> {
        if self.is_time_taken(task.weekday(), task.time()) {
            return Err(SlotError::Occupied(task.slot()));
        }
        let index = self.insertion_index(task.weekday(), task.time());
        self.lanes
            .entry(task.weekday())
            .or_default()
            .insert(index, MirrorEntry::new(task.clone()));
        Ok(index)
    }

    /// Removes the entry representing `task` and returns its former index.
    pub(crate) fn remove(&mut self, task: &Task) -> Result<usize, SlotError> {
        let index = self
            .position_of(task)
            .ok_or(SlotError::Missing(task.slot()))?;
        if let Some(lane) = self.lanes.get_mut(&task.weekday()) {
            lane.remove(index);
        }
        Ok(index)
    }

    /// Drops every lane and rebuilds from `schedule`.
    pub(crate) fn rebuild(&mut self, schedule: &Schedule) {
        *self = Self::from_schedule(schedule);
    }

    /// Returns whether lanes hold exactly the schedule's tasks, in time order.
    pub fn is_consistent_with(&self, schedule: &Schedule) -> bool {
        Weekday::ALL.into_iter().all(|weekday| {
            let lane = self.entries(weekday);
            lane.len() == schedule.tasks(weekday).count()
                && lane
                    .iter()
                    .zip(schedule.tasks(weekday))
                    .all(|(entry, task)| entry.matches(task))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{task_label, WeekdayMirror};
    use crate::model::clock::minute_time;
    use crate::model::task::Task;
    use crate::model::weekday::Weekday;

    fn task(name: &str, hour: u32, minute: u32) -> Task {
        Task::new(
            name,
            "",
            minute_time(hour, minute).unwrap(),
            false,
            Weekday::Tuesday,
            4,
        )
        .unwrap()
    }

    #[test]
    fn insert_keeps_lane_ascending() {
        let mut mirror = WeekdayMirror::new();
        for (name, hour) in [("c", 18), ("a", 6), ("b", 12), ("d", 21), ("a0", 5)] {
            mirror.insert(&task(name, hour, 0)).unwrap();
        }

        let times: Vec<_> = mirror
            .entries(Weekday::Tuesday)
            .iter()
            .map(|entry| entry.time_text())
            .collect();
        assert_eq!(times, vec!["05:00", "06:00", "12:00", "18:00", "21:00"]);
    }

    #[test]
    fn insert_rejects_taken_time() {
        let mut mirror = WeekdayMirror::new();
        mirror.insert(&task("a", 9, 0)).unwrap();
        assert!(mirror.insert(&task("b", 9, 0)).is_err());
        assert_eq!(mirror.len(), 1);
    }

    #[test]
    fn stale_snapshot_is_not_represented() {
        let mut mirror = WeekdayMirror::new();
        let stored = task("a", 9, 30);
        mirror.insert(&stored).unwrap();

        assert!(mirror.is_represented(&stored));
        assert!(!mirror.is_represented(&stored.with_done(true)));
        assert!(mirror.is_time_taken(Weekday::Tuesday, stored.time()));
    }

    #[test]
    fn entry_renders_presentation_strings() {
        let mut mirror = WeekdayMirror::new();
        let done = task("Gym", 7, 15).with_done(true);
        mirror.insert(&done).unwrap();

        let entry = &mirror.entries(Weekday::Tuesday)[0];
        assert_eq!(entry.id(), "07:15_Gym");
        assert_eq!(entry.label(), "Gym(4/4)");
        assert_eq!(task_label(&task("Gym", 7, 15)), "Gym(0/4)");
        assert_eq!(entry.description(), "");
    }
}
