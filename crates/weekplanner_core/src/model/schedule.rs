//! Authoritative weekly schedule store.
//!
//! # Responsibility
//! - Own the weekday -> time -> task mapping.
//! - Answer structural queries (occupancy, value lookup, aggregates).
//!
//! # Invariants
//! - All seven weekdays are always present, possibly with empty lanes.
//! - A task stored under `(weekday, time)` reports that same weekday and time.
//! - `put` does not check occupancy; callers check first.
//!
//! Mutating methods are crate-private; callers go through `ScheduleService`.

use crate::model::clock::{format_hhmm, parse_hhmm};
use crate::model::task::{Task, TaskSlot};
use crate::model::weekday::Weekday;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

type Lane = BTreeMap<NaiveTime, Task>;

/// Scoring reducers accepted by [`Schedule::count_points`].
pub mod scoring {
    use crate::model::task::Task;

    /// Points earned: priority of done tasks, `0` otherwise.
    pub fn earned(task: &Task) -> u32 {
        task.calculate_points()
    }

    /// Points possible: raw priority regardless of completion.
    pub fn possible(task: &Task) -> u32 {
        task.possible_points()
    }
}

/// Structural error found while loading persisted schedule content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleDataError {
    /// Inner map key is not a valid `HH:MM` time.
    MalformedTimeKey { weekday: Weekday, key: String },
    /// Stored task reports a different slot than the key it is stored under.
    SlotMismatch { key: TaskSlot, task_slot: TaskSlot },
    /// Two tasks claim the same slot.
    DuplicateSlot(TaskSlot),
}

impl Display for ScheduleDataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedTimeKey { weekday, key } => {
                write!(f, "invalid time key `{key}` under {weekday}")
            }
            Self::SlotMismatch { key, task_slot } => {
                write!(f, "task stored under {key} reports slot {task_slot}")
            }
            Self::DuplicateSlot(slot) => write!(f, "slot {slot} is claimed twice"),
        }
    }
}

impl Error for ScheduleDataError {}

/// Weekly schedule keyed by weekday and time of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleRecord", into = "ScheduleRecord")]
pub struct Schedule {
    days: BTreeMap<Weekday, Lane>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

impl Schedule {
    /// Creates a schedule with seven empty lanes.
    pub fn new() -> Self {
        Self {
            days: Weekday::ALL
                .into_iter()
                .map(|weekday| (weekday, Lane::new()))
                .collect(),
        }
    }

    /// Builds a schedule from tasks, rejecting two tasks on one slot.
    pub fn from_tasks(
        tasks: impl IntoIterator<Item = Task>,
    ) -> Result<Self, ScheduleDataError> {
        let mut schedule = Self::new();
        for task in tasks {
            let slot = task.slot();
            if schedule.is_slot_occupied(slot.weekday, slot.time) {
                return Err(ScheduleDataError::DuplicateSlot(slot));
            }
            schedule.put(task);
        }
        Ok(schedule)
    }

    /// Returns whether `weekday` already holds a task at `time`.
    pub fn is_slot_occupied(&self, weekday: Weekday, time: NaiveTime) -> bool {
        self.lane(weekday).contains_key(&time)
    }

    /// Task stored at `(weekday, time)`.
    pub fn get(&self, weekday: Weekday, time: NaiveTime) -> Option<&Task> {
        self.lane(weekday).get(&time)
    }

    /// Returns whether a value-equal task is stored at its own slot.
    pub fn contains(&self, task: &Task) -> bool {
        self.get(task.weekday(), task.time()) == Some(task)
    }

    /// Inserts or overwrites the entry at the task's slot.
    pub(crate) fn put(&mut self, task: Task) {
        self.days
            .entry(task.weekday())
            .or_default()
            .insert(task.time(), task);
    }

    /// Removes the entry at `(weekday, time)` only when it equals `expected`.
    pub(crate) fn remove(&mut self, weekday: Weekday, time: NaiveTime, expected: &Task) -> bool {
        let Some(lane) = self.days.get_mut(&weekday) else {
            return false;
        };
        if lane.get(&time) != Some(expected) {
            return false;
        }
        lane.remove(&time).is_some()
    }

    /// Tasks of one weekday, ascending by time.
    pub fn tasks(&self, weekday: Weekday) -> impl Iterator<Item = &Task> + '_ {
        self.days.get(&weekday).into_iter().flat_map(Lane::values)
    }

    /// Every task, Monday first and ascending by time within a day.
    pub fn iter(&self) -> impl Iterator<Item = &Task> + '_ {
        self.days.values().flat_map(Lane::values)
    }

    /// Number of scheduled tasks across the week.
    pub fn len(&self) -> usize {
        self.days.values().map(Lane::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.values().all(Lane::is_empty)
    }

    /// Union of occupied times across all weekdays, ascending.
    pub fn collect_sorted_times(&self) -> BTreeSet<NaiveTime> {
        self.days
            .values()
            .flat_map(|lane| lane.keys().copied())
            .collect()
    }

    /// Sums `scoring` over every task of `weekday`.
    pub fn count_points<F>(&self, weekday: Weekday, scoring: F) -> u32
    where
        F: Fn(&Task) -> u32,
    {
        self.tasks(weekday).map(scoring).sum()
    }

    fn lane(&self, weekday: Weekday) -> &Lane {
        static EMPTY: Lane = Lane::new();
        self.days.get(&weekday).unwrap_or(&EMPTY)
    }
}

/// Persisted shape: weekday -> `HH:MM` -> task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct ScheduleRecord(BTreeMap<Weekday, BTreeMap<String, Task>>);

impl TryFrom<ScheduleRecord> for Schedule {
    type Error = ScheduleDataError;

    fn try_from(record: ScheduleRecord) -> Result<Self, Self::Error> {
        let mut schedule = Schedule::new();
        for (weekday, entries) in record.0 {
            for (key, task) in entries {
                let time = parse_hhmm(&key).ok_or_else(|| ScheduleDataError::MalformedTimeKey {
                    weekday,
                    key: key.clone(),
                })?;
                let key_slot = TaskSlot { weekday, time };
                if task.slot() != key_slot {
                    return Err(ScheduleDataError::SlotMismatch {
                        key: key_slot,
                        task_slot: task.slot(),
                    });
                }
                if schedule.is_slot_occupied(weekday, time) {
                    return Err(ScheduleDataError::DuplicateSlot(key_slot));
                }
                schedule.put(task);
            }
        }
        Ok(schedule)
    }
}

impl From<Schedule> for ScheduleRecord {
    fn from(schedule: Schedule) -> Self {
        Self(
            schedule
                .days
                .into_iter()
                .map(|(weekday, lane)| {
                    let entries = lane
                        .into_iter()
                        .map(|(time, task)| (format_hhmm(time), task))
                        .collect();
                    (weekday, entries)
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{scoring, Schedule};
    use crate::model::clock::minute_time;
    use crate::model::task::Task;
    use crate::model::weekday::Weekday;

    fn task(name: &str, hour: u32, weekday: Weekday, done: bool, priority: u8) -> Task {
        Task::new(name, "", minute_time(hour, 0).unwrap(), done, weekday, priority).unwrap()
    }

    #[test]
    fn new_schedule_has_seven_empty_lanes() {
        let schedule = Schedule::new();
        assert!(schedule.is_empty());
        for weekday in Weekday::ALL {
            assert_eq!(schedule.tasks(weekday).count(), 0);
        }
    }

    #[test]
    fn remove_is_value_gated() {
        let mut schedule = Schedule::new();
        let stored = task("Run", 7, Weekday::Monday, true, 5);
        schedule.put(stored.clone());

        let stale = stored.with_done(false);
        assert!(!schedule.remove(Weekday::Monday, stored.time(), &stale));
        assert!(schedule.contains(&stored));

        assert!(schedule.remove(Weekday::Monday, stored.time(), &stored));
        assert!(!schedule.is_slot_occupied(Weekday::Monday, stored.time()));
    }

    #[test]
    fn sorted_times_are_a_union_across_days() {
        let mut schedule = Schedule::new();
        schedule.put(task("a", 9, Weekday::Monday, false, 1));
        schedule.put(task("b", 7, Weekday::Wednesday, false, 1));
        schedule.put(task("c", 9, Weekday::Sunday, false, 1));

        let times: Vec<_> = schedule.collect_sorted_times().into_iter().collect();
        assert_eq!(
            times,
            vec![minute_time(7, 0).unwrap(), minute_time(9, 0).unwrap()]
        );
    }

    #[test]
    fn count_points_uses_the_given_reducer() {
        let mut schedule = Schedule::new();
        schedule.put(task("a", 7, Weekday::Monday, false, 3));
        schedule.put(task("b", 8, Weekday::Monday, true, 5));
        schedule.put(task("c", 9, Weekday::Monday, false, 8));
        schedule.put(task("d", 9, Weekday::Tuesday, true, 2));

        assert_eq!(schedule.count_points(Weekday::Monday, scoring::earned), 5);
        assert_eq!(schedule.count_points(Weekday::Monday, scoring::possible), 16);
        assert_eq!(schedule.count_points(Weekday::Sunday, scoring::possible), 0);
    }

    #[test]
    fn from_tasks_rejects_duplicate_slots() {
        let first = task("a", 7, Weekday::Monday, false, 3);
        let second = task("b", 7, Weekday::Monday, false, 4);
        assert!(Schedule::from_tasks([first, second]).is_err());
    }
}
