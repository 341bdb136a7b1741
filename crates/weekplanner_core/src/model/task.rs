//! Scheduled task domain model.
//!
//! # Responsibility
//! - Define one scheduled activity bound to a weekday + time slot.
//! - Own the scoring rule used by every aggregate.
//!
//! # Invariants
//! - `time` is minute-aligned and `priority` is in `1..=10`.
//! - A failed `set_priority` leaves the task untouched.
//! - Equality is full value equality over all fields.
//! - Deserialized tasks go through the same validation as `Task::new`.

use crate::model::clock::{format_hhmm, is_minute_aligned, parse_hhmm};
use crate::model::weekday::Weekday;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lowest accepted priority.
pub const MIN_PRIORITY: u8 = 1;
/// Highest accepted priority.
pub const MAX_PRIORITY: u8 = 10;

/// Validation failure for task construction and mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Task has no time of day.
    MissingTime,
    /// Task has no weekday.
    MissingWeekday,
    /// Time text is not a valid `HH:MM` value.
    MalformedTime(String),
    /// Time carries seconds or a sub-second part.
    TimeNotMinuteAligned(NaiveTime),
    /// Priority is outside `1..=10`.
    PriorityOutOfRange(i64),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTime => write!(f, "task time is required"),
            Self::MissingWeekday => write!(f, "task weekday is required"),
            Self::MalformedTime(value) => write!(f, "task time `{value}` is not HH:MM"),
            Self::TimeNotMinuteAligned(time) => {
                write!(f, "task time {time} must not carry seconds")
            }
            Self::PriorityOutOfRange(value) => write!(
                f,
                "priority {value} is out of range {MIN_PRIORITY}..={MAX_PRIORITY}"
            ),
        }
    }
}

impl Error for TaskValidationError {}

/// `(weekday, time)` pair identifying at most one task in a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskSlot {
    pub weekday: Weekday,
    pub time: NaiveTime,
}

impl Display for TaskSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.weekday, format_hhmm(self.time))
    }
}

/// Structural failure of a slot-level insert or removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    /// Slot already holds an entry.
    Occupied(TaskSlot),
    /// Slot does not hold the expected task.
    Missing(TaskSlot),
}

impl Display for SlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Occupied(slot) => write!(f, "slot {slot} is already occupied"),
            Self::Missing(slot) => write!(f, "expected task not found at {slot}"),
        }
    }
}

impl Error for SlotError {}

/// One scheduled activity.
///
/// Fields are private so priority validation cannot be bypassed; `done` is
/// the only flag meant to change during normal use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    name: String,
    description: String,
    time: NaiveTime,
    done: bool,
    weekday: Weekday,
    priority: u8,
}

impl Task {
    /// Creates a validated task.
    ///
    /// # Errors
    /// - `TimeNotMinuteAligned` when `time` carries seconds.
    /// - `PriorityOutOfRange` when `priority` is outside `1..=10`.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        time: NaiveTime,
        done: bool,
        weekday: Weekday,
        priority: u8,
    ) -> Result<Self, TaskValidationError> {
        validate_time(time)?;
        validate_priority(i64::from(priority))?;

        Ok(Self {
            name: name.into(),
            description: description.into(),
            time,
            done,
            weekday,
            priority,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    /// Slot this task claims in a schedule.
    pub fn slot(&self) -> TaskSlot {
        TaskSlot {
            weekday: self.weekday,
            time: self.time,
        }
    }

    /// Toggles completion. Never affects validity.
    pub fn set_done(&mut self, done: bool) {
        self.done = done;
    }

    /// Replaces priority after validation.
    ///
    /// # Errors
    /// Returns `PriorityOutOfRange` and keeps the current priority when
    /// `priority` is outside `1..=10`.
    pub fn set_priority(&mut self, priority: u8) -> Result<(), TaskValidationError> {
        validate_priority(i64::from(priority))?;
        self.priority = priority;
        Ok(())
    }

    /// Points earned by this task: `priority` when done, otherwise `0`.
    pub fn calculate_points(&self) -> u32 {
        if self.done {
            u32::from(self.priority)
        } else {
            0
        }
    }

    /// Raw priority as a point value; the "possible points" reducer.
    pub fn possible_points(&self) -> u32 {
        u32::from(self.priority)
    }

    /// Returns a value-equal, independently owned task.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Returns a copy with `done` replaced.
    pub fn with_done(&self, done: bool) -> Self {
        let mut task = self.clone();
        task.done = done;
        task
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} @ {} (priority={}, done={})",
            self.name,
            self.slot(),
            self.priority,
            self.done
        )
    }
}

fn validate_time(time: NaiveTime) -> Result<(), TaskValidationError> {
    if is_minute_aligned(time) {
        Ok(())
    } else {
        Err(TaskValidationError::TimeNotMinuteAligned(time))
    }
}

fn validate_priority(priority: i64) -> Result<u8, TaskValidationError> {
    match u8::try_from(priority) {
        Ok(value) if (MIN_PRIORITY..=MAX_PRIORITY).contains(&value) => Ok(value),
        _ => Err(TaskValidationError::PriorityOutOfRange(priority)),
    }
}

/// Wire shape for persisted tasks.
///
/// Optional fields let deserialization report a missing time or weekday as a
/// validation error instead of a generic decode failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    task_name: String,
    #[serde(default)]
    description: String,
    time: Option<String>,
    is_done: bool,
    weekday: Option<Weekday>,
    priority: i64,
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskValidationError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let time_text = record.time.ok_or(TaskValidationError::MissingTime)?;
        let time = parse_hhmm(&time_text).ok_or(TaskValidationError::MalformedTime(time_text))?;
        let weekday = record.weekday.ok_or(TaskValidationError::MissingWeekday)?;
        let priority = validate_priority(record.priority)?;

        Task::new(
            record.task_name,
            record.description,
            time,
            record.is_done,
            weekday,
            priority,
        )
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        Self {
            time: Some(format_hhmm(task.time)),
            weekday: Some(task.weekday),
            priority: i64::from(task.priority),
            task_name: task.name,
            description: task.description,
            is_done: task.done,
        }
    }
}
