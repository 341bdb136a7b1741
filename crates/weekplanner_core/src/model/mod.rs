//! Weekly planner domain model.
//!
//! # Responsibility
//! - Define the task value, the weekday key and the authoritative schedule.
//! - Define the display-ordered mirror kept in sync with the schedule.
//!
//! # Invariants
//! - A slot `(weekday, time)` holds at most one task.
//! - Tasks are validated on construction, on priority mutation and on load.

pub mod clock;
pub mod mirror;
pub mod schedule;
pub mod task;
pub mod weekday;
