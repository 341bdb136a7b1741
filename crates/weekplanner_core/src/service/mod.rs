//! Planner use-case services.
//!
//! # Responsibility
//! - Run task operations against the schedule and the mirror.
//! - Route load/save through the gateway traits and report failures.
//!
//! # Invariants
//! - The schedule is only mutated through `ScheduleService`.
//! - The mirror is only mutated through `MirrorService`.

pub mod mirror_service;
pub mod planner_service;
pub mod rollback;
pub mod schedule_service;
pub mod task_names_service;
