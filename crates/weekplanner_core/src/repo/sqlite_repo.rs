//! SQLite gateway for the schedule and the task-name catalog.
//!
//! # Responsibility
//! - Map `schedule_tasks` rows to validated tasks and back.
//! - Replace persisted state wholesale on every save.
//!
//! # Invariants
//! - Connections must be fully migrated before a repository is built.
//! - A save is one transaction: either the whole snapshot lands or nothing.
//! - "Never saved" is tracked in `planner_meta`, so an empty saved schedule
//!   loads as `Some(empty)` rather than `None`.

use crate::db::migrations::{current_version, latest_version};
use crate::model::clock::{format_hhmm, parse_hhmm};
use crate::model::schedule::Schedule;
use crate::model::task::{Task, TaskValidationError};
use crate::model::weekday::Weekday;
use crate::repo::{RepoError, RepoResult, ScheduleRepository, TaskNamesRepository};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;

const SCHEDULE_MARKER: &str = "schedule_initialized";
const TASK_NAMES_MARKER: &str = "task_names_initialized";

/// SQLite-backed planner gateway borrowing an open connection.
pub struct SqlitePlannerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePlannerRepository<'conn> {
    /// Builds a repository after checking the connection schema version.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }

    fn is_marked(&self, key: &str) -> RepoResult<bool> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM planner_meta WHERE key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.is_some())
    }
}

impl ScheduleRepository for SqlitePlannerRepository<'_> {
    fn load_schedule(&self) -> RepoResult<Option<Schedule>> {
        if !self.is_marked(SCHEDULE_MARKER)? {
            return Ok(None);
        }

        let mut stmt = self.conn.prepare(
            "SELECT weekday, time, task_name, description, is_done, priority
             FROM schedule_tasks
             ORDER BY weekday, time;",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(TaskRow {
                weekday: row.get(0)?,
                time: row.get(1)?,
                name: row.get(2)?,
                description: row.get(3)?,
                done: row.get(4)?,
                priority: row.get(5)?,
            })
        })?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?.into_task()?);
        }
        let count = tasks.len();
        let schedule =
            Schedule::from_tasks(tasks).map_err(|err| RepoError::InvalidData(err.to_string()))?;

        info!("event=repo_load module=repo status=ok backend=sqlite kind=schedule tasks={count}");
        Ok(Some(schedule))
    }

    fn save_schedule(&self, schedule: &Schedule) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM schedule_tasks;", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO schedule_tasks (
                    weekday,
                    time,
                    task_name,
                    description,
                    is_done,
                    priority
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            )?;
            for task in schedule.iter() {
                insert.execute(params![
                    task.weekday().as_str(),
                    format_hhmm(task.time()),
                    task.name(),
                    task.description(),
                    task.is_done(),
                    task.priority(),
                ])?;
            }
        }
        mark(&tx, SCHEDULE_MARKER)?;
        tx.commit()?;

        info!(
            "event=repo_save module=repo status=ok backend=sqlite kind=schedule tasks={}",
            schedule.len()
        );
        Ok(())
    }
}

impl TaskNamesRepository for SqlitePlannerRepository<'_> {
    fn load_task_names(&self) -> RepoResult<Option<BTreeSet<String>>> {
        if !self.is_marked(TASK_NAMES_MARKER)? {
            return Ok(None);
        }

        let mut stmt = self.conn.prepare("SELECT name FROM task_names;")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Some(names))
    }

    fn save_task_names(&self, names: &BTreeSet<String>) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM task_names;", [])?;
        for name in names {
            tx.execute("INSERT INTO task_names (name) VALUES (?1);", [name.as_str()])?;
        }
        mark(&tx, TASK_NAMES_MARKER)?;
        tx.commit()?;

        info!(
            "event=repo_save module=repo status=ok backend=sqlite kind=task_names names={}",
            names.len()
        );
        Ok(())
    }
}

struct TaskRow {
    weekday: String,
    time: String,
    name: String,
    description: String,
    done: bool,
    priority: i64,
}

impl TaskRow {
    fn into_task(self) -> RepoResult<Task> {
        let weekday = Weekday::parse(&self.weekday).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid weekday `{}` in schedule_tasks", self.weekday))
        })?;
        let time = parse_hhmm(&self.time)
            .ok_or_else(|| TaskValidationError::MalformedTime(self.time.clone()))?;
        let priority = u8::try_from(self.priority)
            .map_err(|_| TaskValidationError::PriorityOutOfRange(self.priority))?;
        Ok(Task::new(
            self.name,
            self.description,
            time,
            self.done,
            weekday,
            priority,
        )?)
    }
}

fn mark(conn: &Connection, key: &str) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO planner_meta (key, value) VALUES (?1, '1')
         ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
        [key],
    )?;
    Ok(())
}
