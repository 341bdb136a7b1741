//! JSON file gateway.
//!
//! # Responsibility
//! - Persist the schedule as `weekday -> HH:MM -> task` pretty JSON.
//! - Persist the task-name catalog as a sorted JSON array.
//!
//! # Invariants
//! - A missing file or a literal `null` document loads as `None`.
//! - Writes go to a sibling temp file first and are renamed into place, so a
//!   failed save leaves the previous file intact.

use crate::model::schedule::Schedule;
use crate::repo::{RepoError, RepoResult, ScheduleRepository, TaskNamesRepository};
use log::{error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File-backed planner gateway.
#[derive(Debug, Clone)]
pub struct JsonPlannerRepository {
    planner_path: PathBuf,
    task_names_path: PathBuf,
}

impl JsonPlannerRepository {
    pub fn new(planner_path: impl Into<PathBuf>, task_names_path: impl Into<PathBuf>) -> Self {
        Self {
            planner_path: planner_path.into(),
            task_names_path: task_names_path.into(),
        }
    }

    pub fn planner_path(&self) -> &Path {
        &self.planner_path
    }

    pub fn task_names_path(&self) -> &Path {
        &self.task_names_path
    }
}

impl ScheduleRepository for JsonPlannerRepository {
    fn load_schedule(&self) -> RepoResult<Option<Schedule>> {
        read_json(&self.planner_path, "schedule")
    }

    fn save_schedule(&self, schedule: &Schedule) -> RepoResult<()> {
        write_json(&self.planner_path, schedule, "schedule")
    }
}

impl TaskNamesRepository for JsonPlannerRepository {
    fn load_task_names(&self) -> RepoResult<Option<BTreeSet<String>>> {
        read_json(&self.task_names_path, "task_names")
    }

    fn save_task_names(&self, names: &BTreeSet<String>) -> RepoResult<()> {
        write_json(&self.task_names_path, names, "task_names")
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, kind: &str) -> RepoResult<Option<T>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!("event=repo_load module=repo status=missing backend=json kind={kind}");
            return Ok(None);
        }
        Err(err) => {
            error!("event=repo_load module=repo status=error backend=json kind={kind} error={err}");
            return Err(err.into());
        }
    };

    match serde_json::from_str::<Option<T>>(&text) {
        Ok(value) => {
            info!("event=repo_load module=repo status=ok backend=json kind={kind}");
            Ok(value)
        }
        Err(err) => {
            error!("event=repo_load module=repo status=error backend=json kind={kind} error={err}");
            Err(err.into())
        }
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, kind: &str) -> RepoResult<()> {
    let result = serde_json::to_string_pretty(value)
        .map_err(RepoError::from)
        .and_then(|text| replace_file(path, text.as_bytes()));

    match &result {
        Ok(()) => info!("event=repo_save module=repo status=ok backend=json kind={kind}"),
        Err(err) => {
            error!("event=repo_save module=repo status=error backend=json kind={kind} error={err}")
        }
    }
    result
}

fn replace_file(path: &Path, contents: &[u8]) -> RepoResult<()> {
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    fs::write(&temp_path, contents)?;
    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    Ok(())
}
