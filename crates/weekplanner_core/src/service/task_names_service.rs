//! Task-name catalog.
//!
//! # Invariants
//! - Names are unique and kept in sorted order.
//! - Blank names are never stored; names are kept exactly as given.

use crate::notify::Notifier;
use crate::repo::TaskNamesRepository;
use crate::service::schedule_service::{LOAD_FAILED_TITLE, SAVE_FAILED_TITLE};
use log::{error, info};
use std::collections::BTreeSet;
use std::rc::Rc;

/// Catalog of names offered when creating tasks.
pub struct TaskNamesService<R: TaskNamesRepository> {
    repo: R,
    names: BTreeSet<String>,
    notifier: Rc<dyn Notifier>,
}

impl<R: TaskNamesRepository> TaskNamesService<R> {
    /// Loads the stored catalog; a missing or unreadable one starts empty.
    pub fn load(repo: R, notifier: Rc<dyn Notifier>) -> Self {
        let names = match repo.load_task_names() {
            Ok(names) => {
                let names = names.unwrap_or_default();
                info!(
                    "event=catalog_load module=catalog status=ok names={}",
                    names.len()
                );
                names
            }
            Err(err) => {
                error!("event=catalog_load module=catalog status=error error={err}");
                notifier.notify(LOAD_FAILED_TITLE, &err.to_string());
                BTreeSet::new()
            }
        };
        Self {
            repo,
            names,
            notifier,
        }
    }

    /// Adds `name`; `false` for blank or already known names.
    pub fn add_task_name(&mut self, name: &str) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        self.names.insert(name.to_string())
    }

    /// Removes `name`; `false` for blank or unknown names.
    pub fn delete_task_name(&mut self, name: &str) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        self.names.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Names in sorted order.
    pub fn task_names(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    pub fn save(&self) -> bool {
        match self.repo.save_task_names(&self.names) {
            Ok(()) => {
                info!(
                    "event=catalog_save module=catalog status=ok names={}",
                    self.names.len()
                );
                true
            }
            Err(err) => {
                error!("event=catalog_save module=catalog status=error error={err}");
                self.notifier.notify(SAVE_FAILED_TITLE, &err.to_string());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TaskNamesService;
    use crate::notify::QueuedNotifier;
    use crate::repo::json_repo::JsonPlannerRepository;
    use crate::repo::memory_repo::MemoryPlannerRepository;
    use crate::service::schedule_service::{LOAD_FAILED_TITLE, SAVE_FAILED_TITLE};
    use std::collections::BTreeSet;
    use std::rc::Rc;

    #[test]
    fn blank_and_duplicate_names_are_rejected() {
        let mut catalog =
            TaskNamesService::load(MemoryPlannerRepository::new(), Rc::new(QueuedNotifier::new()));

        assert!(catalog.add_task_name("Read"));
        assert!(!catalog.add_task_name("Read"));
        assert!(!catalog.add_task_name("   "));
        assert!(catalog.add_task_name("Cook"));
        assert_eq!(catalog.task_names(), vec!["Cook", "Read"]);

        assert!(!catalog.delete_task_name("Swim"));
        assert!(catalog.delete_task_name("Cook"));
        assert_eq!(catalog.task_names(), vec!["Read"]);
    }

    #[test]
    fn failed_save_is_notified_and_keeps_names() {
        let names: BTreeSet<String> = ["Run"].into_iter().map(String::from).collect();
        let repo = MemoryPlannerRepository::with_task_names(names);
        let notifier = Rc::new(QueuedNotifier::new());
        let mut catalog = TaskNamesService::load(&repo, notifier.clone());
        assert_eq!(catalog.task_names(), vec!["Run"]);

        assert!(catalog.add_task_name("Swim"));
        repo.set_fail_saves(true);
        assert!(!catalog.save());
        assert_eq!(catalog.task_names(), vec!["Run", "Swim"]);
        assert_eq!(repo.save_count(), 0);

        let drained = notifier.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].title, SAVE_FAILED_TITLE);

        repo.set_fail_saves(false);
        assert!(catalog.save());
        assert!(notifier.is_empty());
    }

    #[test]
    fn unreadable_catalog_is_notified_and_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let names_path = dir.path().join("TaskNames.json");
        std::fs::write(&names_path, "[\"Run\",").unwrap();
        let repo = JsonPlannerRepository::new(dir.path().join("Planner.json"), names_path);
        let notifier = Rc::new(QueuedNotifier::new());

        let catalog = TaskNamesService::load(repo, notifier.clone());

        assert!(catalog.task_names().is_empty());
        let drained = notifier.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].title, LOAD_FAILED_TITLE);
    }
}
