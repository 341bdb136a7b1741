//! Planner CLI probe.
//!
//! # Responsibility
//! - Open a data directory with the chosen backend and print the weekly overview.

use clap::{Parser, ValueEnum};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use weekplanner_core::{
    core_version, default_log_level, init_logging, PlannerService, QueuedNotifier,
    RepositoryConfig, ScheduleRepository, SqlitePlannerRepository, StorageBackend,
    TaskNamesRepository, TaskNamesService,
};

/// Prints the weekly overview stored in a planner data directory.
#[derive(Debug, Parser)]
#[command(name = "weekplanner_cli", version, about = "Weekly planner overview")]
struct Cli {
    /// Absolute directory holding the planner files
    #[arg(env = "WEEKPLANNER_DATA_DIR")]
    data_dir: PathBuf,

    /// Storage backend to read from
    #[arg(value_enum, default_value_t = BackendArg::Json)]
    backend: BackendArg,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, env = "WEEKPLANNER_LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum BackendArg {
    Json,
    Sqlite,
}

impl From<BackendArg> for StorageBackend {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Json => Self::Json,
            BackendArg::Sqlite => Self::Sqlite,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let backend = StorageBackend::from(cli.backend);

    let config = match RepositoryConfig::from_data_dir(&cli.data_dir, backend) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let level = cli
        .log_level
        .unwrap_or_else(|| default_log_level().to_string());
    let log_dir = config.data_dir().join("logs");
    if let Err(err) = init_logging(&level, &log_dir.to_string_lossy()) {
        eprintln!("logging disabled: {err}");
    }

    println!("weekplanner_core version={}", core_version());
    println!(
        "data_dir={} backend={}",
        config.data_dir().display(),
        backend.as_str()
    );

    match backend {
        StorageBackend::Json => report(&config.json_repository()),
        StorageBackend::Sqlite => {
            let conn = match config.open_database() {
                Ok(conn) => conn,
                Err(err) => {
                    error!("event=cli_open module=cli status=error error={err}");
                    eprintln!("{err}");
                    return ExitCode::FAILURE;
                }
            };
            match SqlitePlannerRepository::try_new(&conn) {
                Ok(repo) => report(&repo),
                Err(err) => {
                    eprintln!("{err}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn report<R>(repo: &R) -> ExitCode
where
    R: ScheduleRepository + TaskNamesRepository,
{
    let notifier = Rc::new(QueuedNotifier::new());
    let planner = PlannerService::load(repo, notifier.clone());
    let catalog = TaskNamesService::load(repo, notifier.clone());

    let overview = planner.overview();
    print!("{overview}");
    println!(
        "week={}/{} tasks={} task_names={}",
        overview.week_earned(),
        overview.week_possible(),
        planner.schedule().len(),
        catalog.task_names().len()
    );

    let notifications = notifier.drain();
    for notification in &notifications {
        eprintln!("{}: {}", notification.title, notification.message);
    }
    if notifications.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::{BackendArg, Cli};
    use clap::error::ErrorKind;
    use clap::{CommandFactory, Parser};
    use std::path::Path;
    use weekplanner_core::StorageBackend;

    #[test]
    fn clap_command_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn backend_defaults_to_json() {
        let cli = Cli::try_parse_from(["weekplanner_cli", "/tmp/planner"]).unwrap();
        assert_eq!(cli.data_dir, Path::new("/tmp/planner"));
        assert_eq!(cli.backend, BackendArg::Json);
        assert_eq!(StorageBackend::from(cli.backend), StorageBackend::Json);
    }

    #[test]
    fn sqlite_backend_and_log_level_are_parsed() {
        let cli = Cli::try_parse_from([
            "weekplanner_cli",
            "/tmp/planner",
            "sqlite",
            "--log-level",
            "warn",
        ])
        .unwrap();
        assert_eq!(StorageBackend::from(cli.backend), StorageBackend::Sqlite);
        assert_eq!(cli.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn help_is_not_taken_as_data_dir() {
        let err = Cli::try_parse_from(["weekplanner_cli", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn unknown_backend_and_extra_arguments_are_rejected() {
        let err = Cli::try_parse_from(["weekplanner_cli", "/tmp/planner", "yaml"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);

        let err = Cli::try_parse_from(["weekplanner_cli", "/tmp/planner", "sqlite", "extra"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }
}
