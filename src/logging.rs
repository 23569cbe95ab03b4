// ABOUTME: Diagnostic log for a workspace: appends tracing events to lucidia.log.
// ABOUTME: The subscriber is scoped to the owning session via a default guard.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::filter::LevelFilter;

/// File name of the diagnostic log inside a workspace.
pub const LOG_FILE_NAME: &str = "lucidia.log";

/// Path to the diagnostic log for a given workspace directory.
pub fn log_path(workspace_dir: &Path) -> PathBuf {
    workspace_dir.join(LOG_FILE_NAME)
}

/// Handle to the installed log subscriber. Dropping it stops logging to the file.
pub struct SessionLog {
    pub path: PathBuf,
    _guard: DefaultGuard,
}

impl SessionLog {
    /// Open `path` for appending and route this thread's tracing events into it.
    ///
    /// `level` is a level name such as `"info"` or `"debug"`.
    pub fn open(path: &Path, level: &str) -> anyhow::Result<Self> {
        let filter: LevelFilter = level
            .parse()
            .with_context(|| format!("invalid log level '{}'", level))?;
        let file = open_append(path)?;

        let subscriber = tracing_subscriber::fmt()
            .with_max_level(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(false)
            .with_level(true)
            .finish();

        let guard = tracing::subscriber::set_default(subscriber);
        Ok(Self {
            path: path.to_path_buf(),
            _guard: guard,
        })
    }
}

fn open_append(path: &Path) -> anyhow::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_is_inside_workspace() {
        let path = log_path(Path::new("/work/space"));
        assert_eq!(path, PathBuf::from("/work/space/lucidia.log"));
    }

    #[test]
    fn events_are_appended_with_level() {
        let tmp = tempfile::tempdir().unwrap();
        let path = log_path(tmp.path());

        {
            let _log = SessionLog::open(&path, "info").unwrap();
            tracing::info!("first event");
            tracing::debug!("filtered out");
        }
        {
            let _log = SessionLog::open(&path, "info").unwrap();
            tracing::error!("second event");
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2, "log should hold exactly two lines: {content}");
        assert!(lines[0].contains("INFO") && lines[0].contains("first event"));
        assert!(lines[1].contains("ERROR") && lines[1].contains("second event"));
    }

    #[test]
    fn dropping_the_handle_stops_file_logging() {
        let tmp = tempfile::tempdir().unwrap();
        let path = log_path(tmp.path());

        let log = SessionLog::open(&path, "info").unwrap();
        drop(log);
        tracing::info!("after drop");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.is_empty());
    }

    #[test]
    fn invalid_level_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let result = SessionLog::open(&log_path(tmp.path()), "loud");
        assert!(result.is_err());
    }

    #[test]
    fn unopenable_log_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("missing").join("lucidia.log");
        assert!(SessionLog::open(&path, "info").is_err());
    }
}
