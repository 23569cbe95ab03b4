// ABOUTME: Screen capture backends: a trait seam plus an external-command implementation.
// ABOUTME: Failures are classified so callers can tell unavailable, denied, and I/O apart.

use std::io;
use std::path::Path;
use std::process::Command;

use chrono::{DateTime, Local};
use thiserror::Error;

/// Name of the directory, under the workspace, that holds captures.
pub const SCREENSHOT_DIR_NAME: &str = "screenshots";

/// Why a screen capture did not produce a file.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("screen capture unavailable: {0}")]
    Unavailable(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("I/O failure: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for CaptureError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(err.to_string()),
            _ => Self::Io(err),
        }
    }
}

/// Something that can write a PNG of the full screen to a path.
pub trait ScreenCapturer {
    fn capture(&self, dest: &Path) -> Result<(), CaptureError>;
}

/// `screen_<YYYYMMDD_HHMMSS>.png` for the given instant.
pub fn screenshot_filename(at: DateTime<Local>) -> String {
    format!("screen_{}.png", at.format("%Y%m%d_%H%M%S"))
}

/// Captures by running an external screenshot program.
#[derive(Debug, Clone)]
pub struct CommandCapturer {
    /// Program and leading args; the destination path is appended.
    command: Option<Vec<String>>,
}

impl CommandCapturer {
    /// Pick the platform default tool at capture time.
    pub fn detect() -> Self {
        Self { command: None }
    }

    /// Always run the given program and args.
    pub fn with_command(command: Vec<String>) -> Self {
        Self {
            command: Some(command),
        }
    }

    /// Build from an optional configured command, detecting otherwise.
    pub fn from_config(command: Option<Vec<String>>) -> Self {
        match command {
            Some(cmd) if !cmd.is_empty() => Self::with_command(cmd),
            _ => Self::detect(),
        }
    }

    fn resolve(&self) -> Result<Vec<String>, CaptureError> {
        if let Some(cmd) = &self.command {
            return Ok(cmd.clone());
        }
        platform_candidates()
            .into_iter()
            .find(|cmd| which::which(&cmd[0]).is_ok())
            .ok_or_else(|| {
                CaptureError::Unavailable(format!(
                    "no screenshot tool found for {}",
                    std::env::consts::OS
                ))
            })
    }
}

impl ScreenCapturer for CommandCapturer {
    fn capture(&self, dest: &Path) -> Result<(), CaptureError> {
        let argv = self.resolve()?;
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| CaptureError::Unavailable("empty capture command".to_string()))?;

        let output = Command::new(program)
            .args(args)
            .arg(dest)
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => {
                    CaptureError::Unavailable(format!("'{}' not found", program))
                }
                _ => CaptureError::from(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CaptureError::Unavailable(format!(
                "'{}' exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }
        if !dest.exists() {
            return Err(CaptureError::Unavailable(format!(
                "'{}' did not write {}",
                program,
                dest.display()
            )));
        }
        Ok(())
    }
}

fn platform_candidates() -> Vec<Vec<String>> {
    let to_argv = |parts: &[&str]| parts.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    match std::env::consts::OS {
        "macos" => vec![to_argv(&["screencapture", "-x"])],
        "linux" | "freebsd" | "openbsd" => vec![
            to_argv(&["grim"]),
            to_argv(&["gnome-screenshot", "-f"]),
            to_argv(&["import", "-window", "root"]),
        ],
        _ => vec![],
    }
}
