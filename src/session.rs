// ABOUTME: Session controller: owns the workspace paths, log, and context document.
// ABOUTME: Runs the welcome/project-setup/command-loop flow over line-oriented I/O.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;
use tracing::{error, info, warn};

use crate::capture::{
    CaptureError, CommandCapturer, SCREENSHOT_DIR_NAME, ScreenCapturer, screenshot_filename,
};
use crate::command::{Command, parse_command};
use crate::config::Config;
use crate::context::ContextDocument;
use crate::context::persistence::{context_path, load_or_create, save_context_to};
use crate::logging::{SessionLog, log_path};

const WELCOME_BANNER: &str = "\x1b[32m=== Welcome to Lucidia Open Prompter for Windsurf! ===\x1b[0m";
const COMING_SOON: &str =
    "\x1b[31m(Coming soon: cursor tracking, local vision, and multi-agent coder version)\x1b[0m";
const PROJECT_PROMPT: &str = "Please provide project details or press Enter to start a new project:";
const COMMAND_PROMPT: &str = "\nEnter command (or 'exit' to quit): ";

/// Example commands shown before the loop. Display only; parsing is generic.
const HELP_LINES: [&str; 6] = [
    "- adjust_screenshot_time <seconds>",
    "- adjust_context_gathering <standard|deep|shallow>",
    "- adjust_AI_prompt_style <default|creative|technical>",
    "- adjust_prompting_length <short|medium|long>",
    "- adjust_prompt_depth <standard|detailed|minimal>",
    "- enable_custom_prompt_indexing <path>",
];

/// A single interactive session bound to one workspace directory.
pub struct Session {
    workspace_dir: PathBuf,
    context_path: PathBuf,
    context: ContextDocument,
    capturer: Box<dyn ScreenCapturer>,
    log: SessionLog,
}

impl Session {
    /// Open a session on `workspace_dir` (the current directory if `None`).
    ///
    /// Starts the diagnostic log, then loads `context.json` or writes the
    /// default document if there is none. A malformed document is an error.
    pub fn new(workspace_dir: Option<PathBuf>, config: &Config) -> anyhow::Result<Self> {
        let workspace_dir = match workspace_dir {
            Some(dir) => dir,
            None => std::env::current_dir().context("failed to resolve current directory")?,
        };
        let context_path = context_path(&workspace_dir);
        let log = SessionLog::open(&log_path(&workspace_dir), &config.logging.level)?;
        let context = load_or_create(&context_path)?;
        let capturer = CommandCapturer::from_config(config.screenshot.command.clone());

        Ok(Self {
            workspace_dir,
            context_path,
            context,
            capturer: Box::new(capturer),
            log,
        })
    }

    /// Replace the screen capture backend.
    pub fn with_capturer(mut self, capturer: impl ScreenCapturer + 'static) -> Self {
        self.capturer = Box::new(capturer);
        self
    }

    pub fn workspace_dir(&self) -> &Path {
        &self.workspace_dir
    }

    pub fn context_path(&self) -> &Path {
        &self.context_path
    }

    pub fn log_path(&self) -> &Path {
        &self.log.path
    }

    pub fn context(&self) -> &ContextDocument {
        &self.context
    }

    /// Overwrite `context.json` with the in-memory document.
    pub fn save_context(&self) -> anyhow::Result<()> {
        save_context_to(&self.context_path, &self.context)
    }

    /// Capture the screen into `screenshots/` and record it as the last screenshot.
    ///
    /// The document is only touched once the image is on disk.
    pub fn try_capture_screen(&mut self) -> Result<PathBuf, CaptureError> {
        let dir = self.workspace_dir.join(SCREENSHOT_DIR_NAME);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(screenshot_filename(Local::now()));

        self.capturer.capture(&path)?;

        let previous = self
            .context
            .set_last_screenshot(Some(path.to_string_lossy().to_string()))
            .map_err(|e| CaptureError::Io(io::Error::other(e)))?;
        if let Err(e) = self.save_context() {
            self.context.restore_last_screenshot(previous);
            return Err(CaptureError::Io(io::Error::other(format!("{e:#}"))));
        }
        Ok(path)
    }

    /// Like [`Session::try_capture_screen`], but logs failures and returns `None`.
    pub fn capture_screen(&mut self) -> Option<PathBuf> {
        match self.try_capture_screen() {
            Ok(path) => Some(path),
            Err(e) => {
                error!("Screen capture failed: {}", e);
                None
            }
        }
    }

    /// Print the colored banner and the project prompt.
    pub fn display_welcome(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "{}", WELCOME_BANNER)?;
        writeln!(out, "{}", COMING_SOON)?;
        writeln!(out, "\n{}", PROJECT_PROMPT)?;
        out.flush()
    }

    /// Overwrite an existing setting and persist the document.
    ///
    /// Returns `Ok(false)` without touching anything when `name` is not a
    /// known setting.
    pub fn adjust_setting(&mut self, name: &str, value: &str) -> anyhow::Result<bool> {
        let Some(current) = self.context.setting(name) else {
            return Ok(false);
        };
        let (next, kept_kind) = current.coerce_from(value);
        if !kept_kind {
            warn!("Setting '{}' is numeric; storing '{}' as text", name, value);
        }
        self.context.replace_setting(name, next);
        self.save_context()?;
        info!("Setting '{}' updated to: {}", name, value);
        Ok(true)
    }

    /// Create `<workspace>/<name>` and make it the active project.
    pub fn create_project(&mut self, name: &str) -> anyhow::Result<PathBuf> {
        let project_dir = self.workspace_dir.join(name);
        std::fs::create_dir_all(&project_dir)
            .with_context(|| format!("failed to create {}", project_dir.display()))?;
        self.context.set_project_directory(project_dir.to_string_lossy());
        self.context.set_active(true);
        self.save_context()?;
        info!("Created project directory: {}", project_dir.display());
        Ok(project_dir)
    }

    /// Run the interactive flow on stdin/stdout.
    pub fn start(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(&mut stdin.lock(), &mut stdout.lock())
    }

    /// Run the interactive flow on arbitrary line-oriented I/O.
    ///
    /// End of input counts as a blank answer during setup and as `exit` in
    /// the command loop.
    pub fn run_with(
        &mut self,
        input: &mut impl BufRead,
        out: &mut impl Write,
    ) -> anyhow::Result<()> {
        self.display_welcome(out)?;
        let project_input = read_line(input)?.unwrap_or_default();

        if project_input.trim().is_empty() && !self.setup_project(input, out)? {
            return Ok(());
        }

        writeln!(out, "\nMEGAPrompter Message:")?;
        writeln!(out, "Available commands:")?;
        for line in HELP_LINES {
            writeln!(out, "{}", line)?;
        }

        loop {
            write!(out, "{}", COMMAND_PROMPT)?;
            out.flush()?;
            let Some(line) = read_line(input)? else {
                break;
            };

            match parse_command(&line) {
                Command::Exit => break,
                Command::Adjust { name, value } => match self.adjust_setting(&name, &value) {
                    Ok(true) => writeln!(out, "Successfully updated {}", name)?,
                    Ok(false) => writeln!(out, "Unknown setting: {}", name)?,
                    Err(e) => {
                        error!("Command execution failed: {:#}", e);
                        writeln!(out, "Error executing command: {:#}", e)?;
                    }
                },
                Command::Invalid => {
                    writeln!(out, "Invalid command format. Use: setting_name value")?
                }
            }
        }
        Ok(())
    }

    /// Ask whether to create a project. Returns false if the user declined.
    fn setup_project(
        &mut self,
        input: &mut impl BufRead,
        out: &mut impl Write,
    ) -> anyhow::Result<bool> {
        writeln!(out, "Would you like to create a new project? (y/n)")?;
        out.flush()?;
        let answer = read_line(input)?.unwrap_or_default();
        if !answer.to_lowercase().starts_with('y') {
            writeln!(out, "Operation cancelled.")?;
            return Ok(false);
        }

        writeln!(out, "Enter project name:")?;
        out.flush()?;
        let name = read_line(input)?.unwrap_or_default();
        let project_dir = self.create_project(name.trim())?;
        writeln!(out, "Created project directory: {}", project_dir.display())?;
        Ok(true)
    }
}

/// Read one line without its terminator. `None` at end of input.
fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    let trimmed_len = buf.trim_end_matches(['\n', '\r']).len();
    buf.truncate(trimmed_len);
    Ok(Some(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn open(dir: &Path) -> Session {
        Session::new(Some(dir.to_path_buf()), &Config::default()).unwrap()
    }

    #[test]
    fn read_line_strips_terminators_only() {
        let mut input = Cursor::new(" y \r\nnext\n");
        assert_eq!(read_line(&mut input).unwrap(), Some(" y ".to_string()));
        assert_eq!(read_line(&mut input).unwrap(), Some("next".to_string()));
        assert_eq!(read_line(&mut input).unwrap(), None);
    }

    #[test]
    fn welcome_has_colored_lines_and_prompt() {
        let tmp = tempfile::tempdir().unwrap();
        let session = open(tmp.path());
        let mut out = Vec::new();
        session.display_welcome(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("\x1b[32m=== Welcome to Lucidia Open Prompter"));
        assert!(text.contains("\x1b[31m(Coming soon"));
        assert!(text.ends_with("press Enter to start a new project:\n"));
    }

    #[test]
    fn welcome_does_not_touch_the_document() {
        let tmp = tempfile::tempdir().unwrap();
        let session = open(tmp.path());
        let before = std::fs::read_to_string(session.context_path()).unwrap();
        session.display_welcome(&mut Vec::new()).unwrap();
        let after = std::fs::read_to_string(session.context_path()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn numeric_setting_adjustment_stays_numeric() {
        let tmp = tempfile::tempdir().unwrap();
        let mut session = open(tmp.path());
        assert!(session.adjust_setting("screenshot_time", "2.5").unwrap());
        assert_eq!(session.context().setting("screenshot_time").unwrap().as_f64(), Some(2.5));
    }

    #[test]
    fn declining_project_skips_command_loop() {
        let tmp = tempfile::tempdir().unwrap();
        let mut session = open(tmp.path());
        let mut input = Cursor::new("\nn\nprompt_style creative\n");
        let mut out = Vec::new();
        session.run_with(&mut input, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Operation cancelled."));
        assert!(!text.contains("Available commands:"));
        assert_eq!(session.context().setting("prompt_style").unwrap().as_str(), Some("default"));
    }

    #[test]
    fn yes_answer_is_a_case_insensitive_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        let mut session = open(tmp.path());
        let mut input = Cursor::new("\nYES please\ndemo\nexit\n");
        session.run_with(&mut input, &mut Vec::new()).unwrap();
        assert!(session.context().active());
        assert!(tmp.path().join("demo").is_dir());
    }

    #[test]
    fn eof_during_setup_cancels() {
        let tmp = tempfile::tempdir().unwrap();
        let mut session = open(tmp.path());
        let mut out = Vec::new();
        session.run_with(&mut Cursor::new(""), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Operation cancelled."));
    }

    #[test]
    fn eof_in_command_loop_ends_the_session() {
        let tmp = tempfile::tempdir().unwrap();
        let mut session = open(tmp.path());
        let mut input = Cursor::new("my project details\nprompt_depth detailed\n");
        session.run_with(&mut input, &mut Vec::new()).unwrap();
        assert_eq!(session.context().setting("prompt_depth").unwrap().as_str(), Some("detailed"));
    }
}
