// ABOUTME: Entry point for lucidia: an interactive project/settings session helper.
// ABOUTME: Parses CLI args, loads config, and runs the session on stdin/stdout.

use std::path::PathBuf;

use clap::Parser;

use lucidia::config::Config;
use lucidia::session::Session;

#[derive(Debug, Parser)]
#[command(name = "lucidia", version, about = "Project context and prompt settings helper")]
struct Cli {
    /// Workspace directory holding context.json (defaults to the current directory).
    #[arg(long)]
    workspace: Option<PathBuf>,

    /// Alternate config file instead of ~/.lucidia/config.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Take a screenshot before starting the session.
    #[arg(long)]
    screenshot: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let mut session = Session::new(cli.workspace, &config)?;

    if cli.screenshot {
        match session.capture_screen() {
            Some(path) => println!("Saved screenshot: {}", path.display()),
            None => println!(
                "Screen capture failed; see {}",
                session.log_path().display()
            ),
        }
    }

    session.start()
}
