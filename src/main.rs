use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use walkthrough::app::App;
use walkthrough::clock::{Clock, SystemClock};
use walkthrough::config::Config;
use walkthrough::definition::{self, LoadedWalkthrough};
use walkthrough::logging;
use walkthrough::runner::{spawn_stdin_reader, Runner};

#[derive(Parser)]
#[command(name = "walkthrough")]
#[command(about = "Step-gated tutorial walkthroughs in the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Walkthrough authoring file for the menu (defaults to paths.walkthrough)
    #[arg(short, long)]
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a walkthrough headless, reading commands from stdin
    Run {
        /// Walkthrough authoring file (defaults to paths.walkthrough)
        file: Option<PathBuf>,
    },

    /// Load a walkthrough file and print its steps
    Validate {
        /// Walkthrough authoring file (defaults to paths.walkthrough)
        file: Option<PathBuf>,

        /// Fail if any step references an unknown scene object
        #[arg(long)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let is_tui_mode = cli.command.is_none();
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        Some(Commands::Run { file }) => {
            cmd_run(&config, file.as_deref()).await?;
        }
        Some(Commands::Validate { file, strict }) => {
            cmd_validate(&config, file.as_deref(), strict)?;
        }
        None => {
            run_tui(config, cli.file.as_deref(), logging_handle.log_file_path)?;
        }
    }

    Ok(())
}

fn load(config: &Config, file: Option<&Path>) -> Result<LoadedWalkthrough> {
    let Some(path) = config.walkthrough_path(file) else {
        bail!("No walkthrough file given; pass one or set paths.walkthrough in config");
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    definition::load_file(&path, clock)
        .with_context(|| format!("Failed to load walkthrough from {}", path.display()))
}

fn run_tui(config: Config, file: Option<&Path>, log_file_path: Option<PathBuf>) -> Result<()> {
    let loaded = load(&config, file)?;
    let mut app = App::new(config, loaded);
    let result = app.run();

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    result
}

async fn cmd_run(config: &Config, file: Option<&Path>) -> Result<()> {
    let loaded = load(config, file)?;
    for missing in &loaded.unresolved {
        eprintln!("warning: {}", missing);
    }

    let (tx, rx) = mpsc::unbounded_channel();
    // Detached: a read still pending on exit is dropped with the process
    spawn_stdin_reader(tx);

    let runner = Runner::new(loaded, Duration::from_millis(config.runner.tick_rate_ms));
    runner.run(rx).await
}

fn cmd_validate(config: &Config, file: Option<&Path>, strict: bool) -> Result<()> {
    let loaded = load(config, file)?;
    let walkthrough = &loaded.walkthrough;

    println!("{} ({} steps)", walkthrough.name(), walkthrough.len());
    println!("{}", "─".repeat(60));

    for (index, step) in walkthrough.steps().iter().enumerate() {
        let kinds: Vec<String> = step.trigger_kinds().iter().map(ToString::to_string).collect();
        let mut flags = Vec::new();
        if step.blocks_until_complete() {
            flags.push("blocking");
        }
        if !step.auto_progresses() {
            flags.push("manual");
        }

        println!(
            "{:>3}. {}{}",
            index,
            step.name(),
            if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            }
        );
        if kinds.is_empty() {
            println!("     triggers: none");
        } else {
            println!("     triggers: {}", kinds.join(", "));
        }
    }

    if loaded.unresolved.is_empty() {
        println!("\nAll references resolved");
        return Ok(());
    }

    println!("\nUnresolved references ({}):", loaded.unresolved.len());
    for missing in &loaded.unresolved {
        println!("  {}", missing);
    }

    if strict {
        bail!("{} unresolved reference(s)", loaded.unresolved.len());
    }
    Ok(())
}
