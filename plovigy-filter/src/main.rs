//! plovigy-filter - Main entry point
//!
//! Terminal tool for coding discard modes in PLOVIGY jsonl story files.
//!
//! Keys during a session:
//! - `0`-`9`: write the record with that category's mode
//! - `+` / space: skip the record
//! - `Q`: quit; the next session resumes at the current record

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use plovigy_common::config::{CliOverrides, Settings, ENV_CODER, ENV_CONFIG, ENV_LEDGER};
use plovigy_common::logging::init_logging;
use plovigy_filter::session::resolve_start;
use plovigy_filter::terminal::TerminalConsole;
use plovigy_filter::{FilterConfig, SessionController};
use tracing::{info, warn};

/// Command-line arguments for plovigy-filter
#[derive(Parser, Debug)]
#[command(name = "plovigy-filter")]
#[command(about = "Interactive discard-mode coding of PLOVIGY jsonl story files")]
#[command(version)]
struct Args {
    /// Story file to code (required)
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    file: PathBuf,

    /// Coder identification written into each coded record
    #[arg(short, long, env = ENV_CODER)]
    coder: Option<String>,

    /// Autocoding phrase-list file
    #[arg(short, long, value_name = "FILE")]
    autocode: Option<PathBuf>,

    /// Position ledger file
    #[arg(long, value_name = "FILE", env = ENV_LEDGER)]
    ledger: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE", env = ENV_CONFIG)]
    config: Option<PathBuf>,

    /// Restart a fully coded file without asking
    #[arg(short, long)]
    yes: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Environment values arrive through clap's `env`, so they are already
    // folded into the command-line overrides here
    let overrides = CliOverrides {
        config_path: args.config.clone(),
        coder: args.coder.clone(),
        ledger_path: args.ledger.clone(),
    };
    let settings = Settings::load(&overrides).context("Failed to load configuration")?;
    let log_handle = init_logging(&settings.logging).context("Failed to initialize logging")?;

    info!(
        "Starting plovigy-filter v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    settings.log_source();

    let config = FilterConfig::new(args.file, args.autocode, &settings)?;
    let corpus_name = config.corpus_name.clone();
    let controller = SessionController::new(config)?;
    let point = controller
        .resume_point()
        .context("Cannot determine where to resume")?;

    let assume_yes = args.yes;
    let start = resolve_start(point, || {
        println!("All records in {} have been coded", corpus_name);
        if assume_yes {
            return Ok(true);
        }
        Ok(ask_yes_no("Do you want to restart at the beginning of the file? (Y/N) -->")?)
    })?;
    let Some(start) = start else {
        println!("Please select another file: exiting program");
        return Ok(());
    };

    if start == 0 {
        println!("Restarting at the beginning of {}", corpus_name);
    } else {
        println!("Resuming {} at record {}", corpus_name, start);
    }
    wait_for_return("Press return to start...")?;

    // stderr shares the screen with the session; keep only warnings there
    if let Err(e) = log_handle.quiet_stderr() {
        warn!("{}", e);
    }
    let mut console = TerminalConsole::enter().context("Failed to open terminal")?;
    let result = controller.run(start, &mut console);
    if let Err(e) = console.leave() {
        warn!("Failed to restore terminal: {}", e);
    }
    if let Err(e) = log_handle.restore() {
        warn!("{}", e);
    }
    let summary = result?;

    let c = summary.counters;
    println!(
        "accept:{:3}  reject:{:3}  auto:{:3}  total:{:3}",
        c.accepted,
        c.skipped,
        c.autocoded,
        c.total()
    );
    println!("Labelled records: {}", summary.output.display());
    println!("Finished");
    Ok(())
}

/// Line-mode yes/no question; anything but `y`/`Y` is no
fn ask_yes_no(question: &str) -> io::Result<bool> {
    print!("{}", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y"))
}

fn wait_for_return(message: &str) -> io::Result<()> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}
