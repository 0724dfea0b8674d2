//! CLI entry point for the dutchbook planner.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use log::info;

use dutchbook_planner::audit::{self, AuditLog};
use dutchbook_planner::config::Config;
use dutchbook_planner::error::{Error, Result};
use dutchbook_planner::plan;
use dutchbook_planner::snapshot::Snapshot;

#[derive(Parser)]
#[command(name = "planner")]
#[command(about = "Basket target planner: snapshot -> dutchbook rebalance plan")]
#[command(version)]
struct Cli {
    /// Path to config.toml
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute a rebalance plan from a snapshot
    Plan {
        /// Path to snapshot.json
        snapshot: PathBuf,

        /// Write the plan JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the plan without touching the audit trail
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate a snapshot without planning
    Check {
        /// Path to snapshot.json
        snapshot: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Plan {
            snapshot,
            output,
            dry_run,
        } => run_plan(&config, &snapshot, output.as_deref(), dry_run),
        Command::Check { snapshot } => run_check(&snapshot),
    };

    if let Err(e) = result {
        match &e {
            Error::NonConvergence { .. } => {
                eprintln!("\nAborted: {e}");
                process::exit(2);
            }
            _ => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }
}

fn run_plan(
    config: &Config,
    snapshot_path: &std::path::Path,
    output: Option<&std::path::Path>,
    dry_run: bool,
) -> Result<()> {
    let snapshot = Snapshot::load(snapshot_path)?;
    let plan = plan::plan(&snapshot, &config.planner)?;
    info!(
        "planned {} trade(s) over {:.2} of basket value",
        plan.trades.len(),
        plan.total_value
    );

    if !dry_run {
        let mut log = AuditLog::open(&config.audit_path())?;
        audit::log_plan_started(&mut log, &snapshot_path.display().to_string())?;
        audit::log_trades(&mut log, &plan)?;
        audit::log_plan_completed(&mut log, &plan)?;
    }

    let json = serde_json::to_string_pretty(&plan.to_json())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    match output {
        Some(path) if !dry_run => std::fs::write(path, json)?,
        _ => println!("{json}"),
    }
    Ok(())
}

fn run_check(snapshot_path: &std::path::Path) -> Result<()> {
    let snapshot = Snapshot::load(snapshot_path)?;
    println!(
        "snapshot ok: {} asset(s), {} target(s), total value {:.2}",
        snapshot.assets.len(),
        snapshot.targets.len(),
        snapshot.total_value()
    );
    Ok(())
}
