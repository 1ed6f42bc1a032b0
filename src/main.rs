use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use disk_checker::services::acquire;
use disk_checker::utils::log;

/// Checks all physical disks via CrystalDiskInfo and prints a health report.
#[derive(Parser, Debug)]
#[command(name = "disk-checker", version, about)]
struct Args {
    /// CrystalDiskInfo installation directory (defaults to
    /// bin/crystaldiskinfo beside this executable).
    #[arg(long)]
    tool_dir: Option<PathBuf>,

    /// Emit the normalized disk records as JSON instead of the text report.
    #[arg(long)]
    json: bool,
}

fn run(args: &Args) -> Result<ExitCode> {
    match acquire::run_check(args.tool_dir.clone()) {
        Ok(outcome) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&outcome.records)?);
            } else {
                println!("{}", outcome.report.summary);
                println!();
                println!("{}", outcome.report.details);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if err.is_cancelled() => {
            eprintln!("Elevation was cancelled. Disk health check was aborted.");
            Ok(ExitCode::FAILURE)
        }
        Err(err) => {
            tracing::error!("Disk health check failed: {err}");
            match log::get_logs_dir() {
                Some(dir) => eprintln!(
                    "Disk health check failed. See the log in {} for details.",
                    dir.display()
                ),
                None => eprintln!("Disk health check failed. See the log for details."),
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = log::init_logger() {
        eprintln!("Warning: file logging unavailable: {err}");
    }

    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Disk health check failed: {err}");
            ExitCode::FAILURE
        }
    }
}
