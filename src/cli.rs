use std::io::Read;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

use scoutclaw::agent::{RunParameters, RunResult, execute_run};
use scoutclaw::config::load_config;
use scoutclaw::providers::Credentials;

#[derive(Parser)]
#[command(name = "scoutclaw")]
#[command(about = "scoutclaw - scheduled research agent")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the research agent on a set of instructions
    Run(RunArgs),
    /// Display version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Task instructions, or "-" to read them from stdin
    #[arg(short, long)]
    pub instructions: String,

    /// Time of the first iteration (RFC 3339), used with --interval
    #[arg(long, value_parser = parse_rfc3339)]
    pub first_run_at: Option<DateTime<Utc>>,

    /// Seconds between scheduled iterations, used with --first-run-at
    #[arg(long, requires = "first_run_at")]
    pub interval: Option<f64>,

    /// Model for the primary provider
    #[arg(short, long)]
    pub model: Option<String>,

    /// API key for the primary provider
    #[arg(long)]
    pub api_key: Option<String>,

    /// Base URL for the primary provider
    #[arg(long)]
    pub base_url: Option<String>,

    /// Highest iteration index before giving up
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

fn parse_rfc3339(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp '{}': {}", value, e))
}

fn parse_interval(seconds: f64) -> Result<Duration> {
    if !seconds.is_finite() || seconds <= 0.0 {
        anyhow::bail!("--interval must be a positive number of seconds, got {}", seconds);
    }
    Duration::try_from_secs_f64(seconds).context("--interval is out of range")
}

fn read_instructions(value: &str) -> Result<String> {
    let instructions = if value == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read instructions from stdin")?;
        buf
    } else {
        value.to_string()
    };

    if instructions.trim().is_empty() {
        anyhow::bail!("Instructions cannot be empty");
    }
    Ok(instructions)
}

impl RunArgs {
    /// Converts the flags into run parameters created at `now`
    pub fn to_parameters(&self, now: DateTime<Utc>) -> Result<RunParameters> {
        let mut params = RunParameters::new(read_instructions(&self.instructions)?, now);

        if let (Some(first_run_at), Some(interval)) = (self.first_run_at, self.interval) {
            params = params.with_schedule(first_run_at, parse_interval(interval)?);
        } else if self.first_run_at.is_some() {
            tracing::warn!("--first-run-at without --interval, running immediately");
        }

        if let Some(model) = &self.model {
            params = params.with_model(model.clone());
        }

        let credentials = Credentials {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
        };
        if !credentials.is_empty() {
            params = params.with_credentials(credentials);
        }

        Ok(params)
    }
}

pub async fn run(cli: Cli) {
    match cli.command {
        Some(Commands::Run(args)) => {
            if let Err(e) = handle_run(args).await {
                eprintln!("Error: {:#}", e);
                process::exit(1);
            }
        }
        Some(Commands::Version) => {
            print_version();
        }
        None => {
            print_help();
        }
    }
}

async fn handle_run(args: RunArgs) -> Result<()> {
    let mut config = load_config(args.config.clone())?;
    if let Some(max_iterations) = args.max_iterations {
        config.max_iterations = max_iterations;
    }

    let params = args.to_parameters(Utc::now())?;

    let outcome = tokio::select! {
        outcome = execute_run(&config, &params) => outcome,
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
            tracing::info!("Received Ctrl+C, cancelling run");
            anyhow::bail!("Run cancelled");
        }
    };

    match outcome.context("Run failed")? {
        Some(result) => print_result(&result),
        None => {
            eprintln!(
                "No final answer after {} iterations",
                u64::from(config.max_iterations) + 1
            );
            Ok(())
        }
    }
}

fn print_result(result: &RunResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("Failed to serialize run result")?;
    println!("{}", json);
    Ok(())
}

fn print_version() {
    println!("scoutclaw {}", env!("CARGO_PKG_VERSION"));
}

fn print_help() {
    println!("scoutclaw - scheduled research agent");
    println!();
    println!("Usage: scoutclaw [OPTIONS] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  run      Run the research agent on a set of instructions");
    println!("  version  Display version information");
    println!("  help     Print this message or the help of the given subcommand(s)");
    println!();
    println!("Options:");
    println!("  -v, --verbose  Enable debug logging");
    println!("  -V, --version  Print version");
    println!("  -h, --help     Print help");
}
