mod cli;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let filter_level = if verbose { Level::DEBUG } else { Level::INFO };

    // stdout carries only the run result
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(filter_level.into()))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::time())
        .init();
}

#[tokio::main]
async fn main() {
    match cli::Cli::try_parse() {
        Ok(cli) => {
            init_logging(cli.verbose);

            tracing::debug!("Verbose mode enabled");
            tracing::debug!("Starting scoutclaw v{}", env!("CARGO_PKG_VERSION"));

            cli::run(cli).await;
        }
        Err(e) => {
            use clap::error::ErrorKind;

            match e.kind() {
                ErrorKind::DisplayVersion | ErrorKind::DisplayHelp => {
                    e.print().ok();
                    std::process::exit(0);
                }
                ErrorKind::InvalidSubcommand => {
                    let cmd = extract_command_from_error(&e.to_string());
                    eprintln!("error: unknown command: {}", cmd);
                    eprintln!("\nValid commands are: run, version, help");
                    std::process::exit(1);
                }
                _ => {
                    e.print().ok();
                    std::process::exit(2);
                }
            }
        }
    }
}

/// Pulls the quoted command name out of "unrecognized subcommand 'x'"
fn extract_command_from_error(error_msg: &str) -> String {
    error_msg
        .split('\'')
        .nth(1)
        .filter(|cmd| !cmd.is_empty())
        .unwrap_or("unknown")
        .to_string()
}
