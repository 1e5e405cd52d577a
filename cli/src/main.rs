//! Fleetboot CLI - Concurrent Chef bootstrap over SSH

use std::process::ExitCode;

use clap::Parser;
use fleetboot_cli::cli::Cli;
use fleetboot_cli::domain::BootstrapError;
use fleetboot_cli::output::json::format_error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json = cli.json;
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            report_error(&e, json);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays parseable. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn report_error(e: &anyhow::Error, json: bool) {
    if json {
        let code = e
            .downcast_ref::<BootstrapError>()
            .map_or("error", BootstrapError::code);
        if let Ok(body) = format_error(&format!("{e:#}"), code) {
            println!("{body}");
            return;
        }
    }
    eprintln!("Error: {e:#}");
}
