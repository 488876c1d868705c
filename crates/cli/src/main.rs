//! wpadctl - OpenWPAD command-line tools
//!
//! Decode captured controller reports, replay scripted USB sessions
//! against the engine and manage the bridge configuration file.

#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use openwpad_engine::BridgeConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::CliError;

const DEFAULT_CONFIG: &str = "openwpad.json";

#[derive(Parser, Debug)]
#[command(name = "wpadctl")]
#[command(about = "OpenWPAD tools - decode captures and replay USB controller sessions")]
#[command(version)]
struct Cli {
    /// Output in JSON format for machine parsing
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Bridge configuration file
    #[arg(long, global = true, env = "WPADCTL_CONFIG", default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode one captured input report
    Decode {
        /// Device family name, as listed by `families`
        #[arg(short, long)]
        family: String,
        /// Report bytes as hex; spaces and colons are ignored
        report: String,
    },

    /// Replay a scripted session against the mock transport
    Replay {
        /// Session file (JSON)
        session: PathBuf,
    },

    /// List the registered device families
    Families,

    /// Configuration file helpers
    Config {
        /// Write a default configuration file to this path
        #[arg(long, value_name = "PATH")]
        init: PathBuf,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// `RUST_LOG` wins, then `-v`, then the configured filter.
fn log_filter(verbose: u8, configured: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let directive = match verbose {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // a broken config file must not stop `config --init` from replacing it
    let config = match cli.command {
        Commands::Config { .. } => Ok(BridgeConfig::default()),
        _ => BridgeConfig::load(&cli.config).await,
    };
    let filter = match &config {
        Ok(config) => log_filter(cli.verbose, &config.log_filter),
        Err(_) => log_filter(cli.verbose, "warn"),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let result = match config {
        Ok(config) => execute_command(&cli, &config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }
            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn execute_command(cli: &Cli, config: &BridgeConfig) -> Result<()> {
    match &cli.command {
        Commands::Decode { family, report } => {
            commands::decode::execute(family, report, cli.json).await
        }
        Commands::Replay { session } => commands::replay::execute(session, config, cli.json).await,
        Commands::Families => commands::families::execute(config, cli.json).await,
        Commands::Config { init, force } => commands::config::init(init, *force, cli.json).await,
    }
}
