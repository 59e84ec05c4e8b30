//! OBD CLI - Command-line front end for the OBD2 diagnostics service
//!
//! Looks up trouble codes, lists the known codes and submits diagnosis
//! requests against a diagnostics backend.

mod commands;
mod config;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use obd_client::{ObdClient, DEFAULT_CONNECT_TIMEOUT};
use obd_core::{DiagnosisRequestDraft, DiagnosticsApi};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::commands::Reported;
use crate::config::Config;
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "obd-cli")]
#[command(author, version, about = "OBD2 Diagnostics CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// Backend URL [default: http://localhost:5000]
    #[arg(short, long, env = "OBD_SERVER")]
    server: Option<String>,

    /// Configuration file path
    #[arg(short, long, env = "OBD_CONFIG")]
    config: Option<PathBuf>,

    /// Output format [default: table]
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Seconds before an in-flight request is abandoned [default: 30]
    #[arg(short, long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up the description of an OBD2 code
    Lookup {
        /// OBD2 code (e.g., P0420)
        code: String,
    },

    /// Submit a diagnosis request
    Diagnose {
        /// Customer complaint
        #[arg(long, default_value = "")]
        complaint: String,

        /// DTC code read from the vehicle
        #[arg(long, default_value = "")]
        dtc_code: String,

        /// Related symptoms
        #[arg(long, default_value = "")]
        symptoms: String,

        /// Problem area
        #[arg(long, default_value = "")]
        problem_area: String,

        /// Write a text report of the result to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// List all known OBD2 codes
    Codes,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Already shown as a notification or a field error table
            match err.downcast_ref::<Reported>() {
                Some(reported) => debug!("Command failed: {}", reported),
                None => eprintln!("Error: {:?}", err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Load config file
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    // Merge CLI args with config
    let merged =
        config.merge_with_args(cli.server.as_deref(), cli.output, cli.no_color, cli.timeout);

    let ctx = OutputContext::new(merged.output, merged.no_color, cli.quiet);
    let api = create_client(&merged.server, merged.timeout)?;

    match cli.command {
        Commands::Lookup { code } => {
            commands::lookup(api, &code, merged.timeout, &ctx).await?;
        }

        Commands::Diagnose {
            complaint,
            dtc_code,
            symptoms,
            problem_area,
            export,
        } => {
            let draft = DiagnosisRequestDraft::new(complaint, dtc_code, symptoms, problem_area);
            commands::diagnose(api, &draft, export.as_deref(), merged.timeout, &ctx).await?;
        }

        Commands::Codes => {
            commands::codes(api, merged.timeout, &ctx).await?;
        }
    }

    Ok(())
}

/// Create a backend client for the given server URL
///
/// The transport deadline matches the controller timeout so `--timeout` is
/// the only limit on a request.
fn create_client(server: &str, timeout: Duration) -> Result<Arc<dyn DiagnosticsApi>> {
    let client = ObdClient::with_config(server, timeout, DEFAULT_CONNECT_TIMEOUT)
        .context("Failed to create OBD client")?;
    Ok(Arc::new(client))
}
