//! ReasonCare gateway CLI.
//!
//! Usage:
//!   reasoncare-demo walkthrough
//!   reasoncare-demo walkthrough --patient P001
//!   reasoncare-demo call --method PUT --path /api/ehr/P001 --body '{"allergies":["penicillin"]}'
//!   reasoncare-demo --config prod.toml call --path /api/ehr/P001

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use reasoncare::{bootstrap, init_logging, walkthrough};
use reasoncare_config::{Configuration, LoadOptions};
use reasoncare_contracts::{
    envelope::ResponseEnvelope,
    request::{Method, RequestDescriptor},
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Drive the ReasonCare clinical gateway from the command line.
#[derive(Parser)]
#[command(name = "reasoncare-demo", about = "ReasonCare clinical gateway")]
struct Cli {
    /// TOML configuration file. Defaults to ./reasoncare.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full intake-to-feedback workflow for one patient.
    Walkthrough {
        #[arg(long, default_value = "P001")]
        patient: String,
    },
    /// Send a single request through the gateway.
    Call {
        #[arg(long, default_value = "GET")]
        method: String,
        #[arg(long)]
        path: String,
        /// JSON request body.
        #[arg(long)]
        body: Option<String>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Configuration::load(LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config,
    })
    .context("loading configuration")?;
    init_logging(&config.logging);

    let app = bootstrap(config).await.context("starting gateway")?;

    // Ctrl-C abandons whatever request is in flight.
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    match cli.command {
        Command::Walkthrough { patient } => {
            println!("ReasonCare walkthrough ({} mode)", app.gateway.handler_name());
            println!();
            for outcome in walkthrough::run(&app.gateway, &patient, &cancel).await {
                println!(
                    "[{}] {} {}",
                    outcome.stage, outcome.request.method, outcome.request.path
                );
                print_envelope(&outcome.envelope)?;
                println!();
            }
        }
        Command::Call { method, path, body } => {
            let method: Method = method.parse()?;
            let mut request = RequestDescriptor::new(method, path);
            if let Some(body) = body {
                let body: Value = serde_json::from_str(&body).context("--body is not valid JSON")?;
                request = request.with_body(body);
            }
            let envelope = app.gateway.call_with_cancel(request, cancel).await;
            print_envelope(&envelope)?;
            if !envelope.success {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn print_envelope(envelope: &ResponseEnvelope) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(envelope)?);
    Ok(())
}
