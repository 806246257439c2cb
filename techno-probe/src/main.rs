//! techno-probe - Operator CLI for the directory and session authority
//!
//! Runs the same lookups and checks a service performs per request, so a
//! deployment can be verified from a shell.
//!
//! Exit codes: 0 resolved/allowed, 1 denied, 2 unreachable.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use techno_common::{CallContext, ServiceAccess, ServiceProfile, SessionContract, TechnoConfig, Verdict};

const EXIT_DENIED: u8 = 1;
const EXIT_UNREACHABLE: u8 = 2;

/// Command-line arguments for techno-probe
#[derive(Parser, Debug)]
#[command(name = "techno-probe")]
#[command(about = "Resolve services and check tokens against the techno authority")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "TECHNO_CONFIG")]
    config: Option<PathBuf>,

    /// Directory host, overrides configuration
    #[arg(long)]
    directory_host: Option<String>,

    /// Region appended to lookups, overrides configuration
    #[arg(long)]
    region: Option<String>,

    /// Session contract (raw_bool or envelope), overrides configuration
    #[arg(long)]
    contract: Option<SessionContract>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print where a service lives
    Resolve {
        service: String,
    },
    /// Check an end-user session token
    CheckToken {
        token: String,
    },
    /// Check a token and action on behalf of this service
    CheckService {
        token: String,
        profile: String,
        action: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr; stdout carries results only
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    info!("Starting techno-probe v{}", env!("CARGO_PKG_VERSION"));

    let mut config =
        TechnoConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(host) = args.directory_host {
        config.directory.host = host;
    }
    if let Some(region) = args.region {
        config.region = region;
    }
    if let Some(contract) = args.contract {
        config.session_contract = contract;
    }

    let access = ServiceAccess::from_config(&config).context("Invalid configuration")?;
    let ctx = CallContext::new("techno-probe");

    match args.command {
        Command::Resolve { service } => {
            match access
                .resolver()
                .resolve(&ctx, &service, config.region())
                .await
            {
                Ok(target) => {
                    println!("{}", serde_json::to_string_pretty(&target)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("{}: {}", err.diagnostic(), err);
                    Ok(ExitCode::from(EXIT_UNREACHABLE))
                }
            }
        }
        Command::CheckToken { token } => {
            let verdict = access.check_session(&ctx, &token).await;
            Ok(report(verdict))
        }
        Command::CheckService {
            token,
            profile,
            action,
        } => {
            let profile = ServiceProfile::new(profile, action);
            let verdict = access.check_service(&ctx, &token, &profile).await;
            Ok(report(verdict))
        }
    }
}

/// Exit status for a verdict
fn verdict_code(verdict: &Verdict) -> u8 {
    match verdict {
        Verdict::Allowed => 0,
        Verdict::Denied => EXIT_DENIED,
        Verdict::Unreachable(_) => EXIT_UNREACHABLE,
    }
}

fn report(verdict: Verdict) -> ExitCode {
    let code = verdict_code(&verdict);
    match &verdict {
        Verdict::Allowed => println!("allowed"),
        Verdict::Denied => println!("denied"),
        Verdict::Unreachable(err) => {
            println!("unreachable");
            eprintln!("{}: {}", err.diagnostic(), err);
        }
    }
    ExitCode::from(code)
}
