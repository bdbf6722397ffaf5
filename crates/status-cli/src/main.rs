//! slist - VC status list client
//!
//! Originates, resolves, and updates status list Managers held on a local
//! ledger persisted to a JSON file.

mod store;

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use credibil_status::local::LocalLedger;
use credibil_status::provider::Confirmation;
use credibil_status::validate;
use credibil_status::{Originated, RevocationList, StatusList, StatusPurpose};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// slist - VC status list client
#[derive(Parser, Debug)]
#[command(name = "slist")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the ledger store
    #[arg(long, env = "STATUS_LEDGER", default_value = "ledger.json")]
    ledger: PathBuf,

    /// Account address signing operations
    #[arg(long, env = "STATUS_SIGNER")]
    signer: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deploy a new Status List 2021 Manager
    Originate {
        /// Purpose of the list
        #[arg(long, default_value = "revocation")]
        purpose: StatusPurpose,

        /// List length in bytes
        #[arg(long)]
        size: Option<usize>,
    },

    /// Print the status list credential of a Manager
    Resolve {
        /// Manager id (slist://KT1...)
        manager: String,
    },

    /// Revoke the credentials read from stdin
    Revoke,

    /// Suspend the credentials read from stdin
    Suspend,

    /// Lift the suspension of the credentials read from stdin
    Unsuspend,

    /// Check whether the credential read from stdin is revoked
    IsRevoked,

    /// Check whether the credential read from stdin is suspended
    IsSuspended,

    /// Validate the status entry of the credential read from stdin
    Validate,

    /// Revocation List 2020 Managers
    #[command(subcommand)]
    Legacy(Legacy),
}

#[derive(Subcommand, Debug)]
enum Legacy {
    /// Deploy a new Revocation List 2020 Manager
    Originate,

    /// Print the revocation list credential of a Manager
    Resolve {
        /// Manager id (rlist://KT1...)
        manager: String,
    },

    /// Revoke the credential read from stdin
    Revoke,

    /// Reinstate the credential read from stdin
    Unrevoke,

    /// Check whether the credential read from stdin is revoked
    IsRevoked,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_level.clone().into());
    tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).init();

    let ledger = store::load(&cli.ledger)?;
    let outcome = run(&cli, ledger.clone()).await;

    // persist whatever was confirmed, even if a later step failed
    store::save(&cli.ledger, &ledger)?;
    outcome
}

async fn run(cli: &Cli, ledger: LocalLedger) -> Result<()> {
    let status_list = StatusList::new(ledger.clone());

    match &cli.command {
        Commands::Originate { purpose, size } => {
            let originated = status_list.originate(signer(cli)?, *purpose, *size).await?;
            print_originated(&originated);
        }
        Commands::Resolve { manager } => {
            let credential = status_list.resolve(manager).await?;
            println!("{}", serde_json::to_string_pretty(&credential)?);
        }
        Commands::Revoke => {
            let confirmation = status_list.revoke(signer(cli)?, &read_vcs()?).await?;
            print_confirmation(&confirmation);
        }
        Commands::Suspend => {
            let confirmation = status_list.suspend(signer(cli)?, &read_vcs()?).await?;
            print_confirmation(&confirmation);
        }
        Commands::Unsuspend => {
            let confirmation = status_list.unsuspend(signer(cli)?, &read_vcs()?).await?;
            print_confirmation(&confirmation);
        }
        Commands::IsRevoked => {
            println!("{}", status_list.is_revoked(&read_vc()?).await?);
        }
        Commands::IsSuspended => {
            println!("{}", status_list.is_suspended(&read_vc()?).await?);
        }
        Commands::Validate => {
            let status = validate::credential_status(&read_vc()?)?;
            println!("address: {}", status.address);
            println!("index: {}", status.index);
            if let Some(purpose) = status.purpose {
                println!("purpose: {purpose}");
            }
        }
        Commands::Legacy(legacy) => legacy_run(cli, legacy, ledger).await?,
    }

    Ok(())
}

async fn legacy_run(cli: &Cli, legacy: &Legacy, ledger: LocalLedger) -> Result<()> {
    let revocation_list = RevocationList::new(ledger);

    match legacy {
        Legacy::Originate => {
            let originated = revocation_list.originate(signer(cli)?).await?;
            print_originated(&originated);
        }
        Legacy::Resolve { manager } => {
            let credential = revocation_list.resolve(manager).await?;
            println!("{}", serde_json::to_string_pretty(&credential)?);
        }
        Legacy::Revoke => {
            let confirmation = revocation_list.revoke(signer(cli)?, &read_vc()?).await?;
            print_confirmation(&confirmation);
        }
        Legacy::Unrevoke => {
            let confirmation = revocation_list.unrevoke(signer(cli)?, &read_vc()?).await?;
            print_confirmation(&confirmation);
        }
        Legacy::IsRevoked => {
            println!("{}", revocation_list.is_revoked(&read_vc()?).await?);
        }
    }

    Ok(())
}

fn signer(cli: &Cli) -> Result<&str> {
    cli.signer.as_deref().context("--signer (or STATUS_SIGNER) is required")
}

fn read_stdin() -> Result<Value> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input).context("reading stdin")?;
    serde_json::from_str(&input).context("stdin is not valid JSON")
}

// One credential, or an array of credentials.
fn read_vcs() -> Result<Vec<Value>> {
    match read_stdin()? {
        Value::Array(vcs) => Ok(vcs),
        vc => Ok(vec![vc]),
    }
}

fn read_vc() -> Result<Value> {
    let vc = read_stdin()?;
    if vc.is_array() {
        bail!("expected a single credential");
    }
    Ok(vc)
}

fn print_originated(originated: &Originated) {
    print_confirmation(&originated.confirmation);
    println!("Manager: {}", originated.id);
    println!("Issuer: {}", originated.issuer);
}

fn print_confirmation(confirmation: &Confirmation) {
    println!("{confirmation}");
}
