//! Operator CLI for the Pointly top-up workflow.
//!
//! Usage:
//! ```bash
//! walletctl --as <USER_ID> request 100 --method paypal --receipt /receipts/42.png
//! walletctl --as <ADMIN_ID> approve 17
//! walletctl --as <ADMIN_ID> reject 18
//! walletctl --as <USER_ID> balance
//! walletctl --as <USER_ID> history --page 2
//! walletctl --as <USER_ID> notifications
//! ```
//!
//! The acting user's role is read from the database. Results are printed to
//! stdout as JSON; logs go to stderr. The exit code follows the error kind.

use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use pointly_core::wallet::{TopUpEngine, TopUpRequest};
use pointly_db::{PgWalletStore, UserRepository};
use pointly_shared::config::LoggingConfig;
use pointly_shared::types::{PageRequest, TransactionId, UserId};
use pointly_shared::{AppConfig, AppError};

/// walletctl - drive point top-ups from the command line
#[derive(Debug, Parser)]
#[command(name = "walletctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Acting user id
    #[arg(long = "as", env = "POINTLY_ACTOR", global = true)]
    actor: Option<UserId>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit a top-up request (customers)
    Request {
        /// Points requested
        #[arg(allow_negative_numbers = true)]
        amount: i64,
        /// Payment label, e.g. paypal or bank_transfer
        #[arg(long)]
        method: String,
        /// Reference to the uploaded receipt
        #[arg(long)]
        receipt: String,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Approve a pending top-up (admins)
    Approve {
        /// Transaction id
        transaction_id: TransactionId,
    },

    /// Reject a pending top-up (admins)
    Reject {
        /// Transaction id
        transaction_id: TransactionId,
    },

    /// Show the acting user's balance
    Balance,

    /// List the acting user's transactions, newest first
    History {
        #[command(flatten)]
        page: PageArgs,
    },

    /// List the acting user's notifications, newest first
    Notifications {
        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Debug, clap::Args)]
struct PageArgs {
    /// Page number (1-indexed)
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Items per page
    #[arg(long, default_value_t = 20)]
    per_page: u32,
}

impl From<PageArgs> for PageRequest {
    fn from(args: PageArgs) -> Self {
        Self::new(args.page, args.per_page)
    }
}

#[derive(Serialize)]
struct Requested {
    transaction_id: TransactionId,
}

#[derive(Serialize)]
struct Resolved {
    transaction_id: TransactionId,
    approved: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.downcast_ref::<AppError>().map_or(1, AppError::exit_code);
            eprintln!("error: {err:#}");
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let actor_id = cli
        .actor
        .ok_or_else(|| AppError::Validation("--as <USER_ID> is required".to_string()))?;

    let db = pointly_db::connect_with(&config.database)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("Connected to database");

    let actor = UserRepository::new(db.clone())
        .principal(actor_id)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::Unauthorized(format!("Unknown user {actor_id}")))?;

    let engine = TopUpEngine::new(PgWalletStore::new(db));

    match cli.command {
        Command::Request {
            amount,
            method,
            receipt,
            notes,
        } => {
            let transaction_id = engine
                .request_top_up(
                    &actor,
                    TopUpRequest {
                        amount,
                        payment_method: method,
                        receipt_url: receipt,
                        notes,
                    },
                )
                .await
                .map_err(AppError::from)?;
            print_json(&Requested { transaction_id })
        }
        Command::Approve { transaction_id } => {
            resolve(&engine, &actor, transaction_id, true).await
        }
        Command::Reject { transaction_id } => {
            resolve(&engine, &actor, transaction_id, false).await
        }
        Command::Balance => {
            let balance = engine.balance(&actor).await.map_err(AppError::from)?;
            print_json(&balance)
        }
        Command::History { page } => {
            let history = engine
                .transaction_history(&actor, page.into())
                .await
                .map_err(AppError::from)?;
            print_json(&history)
        }
        Command::Notifications { page } => {
            let notifications = engine
                .notifications(&actor, page.into())
                .await
                .map_err(AppError::from)?;
            print_json(&notifications)
        }
    }
}

async fn resolve(
    engine: &TopUpEngine<PgWalletStore>,
    actor: &pointly_core::wallet::Principal,
    transaction_id: TransactionId,
    approved: bool,
) -> anyhow::Result<()> {
    engine
        .resolve_top_up(actor, transaction_id, approved)
        .await
        .map_err(AppError::from)?;
    print_json(&Resolved {
        transaction_id,
        approved,
    })
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_parses() {
        let actor = UserId::new();
        let cli = Cli::try_parse_from([
            "walletctl",
            "--as",
            &actor.to_string(),
            "request",
            "100",
            "--method",
            "paypal",
            "--receipt",
            "/r/1",
        ])
        .unwrap();

        assert_eq!(cli.actor, Some(actor));
        match cli.command {
            Command::Request {
                amount,
                method,
                receipt,
                notes,
            } => {
                assert_eq!(amount, 100);
                assert_eq!(method, "paypal");
                assert_eq!(receipt, "/r/1");
                assert_eq!(notes, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_negative_amount_reaches_validation() {
        let cli = Cli::try_parse_from([
            "walletctl", "request", "-5", "--method", "paypal", "--receipt", "/r/1",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Request { amount: -5, .. }));
    }

    #[test]
    fn test_approve_takes_transaction_id() {
        let cli = Cli::try_parse_from(["walletctl", "approve", "17"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Approve {
                transaction_id: TransactionId(17)
            }
        ));
    }

    #[test]
    fn test_invalid_actor_rejected() {
        let result = Cli::try_parse_from(["walletctl", "--as", "not-a-uuid", "balance"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_page_args_are_clamped() {
        let cli =
            Cli::try_parse_from(["walletctl", "history", "--page", "0", "--per-page", "500"])
                .unwrap();
        let Command::History { page } = cli.command else {
            panic!("expected history");
        };
        let request: PageRequest = page.into();
        assert_eq!(request.page, 1);
        assert_eq!(request.per_page, 100);
    }
}
