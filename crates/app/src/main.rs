//! Storefront checkout operator CLI.

use std::{
    io::{self, Write},
    process::ExitCode,
    sync::Arc,
};

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::{error, warn};

use checkout::{accounts::AccountUuid, summary::OrderSummary};
use checkout_app::{
    cart::{CartError, CartPromotions, CartSynchronizer},
    config::AppConfig,
    context::{AppContext, AppInitError},
    handoff::HandoffError,
    observability,
    remote::RemoteError,
    session::Session,
};

/// Storefront checkout operator CLI
#[derive(Debug, Parser)]
#[command(name = "checkout", about = "Storefront checkout operator tools", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    /// Load configuration from environment and CLI arguments
    fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Price an account's cart with every item selected
    Cart {
        /// Account whose cart to load
        #[arg(long)]
        account: AccountUuid,

        /// Promotion code to apply
        #[arg(long)]
        promo: Option<String>,
    },

    /// Show the last order placed through checkout
    LastOrder,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Init(#[from] AppInitError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Handoff(#[from] HandoffError),

    #[error(transparent)]
    Summary(#[from] checkout::summary::SummaryError),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::load().unwrap_or_else(|error| error.exit());

    if let Err(error) = observability::init_subscriber(&cli.config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for subscriber errors"
        )]
        {
            eprintln!("Logging error: {error}");
        }

        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(run_error) => {
            error!("command failed: {run_error}");

            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let context = AppContext::from_config(&cli.config)?;

    match cli.command {
        Command::Cart { account, promo } => print_cart(&context, account, promo.as_deref()).await,
        Command::LastOrder => print_last_order(&context),
    }
}

async fn print_cart(
    context: &AppContext,
    account: AccountUuid,
    promo: Option<&str>,
) -> Result<(), CliError> {
    let session = Session::login(account, context.accounts.as_ref()).await?;

    let cart = CartSynchronizer::load(
        Arc::clone(&session),
        Arc::clone(&context.cart),
        Arc::clone(&context.settings),
    )
    .await?;

    cart.select_all(true);

    let mut promotions = CartPromotions::load(context.promotions.as_ref()).await?;

    if let Some(code) = promo {
        if let Err(promotion_error) = promotions.apply(code) {
            warn!("{}", promotion_error.user_message());
        }
    }

    let items = cart.selected_items();
    let totals = cart.totals(promotions.applied())?;

    OrderSummary::new(&items, totals, promotions.applied()).write_to(io::stdout().lock())?;

    session.logout();

    Ok(())
}

fn print_last_order(context: &AppContext) -> Result<(), CliError> {
    let mut out = io::stdout().lock();

    match context.handoff.last_order()? {
        Some(order) => writeln!(out, "{} placed at {}", order.order_uuid, order.placed_at)?,
        None => writeln!(out, "no order has been placed")?,
    }

    Ok(())
}
