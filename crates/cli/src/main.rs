//! Rocket Cart CLI - A terminal front end for the cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! rcart show
//!
//! # Add one unit of product 3
//! rcart add 3
//!
//! # Set product 3 to four units
//! rcart update 3 4
//!
//! # Remove product 3
//! rcart remove 3
//! ```
//!
//! # Commands
//!
//! - `show` - Print the cart (`--json` for the persisted form)
//! - `add` - Add one unit of a product
//! - `remove` - Remove a product
//! - `update` - Set a product's quantity
//!
//! Every command prints the cart afterwards. A rejected or failed operation
//! prints its notice to stderr and exits with status 1.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rocket_cart_core::ProductId;
use rocket_cart_store::CartConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

use commands::{CartCommand, CliError};

#[derive(Parser)]
#[command(name = "rcart")]
#[command(author, version, about = "Rocket Cart command-line cart")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current cart
    Show {
        /// Print the cart as stored (JSON array of products)
        #[arg(long)]
        json: bool,
    },
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Product ID
        product_id: ProductId,

        /// New quantity (zero or less is ignored)
        #[arg(allow_hyphen_values = true)]
        amount: i64,
    },
}

impl From<Commands> for CartCommand {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Show { json } => Self::Show { json },
            Commands::Add { product_id } => Self::Add(product_id),
            Commands::Remove { product_id } => Self::Remove(product_id),
            Commands::Update { product_id, amount } => Self::Update { product_id, amount },
        }
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to warn so that cart output stays readable if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocket_cart_store=warn,rcart=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// Process exit status for a command result.
const fn exit_code(result: &Result<(), CliError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(CliError::Cart(_)) => 1,
        Err(_) => 2,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match CartConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let sentry_guard = init_sentry(&config);
    init_tracing();

    let result = commands::run(&config, cli.command.into()).await;
    match &result {
        Ok(()) => {}
        Err(CliError::Cart(e)) => {
            e.report();
            #[allow(clippy::print_stderr)]
            {
                eprintln!("{}", e.notice().message());
            }
        }
        Err(e) => tracing::error!("Command failed: {e}"),
    }
    let code = exit_code(&result);

    // Flush pending Sentry events; process::exit skips destructors
    drop(sentry_guard);
    if code != 0 {
        std::process::exit(code);
    }
}
