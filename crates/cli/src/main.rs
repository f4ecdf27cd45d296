//! Babynest CLI - browse the marketplace API from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Search the catalog
//! babynest products --search wipes --sort price_asc
//!
//! # Sign in and print the bearer token
//! babynest login -e rina@example.com -p secret
//!
//! # Second page of orders (needs BABYNEST_API_TOKEN)
//! BABYNEST_API_TOKEN=... babynest orders --page 2
//! ```
//!
//! Every command prints JSON on stdout. Configuration comes from the
//! environment (see `babynest_storefront::config`); `SENTRY_DSN` enables
//! error tracking.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use babynest_core::{BabyId, ProductFilter};
use babynest_storefront::{Storefront, StorefrontConfig};
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "babynest")]
#[command(author, version, about = "Babynest marketplace client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        #[arg(long)]
        page: Option<u32>,

        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Category slug
        #[arg(long)]
        category: Option<String>,

        /// Brand slug
        #[arg(long)]
        brand: Option<String>,

        /// Sort key, e.g. `price_asc` or `latest`
        #[arg(long)]
        sort: Option<String>,
    },
    /// Show one product
    Product { slug: String },
    /// List categories
    Categories,
    /// List brands
    Brands,
    /// List your orders
    Orders {
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show one order
    Order { uuid: Uuid },
    /// Show your cart
    Cart,
    /// List your baby profiles, or show one with its pending vaccines
    Babies { id: Option<i64> },
    /// Show who is signed in
    Me,
    /// Sign in and print the bearer token
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|dsn| !dsn.is_empty())?;
    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));
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

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    // Sentry must be initialized before the tracing subscriber
    let sentry_guard = init_sentry();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "babynest_storefront=info,babynest_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            sentry_guard
                .is_some()
                .then(|| sentry_tracing::layer().event_filter(sentry_event_filter)),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    let storefront = Storefront::new(StorefrontConfig::from_env()?)?;
    let queries = storefront.queries();

    match cli.command {
        Commands::Products {
            page,
            search,
            category,
            brand,
            sort,
        } => {
            let filter = ProductFilter {
                page,
                search,
                category,
                brand,
                sort,
            };
            commands::catalog::products(queries, filter).await?;
        }
        Commands::Product { slug } => commands::catalog::product(queries, &slug).await?,
        Commands::Categories => commands::catalog::categories(queries).await?,
        Commands::Brands => commands::catalog::brands(queries).await?,
        Commands::Orders { page } => commands::account::orders(queries, page).await?,
        Commands::Order { uuid } => commands::account::order(queries, uuid).await?,
        Commands::Cart => commands::account::cart(queries).await?,
        Commands::Babies { id } => {
            commands::account::babies(queries, id.map(BabyId::new)).await?;
        }
        Commands::Me => commands::account::me(queries).await?,
        Commands::Login { email, password } => {
            commands::account::login(queries, email, password).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_products_filter() {
        let cli = Cli::parse_from(["babynest", "products", "-s", "wipes", "--page", "2"]);
        let Commands::Products { page, search, .. } = cli.command else {
            panic!("expected products command");
        };
        assert_eq!(page, Some(2));
        assert_eq!(search.as_deref(), Some("wipes"));
    }
}
