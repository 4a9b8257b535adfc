//! TeaMall CLI - drive the storefront client from a terminal.
//!
//! Session and cart are kept in the file store (`TEAMALL_STORE_PATH`), so
//! they survive between invocations the same way they survive a page reload.
//!
//! # Usage
//!
//! ```bash
//! # Sign in and check the session
//! teamall login -e buyer@example.com -p secret
//! teamall whoami
//!
//! # Local cart
//! teamall cart add 12 --spec 250g --price 68 -q 2
//! teamall cart list
//!
//! # See where the guard sends you
//! teamall navigate /admin/products
//! ```
//!
//! # Environment Variables
//!
//! - `TEAMALL_API_BASE_URL` - Backend base URL (default `http://localhost:8080/api`)
//! - `TEAMALL_TIMEOUT_SECS` - Request timeout (default 15)
//! - `TEAMALL_STORE_PATH` - Persistent store file (default `.teamall/storage.json`)
//! - `RUST_LOG` - Log filter (default `teamall_client=info,teamall_cli=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use teamall_client::notify::RecordingNotifier;
use teamall_client::storage::FileStore;
use teamall_client::{ClientConfig, Storefront};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "teamall")]
#[command(author, version, about = "TeaMall storefront client")]
struct Cli {
    /// Persistent store file (overrides `TEAMALL_STORE_PATH`)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and keep the session in the store
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Verify the stored session with the backend and show the profile
    Whoami,
    /// Work with the locally persisted cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Run the navigation guard for a path and print where it lands
    Navigate {
        /// Path with optional query, e.g. `/cart` or `/orders?page=2`
        path: String,
    },
    /// List or search the catalog
    Products {
        #[arg(short, long)]
        keyword: Option<String>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and totals
    List,
    /// Add a line, merging with an existing line of the same product and spec
    Add {
        id: i64,

        #[arg(short, long, default_value = "")]
        spec: String,

        #[arg(short, long, default_value = "1")]
        quantity: NonZeroU32,

        /// Unit price
        #[arg(long)]
        price: Decimal,

        #[arg(long)]
        name: Option<String>,
    },
    /// Remove a line
    Remove {
        id: i64,

        #[arg(short, long, default_value = "")]
        spec: String,
    },
    /// Set a line's quantity
    Qty {
        id: i64,

        #[arg(short, long, default_value = "")]
        spec: String,

        quantity: NonZeroU32,
    },
    /// Tick or untick a line for checkout
    Select {
        id: i64,

        #[arg(short, long, default_value = "")]
        spec: String,

        /// Untick instead of tick
        #[arg(long)]
        off: bool,
    },
    /// Remove every line
    Clear,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("teamall_client=info,teamall_cli=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let notifier = Arc::new(RecordingNotifier::new());
    let result = run(cli, notifier.clone()).await;

    for notice in notifier.take() {
        output::notice(&notice);
    }

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, notifier: Arc<RecordingNotifier>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ClientConfig::from_env()?;
    if let Some(path) = cli.store {
        config = config.with_store_path(path);
    }

    let store = Arc::new(FileStore::open(&config.store_path)?);
    let shop = Storefront::new(config, store, notifier)?;

    match cli.command {
        Commands::Login { email, password } => commands::auth::login(&shop, &email, password).await?,
        Commands::Logout => commands::auth::logout(&shop).await?,
        Commands::Whoami => commands::auth::whoami(&shop).await?,
        Commands::Cart { action } => match action {
            CartAction::List => commands::cart::list(&shop),
            CartAction::Add {
                id,
                spec,
                quantity,
                price,
                name,
            } => commands::cart::add(&shop, id, spec, quantity, price, name),
            CartAction::Remove { id, spec } => commands::cart::remove(&shop, id, &spec),
            CartAction::Qty { id, spec, quantity } => {
                commands::cart::set_quantity(&shop, id, &spec, quantity)?;
            }
            CartAction::Select { id, spec, off } => {
                commands::cart::select(&shop, id, &spec, !off)?;
            }
            CartAction::Clear => commands::cart::clear(&shop),
        },
        Commands::Navigate { path } => commands::browse::navigate(&shop, &path)?,
        Commands::Products { keyword } => {
            commands::browse::products(&shop, keyword.as_deref()).await?;
        }
    }
    Ok(())
}
