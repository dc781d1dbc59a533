//! Shopapp CLI - Browse the catalog, manage the cart and place orders.
//!
//! # Usage
//!
//! ```bash
//! # List products matching a keyword
//! shopapp products list --keyword phone
//!
//! # Add two units of product 5 to the cart
//! shopapp cart add 5 2
//!
//! # Log in (switches to the user's own cart)
//! SHOPAPP_PASSWORD=secret shopapp login 0912345678
//!
//! # Check out
//! shopapp orders place --fullname "Nguyen Van A" --email a@example.com \
//!     --phone 0912345678 --address "1 Le Loi"
//! ```
//!
//! # Configuration
//!
//! Read from the environment (and `.env`) by `ClientConfig::from_env`;
//! `SHOPAPP_API_BASE_URL` is required. `RUST_LOG` controls log output,
//! which goes to stderr so command output on stdout stays clean.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopapp_client::api::{OrderQuery, RegisterDto, UpdateUserDto};
use shopapp_client::state::CheckoutDetails;
use shopapp_client::{ClientConfig, Storefront};
use shopapp_core::{CategoryId, OrderId, ProductId, RoleId};

mod commands;
mod error;
mod output;

use error::CliError;

/// Role id of ordinary customer accounts.
const CUSTOMER_ROLE_ID: &str = "1";

#[derive(Parser)]
#[command(name = "shopapp")]
#[command(author, version, about = "Shopapp storefront CLI")]
struct Cli {
    /// Override the local storage file
    #[arg(long, global = true, env = "SHOPAPP_STORAGE_PATH")]
    storage_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// List categories
    Categories {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },
    /// List account roles
    Roles,
    /// Manage the cart of the current session
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Log in and switch to the user's cart
    Login {
        /// Account phone number
        phone_number: String,

        #[arg(long, env = "SHOPAPP_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long, default_value = CUSTOMER_ROLE_ID)]
        role_id: RoleId,
    },
    /// Log out and return to the guest cart
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Create an account
    Register {
        #[arg(long)]
        fullname: String,

        #[arg(long)]
        phone_number: String,

        #[arg(long, default_value = "")]
        address: String,

        #[arg(long, env = "SHOPAPP_PASSWORD", hide_env_values = true)]
        password: String,

        /// Defaults to `--password`
        #[arg(long)]
        retype_password: Option<String>,

        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        date_of_birth: NaiveDate,

        #[arg(long, default_value = CUSTOMER_ROLE_ID)]
        role_id: RoleId,
    },
    /// Update the logged-in user's profile
    Profile {
        #[arg(long)]
        fullname: String,

        #[arg(long, default_value = "")]
        address: String,

        /// New password
        #[arg(long)]
        password: Option<String>,

        #[arg(long)]
        retype_password: Option<String>,

        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        date_of_birth: Option<NaiveDate>,
    },
    /// Place and look up orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List a page of products
    List {
        #[arg(short, long)]
        keyword: Option<String>,

        #[arg(short, long)]
        category: Option<CategoryId>,

        /// Zero-based page index; defaults to the last viewed page
        #[arg(short, long, allow_negative_numbers = true)]
        page: Option<i64>,
    },
    /// Show one product
    Show { id: ProductId },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines with current prices
    Show,
    /// Add units of a product
    Add {
        id: ProductId,
        #[arg(default_value_t = 1, allow_negative_numbers = true)]
        quantity: i32,
    },
    /// Set the quantity of a line (zero removes it)
    Set {
        id: ProductId,
        #[arg(allow_negative_numbers = true)]
        quantity: i32,
    },
    /// Remove a line
    Remove { id: ProductId },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrderAction {
    /// Check out the cart
    Place {
        #[arg(long)]
        fullname: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        address: String,

        #[arg(long, default_value = "")]
        note: String,

        #[arg(long, default_value = "express")]
        shipping_method: String,

        #[arg(long, default_value = "cod")]
        payment_method: String,

        #[arg(long)]
        coupon: Option<String>,
    },
    /// Show one order
    Show { id: OrderId },
    /// Search orders
    Search {
        #[arg(short, long, default_value = "")]
        keyword: String,

        #[arg(long, default_value_t = 0)]
        page: u32,

        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
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
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopapp_client=info,shopapp_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Sentry must be initialized before the tracing subscriber
    let config = ClientConfig::from_env();
    let sentry_guard = config.as_ref().ok().and_then(init_sentry);
    init_tracing();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        e.report();
        tracing::error!("Command failed: {e}");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mut config: ClientConfig) -> Result<(), CliError> {
    if let Some(path) = cli.storage_path {
        config.storage_path = path;
    }
    let storefront = Storefront::open(config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Products { action } => match action {
            ProductAction::List {
                keyword,
                category,
                page,
            } => {
                let options = commands::catalog::ListOptions {
                    keyword,
                    category,
                    page,
                };
                commands::catalog::list(&storefront, options, &mut out).await?;
            }
            ProductAction::Show { id } => {
                commands::catalog::show(&storefront, id, &mut out).await?;
            }
        },
        Commands::Categories { page, limit } => {
            commands::catalog::categories(&storefront, page, limit, &mut out).await?;
        }
        Commands::Roles => commands::catalog::roles(&storefront, &mut out).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&storefront, &mut out).await?,
            CartAction::Add { id, quantity } => commands::cart::add(&storefront, id, quantity)?,
            CartAction::Set { id, quantity } => commands::cart::set(&storefront, id, quantity)?,
            CartAction::Remove { id } => commands::cart::remove(&storefront, id)?,
            CartAction::Clear => commands::cart::clear(&storefront)?,
        },
        Commands::Login {
            phone_number,
            password,
            role_id,
        } => {
            let password = SecretString::from(password);
            commands::account::login(&storefront, phone_number, password, role_id, &mut out)
                .await?;
        }
        Commands::Logout => commands::account::logout(&storefront)?,
        Commands::Whoami => commands::account::whoami(&storefront, &mut out)?,
        Commands::Register {
            fullname,
            phone_number,
            address,
            password,
            retype_password,
            date_of_birth,
            role_id,
        } => {
            let retype_password = retype_password.unwrap_or_else(|| password.clone());
            let dto = RegisterDto {
                fullname,
                phone_number,
                address,
                password: SecretString::from(password),
                retype_password: SecretString::from(retype_password),
                date_of_birth,
                facebook_account_id: 0,
                google_account_id: 0,
                role_id,
            };
            commands::account::register(&storefront, dto, &mut out).await?;
        }
        Commands::Profile {
            fullname,
            address,
            password,
            retype_password,
            date_of_birth,
        } => {
            let dto = UpdateUserDto {
                fullname,
                address,
                password: password.map(SecretString::from),
                retype_password: retype_password.map(SecretString::from),
                date_of_birth,
            };
            commands::account::update_profile(&storefront, dto, &mut out).await?;
        }
        Commands::Orders { action } => match action {
            OrderAction::Place {
                fullname,
                email,
                phone,
                address,
                note,
                shipping_method,
                payment_method,
                coupon,
            } => {
                let details = CheckoutDetails {
                    fullname,
                    email,
                    phone_number: phone,
                    address,
                    note,
                    shipping_method,
                    payment_method,
                    coupon_code: coupon,
                };
                commands::orders::place(&storefront, details, &mut out).await?;
            }
            OrderAction::Show { id } => {
                commands::orders::show(&storefront, id, &mut out).await?;
            }
            OrderAction::Search {
                keyword,
                page,
                limit,
            } => {
                let query = OrderQuery {
                    keyword,
                    page,
                    limit,
                };
                commands::orders::search(&storefront, query, &mut out).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cart_set_accepts_negative_quantity() {
        let cli = Cli::try_parse_from(["shopapp", "cart", "set", "4", "-1"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Cart {
                action: CartAction::Set { quantity: -1, .. }
            })
        ));
    }

    #[test]
    fn test_login_defaults_to_customer_role() {
        let cli =
            Cli::try_parse_from(["shopapp", "login", "0912345678", "--password", "pw"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Login { role_id, .. }) if role_id == RoleId::new(1)
        ));
    }
}
