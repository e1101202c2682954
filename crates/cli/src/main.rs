//! DevMart CLI - storefront and admin console.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the token is kept in the state directory)
//! devmart login -e ana@example.com -p hunter22
//!
//! # Browse and shop
//! devmart products list
//! devmart cart add 7
//! devmart cart set 7 3
//! devmart checkout
//!
//! # Order history
//! devmart orders list
//! devmart orders cancel 12
//!
//! # Admin console
//! devmart admin dashboard
//! devmart admin orders status 12 shipped
//! ```
//!
//! # Environment Variables
//!
//! See `devmart_storefront::config` for `DEVMART_*` and `SENTRY_*`.
//! `RUST_LOG` overrides the default log filter.

#![cfg_attr(not(test), forbid(unsafe_code))]
// A CLI's output is its interface.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use devmart_core::{CategoryId, OrderId, OrderStatus, ProductId};
use devmart_storefront::config::StorefrontConfig;
use devmart_storefront::error::AppError;
use devmart_storefront::state::AppState;

mod commands;

#[derive(Parser)]
#[command(name = "devmart")]
#[command(author, version, about = "DevMart storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Repeat the password
        #[arg(short, long)]
        confirm: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Browse categories
    Categories {
        #[command(subcommand)]
        action: CategoriesAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for everything in the cart
    Checkout,
    /// Order history
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Admin console
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List all products
    List,
    /// Show one product
    Show { id: ProductId },
}

#[derive(Subcommand)]
enum CategoriesAction {
    /// List all categories
    List,
    /// Show a category by ID or slug
    Show { category: String },
    /// List the products in a category
    Products { id: CategoryId },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add { product_id: ProductId },
    /// Set a line's quantity (0 removes it)
    Set {
        product_id: ProductId,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove { product_id: ProductId },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List your orders
    List,
    /// Show one order
    Show { id: OrderId },
    /// Cancel a pending order
    Cancel { id: OrderId },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Revenue, stock and order summary
    Dashboard,
    /// Manage products
    Products {
        #[command(subcommand)]
        action: AdminProductsAction,
    },
    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: AdminCategoriesAction,
    },
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: AdminOrdersAction,
    },
}

#[derive(clap::Args)]
struct ProductArgs {
    #[arg(short, long)]
    name: String,

    #[arg(short, long, default_value = "")]
    description: String,

    #[arg(short, long)]
    price: String,

    #[arg(short, long)]
    stock: String,

    #[arg(long, default_value = "")]
    image_url: String,

    #[arg(short, long, default_value = "")]
    category: String,
}

#[derive(clap::Args)]
struct CategoryArgs {
    #[arg(short, long)]
    name: String,

    #[arg(short, long, default_value = "")]
    description: String,
}

#[derive(Subcommand)]
enum AdminProductsAction {
    /// Create a product
    Create(ProductArgs),
    /// Replace a product's fields
    Update {
        id: ProductId,
        #[command(flatten)]
        fields: ProductArgs,
    },
    /// Delete a product
    Delete { id: ProductId },
}

#[derive(Subcommand)]
enum AdminCategoriesAction {
    /// Create a category
    Create(CategoryArgs),
    /// Update a category
    Update {
        id: CategoryId,
        #[command(flatten)]
        fields: CategoryArgs,
    },
    /// Delete a category
    Delete { id: CategoryId },
}

#[derive(Subcommand)]
enum AdminOrdersAction {
    /// List all orders
    List,
    /// Change an order's status
    Status { id: OrderId, status: OrderStatus },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
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
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "devmart_storefront=info,devmart_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match AppState::new(config) {
        Ok(state) => run(cli, &state).await,
        Err(e) => Err(AppError::from(e)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, state: &AppState) -> Result<(), AppError> {
    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(state, email, password).await
        }
        Commands::Register {
            username,
            email,
            password,
            confirm,
        } => commands::auth::register(state, username, email, password, confirm).await,
        Commands::Logout => {
            commands::auth::logout(state).await;
            Ok(())
        }
        Commands::Whoami => commands::auth::whoami(state).await,
        Commands::Products { action } => match action {
            ProductsAction::List => commands::catalog::list_products(state).await,
            ProductsAction::Show { id } => commands::catalog::show_product(state, id).await,
        },
        Commands::Categories { action } => match action {
            CategoriesAction::List => commands::catalog::list_categories(state).await,
            CategoriesAction::Show { category } => {
                commands::catalog::show_category(state, &category).await
            }
            CategoriesAction::Products { id } => {
                commands::catalog::category_products(state, id).await
            }
        },
        Commands::Cart { action } => match action {
            CartAction::Show => {
                commands::cart::show(state);
                Ok(())
            }
            CartAction::Add { product_id } => commands::cart::add(state, product_id).await,
            CartAction::Set {
                product_id,
                quantity,
            } => commands::cart::set(state, product_id, quantity),
            CartAction::Remove { product_id } => {
                commands::cart::remove(state, product_id);
                Ok(())
            }
            CartAction::Clear => {
                commands::cart::clear(state);
                Ok(())
            }
        },
        Commands::Checkout => commands::orders::checkout(state).await,
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list(state).await,
            OrdersAction::Show { id } => commands::orders::show(state, id).await,
            OrdersAction::Cancel { id } => commands::orders::cancel(state, id).await,
        },
        Commands::Admin { action } => run_admin(action, state).await,
    }
}

async fn run_admin(action: AdminAction, state: &AppState) -> Result<(), AppError> {
    commands::require(state, &devmart_storefront::routes::Route::Admin).await?;

    match action {
        AdminAction::Dashboard => commands::admin::dashboard(state).await,
        AdminAction::Products { action } => match action {
            AdminProductsAction::Create(fields) => {
                commands::admin::create_product(state, &fields.into()).await
            }
            AdminProductsAction::Update { id, fields } => {
                commands::admin::update_product(state, id, &fields.into()).await
            }
            AdminProductsAction::Delete { id } => commands::admin::delete_product(state, id).await,
        },
        AdminAction::Categories { action } => match action {
            AdminCategoriesAction::Create(fields) => {
                commands::admin::create_category(state, &fields.into()).await
            }
            AdminCategoriesAction::Update { id, fields } => {
                commands::admin::update_category(state, id, &fields.into()).await
            }
            AdminCategoriesAction::Delete { id } => {
                commands::admin::delete_category(state, id).await
            }
        },
        AdminAction::Orders { action } => match action {
            AdminOrdersAction::List => commands::admin::list_orders(state).await,
            AdminOrdersAction::Status { id, status } => {
                commands::admin::update_order_status(state, id, status).await
            }
        },
    }
}

impl From<ProductArgs> for devmart_storefront::validation::ProductForm {
    fn from(args: ProductArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            price: args.price,
            stock: args.stock,
            image_url: args.image_url,
            category_id: args.category,
        }
    }
}

impl From<CategoryArgs> for devmart_storefront::validation::CategoryForm {
    fn from(args: CategoryArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
        }
    }
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
    fn test_parse_cart_set_negative() {
        let cli = Cli::try_parse_from(["devmart", "cart", "set", "7", "-1"]).unwrap_or_else(|e| {
            panic!("parse failed: {e}");
        });
        assert!(matches!(
            cli.command,
            Commands::Cart {
                action: CartAction::Set { quantity: -1, .. }
            }
        ));
    }

    #[test]
    fn test_parse_order_status() {
        let cli = Cli::try_parse_from(["devmart", "admin", "orders", "status", "3", "shipped"])
            .unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert!(matches!(
            cli.command,
            Commands::Admin {
                action: AdminAction::Orders {
                    action: AdminOrdersAction::Status {
                        status: OrderStatus::Shipped,
                        ..
                    }
                }
            }
        ));
    }
}
