//! CLI command implementations.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod orders;

use clap::{Args, Subcommand};

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: CartCommand,
}

/// Cart subcommands.
#[derive(Subcommand)]
pub enum CartCommand {
    /// Add one unit of a product.
    Add {
        /// Catalog record: a JSON file path, `-` for stdin, or inline JSON.
        product: String,

        /// Selected size.
        #[arg(short, long)]
        size: Option<String>,

        /// Selected color.
        #[arg(long)]
        color: Option<String>,
    },

    /// Remove a single row.
    Remove {
        /// Product ID.
        product_id: String,

        /// Size of the row to remove.
        #[arg(short, long)]
        size: Option<String>,
    },

    /// Remove every row of a product, whatever its size.
    RemoveProduct {
        /// Product ID.
        product_id: String,
    },

    /// Change a row's quantity by a signed amount.
    Update {
        /// Product ID.
        product_id: String,

        /// Amount to add; negative to decrease.
        #[arg(allow_hyphen_values = true)]
        delta: i64,

        /// Size of the row to update.
        #[arg(short, long)]
        size: Option<String>,
    },

    /// Empty the cart.
    Clear {
        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Show cart contents and totals.
    Show,
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Customer name.
    #[arg(long)]
    pub name: String,

    /// Contact phone number.
    #[arg(long)]
    pub phone: String,

    /// Delivery address.
    #[arg(long)]
    pub address: String,
}

/// Arguments for the orders command.
#[derive(Args)]
pub struct OrdersArgs {
    #[command(subcommand)]
    pub command: OrdersCommand,
}

/// Orders subcommands.
#[derive(Subcommand)]
pub enum OrdersCommand {
    /// Total sales, pending count and the most recent orders.
    Summary {
        /// Number of recent orders to show.
        #[arg(long, default_value_t = 6)]
        recent: usize,
    },

    /// List orders, newest first.
    List {
        /// Only show orders with this status.
        #[arg(long)]
        status: Option<String>,
    },

    /// Show one order.
    Show {
        /// Order ID.
        id: String,
    },

    /// Move an order to a new status.
    Status {
        /// Order ID.
        id: String,

        /// New status (pending, processing, shipped, delivered, cancelled).
        status: String,

        /// Courier tracking number.
        #[arg(long)]
        tracking: Option<String>,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,

    /// Write a default config file in the current directory.
    Init {
        /// Overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}
