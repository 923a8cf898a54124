//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use reina_cache::{Cache, Slot};
use reina_commerce::cart::CartStore;
use reina_commerce::catalog::Inventory;
use reina_commerce::checkout::OrderBook;

use crate::config::CliConfig;
use crate::output::Output;

const ORDERS_DIR: &str = "orders";
const PRODUCTS_DIR: &str = "products";

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Where the configuration came from, if a file was found.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from an explicit config file, or the nearest one found
    /// from the working directory upwards, or defaults.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config_path = match config_path {
            Some(path) => Some(PathBuf::from(path)),
            None => CliConfig::find(&cwd),
        };
        let config = match &config_path {
            Some(path) => CliConfig::load(path)?,
            None => CliConfig::default(),
        };
        config.validate().context("Invalid configuration")?;

        if let Some(path) = &config_path {
            output.debug(&format!("Using config {}", path.display()));
        }

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Directory holding durable state.
    pub fn storage_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.storage.dir)
    }

    /// Open the cart store. It is hydrated from the slot before returning.
    pub fn open_cart(&self) -> Result<CartStore> {
        let dir = self.storage_dir();
        let cache = Cache::open(&dir)
            .with_context(|| format!("Failed to open storage at {}", dir.display()))?;
        let slot = Slot::new(cache, self.config.cart.slot.clone());
        Ok(CartStore::open(
            slot,
            self.config.cart.identity,
            self.config.currency()?,
        ))
    }

    /// Open the local order book.
    pub fn order_book(&self) -> Result<OrderBook> {
        let dir = self.storage_dir().join(ORDERS_DIR);
        let cache = Cache::open(&dir)
            .with_context(|| format!("Failed to open order book at {}", dir.display()))?;
        Ok(OrderBook::new(cache))
    }

    /// Open the local stock records.
    pub fn inventory(&self) -> Result<Inventory> {
        let dir = self.storage_dir().join(PRODUCTS_DIR);
        let cache = Cache::open(&dir)
            .with_context(|| format!("Failed to open inventory at {}", dir.display()))?;
        Ok(Inventory::new(cache))
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}
