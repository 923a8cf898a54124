//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use reina_cache::FileStore;
use reina_commerce::cart::{IdentityPolicy, DEFAULT_CART_SLOT};
use reina_commerce::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Config file names searched for, in order, from the working directory up.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["reina.toml", ".reina.toml", "reina.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CliConfig {
    /// Cart configuration.
    #[serde(default)]
    pub cart: CartConfig,

    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Checkout configuration.
    #[serde(default)]
    pub checkout: CheckoutConfig,
}

/// `[cart]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartConfig {
    /// Name of the durable slot holding the cart.
    #[serde(default = "default_slot")]
    pub slot: String,

    /// How cart rows are keyed.
    #[serde(default)]
    pub identity: IdentityPolicy,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            slot: default_slot(),
            identity: IdentityPolicy::default(),
        }
    }
}

fn default_slot() -> String {
    DEFAULT_CART_SLOT.to_string()
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Directory holding the cart slot and the order book. Relative paths
    /// resolve against the working directory.
    #[serde(default = "default_storage_dir")]
    pub dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

fn default_storage_dir() -> String {
    ".reina".to_string()
}

/// `[checkout]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutConfig {
    /// Flat delivery fee in major units.
    #[serde(default = "default_delivery_fee")]
    pub delivery_fee: f64,

    /// Store currency code.
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            delivery_fee: default_delivery_fee(),
            currency: default_currency(),
        }
    }
}

fn default_delivery_fee() -> f64 {
    350.0
}

fn default_currency() -> String {
    Currency::LKR.code().to_string()
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Find the nearest config file at or above `start`.
    pub fn find(start: &Path) -> Option<PathBuf> {
        start.ancestors().find_map(|dir| {
            CONFIG_FILE_NAMES
                .iter()
                .map(|name| dir.join(name))
                .find(|candidate| candidate.is_file())
        })
    }

    /// The configured store currency.
    pub fn currency(&self) -> Result<Currency> {
        Currency::from_code(&self.checkout.currency)
            .ok_or_else(|| anyhow!("Unknown currency in config: {}", self.checkout.currency))
    }

    /// The configured delivery fee.
    pub fn delivery_fee(&self) -> Result<Money> {
        let fee = self.checkout.delivery_fee;
        if !fee.is_finite() || fee < 0.0 {
            return Err(anyhow!("Invalid delivery fee in config: {}", fee));
        }
        Money::from_decimal(fee, self.currency()?)
            .ok_or_else(|| anyhow!("Delivery fee out of range: {}", fee))
    }

    /// Check the config for values that would fail at use time.
    pub fn validate(&self) -> Result<()> {
        if !FileStore::is_valid_key(&self.cart.slot) {
            return Err(anyhow!(
                "cart.slot {:?} must be non-empty, not start with '.', and use only letters, digits, '-', '_', '.' or ':'",
                self.cart.slot
            ));
        }
        if self.storage.dir.trim().is_empty() {
            return Err(anyhow!("storage.dir must not be empty"));
        }
        self.delivery_fee()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.cart.slot, "reina_cart");
        assert_eq!(config.cart.identity, IdentityPolicy::ProductAndSize);
        assert_eq!(config.storage.dir, ".reina");
        assert_eq!(config.currency().unwrap(), Currency::LKR);
        assert_eq!(config.delivery_fee().unwrap().amount_cents, 35_000);
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: CliConfig = toml::from_str(
            r#"
            [cart]
            identity = "product_id"

            [checkout]
            delivery_fee = 400
            "#,
        )
        .unwrap();

        assert_eq!(config.cart.identity, IdentityPolicy::ProductId);
        assert_eq!(config.cart.slot, "reina_cart");
        assert_eq!(config.delivery_fee().unwrap().amount_cents, 40_000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = CliConfig::default();
        config.checkout.currency = "XYZ".into();
        assert!(config.validate().is_err());

        let mut config = CliConfig::default();
        config.checkout.delivery_fee = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unstorable_slot_name_rejected() {
        for slot in ["reina cart", "", ".hidden", "carts/main"] {
            let mut config = CliConfig::default();
            config.cart.slot = slot.into();
            assert!(config.validate().is_err(), "slot {:?} should be rejected", slot);
        }

        let mut config = CliConfig::default();
        config.cart.slot = "shop:cart-2".into();
        config.validate().unwrap();
    }

    #[test]
    fn test_save_load_and_find() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let path = dir.path().join("reina.toml");
        let mut config = CliConfig::default();
        config.storage.dir = "data".into();
        config.save(&path).unwrap();

        assert_eq!(CliConfig::find(&nested), Some(path.clone()));
        assert_eq!(CliConfig::load(&path).unwrap(), config);
    }
}
