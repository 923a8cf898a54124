//! Local stock levels.

use reina_cache::{cache_key, Cache};
use serde::{Deserialize, Serialize};

use crate::cart::CartLineItem;
use crate::catalog::CatalogProduct;
use crate::error::CommerceError;
use crate::ids::ProductId;

const PRODUCT_NAMESPACE: &str = "product";

/// Stock movement for one product after a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockChange {
    pub product_id: ProductId,
    pub before: u32,
    pub after: u32,
}

/// Products last seen in catalog records, kept in a [`Cache`] under
/// `product:<id>` so sales can draw their stock down.
#[derive(Debug)]
pub struct Inventory {
    cache: Cache,
}

impl Inventory {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    /// Remember the latest record for a product, replacing any earlier one.
    pub fn record(&self, product: &CatalogProduct) -> Result<(), CommerceError> {
        self.cache
            .set(&cache_key!(PRODUCT_NAMESPACE, product.id), product)?;
        Ok(())
    }

    /// The stored record for a product.
    pub fn get(&self, id: &ProductId) -> Result<Option<CatalogProduct>, CommerceError> {
        Ok(self.cache.get(&cache_key!(PRODUCT_NAMESPACE, id))?)
    }

    /// Lower stock for every sold row, floored at zero.
    ///
    /// Rows are applied in order, so several sizes of one product draw from
    /// the same level. Products that are unknown or do not track stock are
    /// skipped. Returns one change per product touched.
    pub fn apply_sale(&self, items: &[CartLineItem]) -> Result<Vec<StockChange>, CommerceError> {
        let mut changes: Vec<StockChange> = Vec::new();

        for item in items {
            let Some(mut product) = self.get(&item.id)? else {
                tracing::debug!(product_id = %item.id, "no stock record; skipping");
                continue;
            };
            let (Some(before), Some(after)) = (
                product.stock_quantity,
                product.stock_after_sale(item.quantity),
            ) else {
                continue;
            };

            product.stock_quantity = Some(after);
            self.record(&product)?;

            match changes.iter_mut().find(|c| c.product_id == item.id) {
                Some(change) => change.after = after,
                None => changes.push(StockChange {
                    product_id: item.id.clone(),
                    before,
                    after,
                }),
            }
        }

        if !changes.is_empty() {
            tracing::info!(products = changes.len(), "stock updated after sale");
        }
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::VariantSelection;
    use crate::money::{Currency, Money};

    fn row(product: &CatalogProduct, size: &str, quantity: u32) -> CartLineItem {
        let mut item =
            CartLineItem::from_product(product, &VariantSelection::none().with_size(size));
        item.quantity = quantity;
        item
    }

    #[test]
    fn test_sale_draws_stock_down() {
        let inventory = Inventory::new(Cache::in_memory());
        let flip = CatalogProduct::new("A", "Flip", Money::new(100_000, Currency::LKR)).with_stock(5);
        inventory.record(&flip).unwrap();

        let changes = inventory
            .apply_sale(&[row(&flip, "40", 2), row(&flip, "41", 1)])
            .unwrap();

        assert_eq!(
            changes,
            vec![StockChange {
                product_id: ProductId::new("A"),
                before: 5,
                after: 2,
            }]
        );
        let stored = inventory.get(&ProductId::new("A")).unwrap().unwrap();
        assert_eq!(stored.stock_quantity, Some(2));
    }

    #[test]
    fn test_stock_never_goes_negative() {
        let inventory = Inventory::new(Cache::in_memory());
        let flip = CatalogProduct::new("A", "Flip", Money::new(100_000, Currency::LKR)).with_stock(1);
        inventory.record(&flip).unwrap();

        let changes = inventory.apply_sale(&[row(&flip, "40", 3)]).unwrap();
        assert_eq!(changes[0].after, 0);
        assert!(!inventory.get(&flip.id).unwrap().unwrap().in_stock());
    }

    #[test]
    fn test_unknown_and_untracked_products_skipped() {
        let inventory = Inventory::new(Cache::in_memory());
        let untracked = CatalogProduct::new("B", "Slide", Money::new(50_000, Currency::LKR));
        let unknown = CatalogProduct::new("C", "Clog", Money::new(50_000, Currency::LKR));
        inventory.record(&untracked).unwrap();

        let changes = inventory
            .apply_sale(&[row(&untracked, "40", 1), row(&unknown, "40", 1)])
            .unwrap();
        assert!(changes.is_empty());
        assert_eq!(inventory.get(&untracked.id).unwrap().unwrap().stock_quantity, None);
    }
}
