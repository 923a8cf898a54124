//! Cart commands.

use std::io::Read;

use anyhow::{bail, Context as _, Result};
use dialoguer::Confirm;
use reina_commerce::cart::CartStore;
use reina_commerce::catalog::{CatalogProduct, VariantSelection};
use reina_commerce::ids::ProductId;
use serde_json::{json, Value};

use super::{CartArgs, CartCommand};
use crate::context::Context;

/// Run the cart command.
pub fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let mut store = ctx.open_cart()?;

    match args.command {
        CartCommand::Add {
            product,
            size,
            color,
        } => add(&mut store, &product, size, color, ctx),
        CartCommand::Remove { product_id, size } => {
            let key = store.key(product_id, size.as_deref());
            if !store.remove_item(&key) {
                bail!("Not in cart: {}", key);
            }
            ctx.output.success(&format!("Removed {}", key));
            show(&store, ctx)
        }
        CartCommand::RemoveProduct { product_id } => {
            let product_id = ProductId::new(product_id);
            if !store.remove_product(&product_id) {
                bail!("Not in cart: {}", product_id);
            }
            ctx.output.success(&format!("Removed all rows of {}", product_id));
            show(&store, ctx)
        }
        CartCommand::Update {
            product_id,
            delta,
            size,
        } => {
            let key = store.key(product_id, size.as_deref());
            match store.update_quantity(&key, delta) {
                Some(quantity) => {
                    ctx.output
                        .success(&format!("{} now has quantity {}", key, quantity));
                    show(&store, ctx)
                }
                None => bail!("Not in cart: {}", key),
            }
        }
        CartCommand::Clear { yes } => clear(&mut store, yes, ctx),
        CartCommand::Show => show(&store, ctx),
    }
}

fn add(
    store: &mut CartStore,
    source: &str,
    size: Option<String>,
    color: Option<String>,
    ctx: &Context,
) -> Result<()> {
    let record = read_record(source, ctx)?;
    let product = CatalogProduct::from_record(&record, ctx.config.currency()?)?;

    if !product.in_stock() {
        bail!("{} is out of stock", product.name);
    }
    let recorded = ctx
        .inventory()
        .and_then(|inventory| inventory.record(&product).map_err(Into::into));
    if let Err(e) = recorded {
        tracing::warn!(product_id = %product.id, error = %e, "could not record stock level");
    }

    let mut variant = VariantSelection::none();
    if let Some(size) = size {
        if !product.sizes.is_empty() && !product.sizes.contains(&size) {
            ctx.output.warn(&format!(
                "Size {} is not listed for {} (available: {})",
                size,
                product.name,
                product.sizes.join(", ")
            ));
        }
        variant = variant.with_size(size);
    }
    if let Some(color) = color {
        variant = variant.with_color(color);
    }

    tracing::debug!(product_id = %product.id, ?variant, "adding to cart");
    store.add_item(&product, &variant);

    let key = store.key(product.id.clone(), variant.size.as_deref());
    match store.cart().get(&key) {
        Some(item) => ctx
            .output
            .success(&format!("Added {} (quantity {})", key, item.quantity)),
        None => bail!("Could not add {} to the cart", product.name),
    }
    show(store, ctx)
}

/// Read a catalog record from inline JSON, stdin (`-`), or a file.
fn read_record(source: &str, ctx: &Context) -> Result<Value> {
    let content = if source.trim_start().starts_with('{') {
        source.to_string()
    } else if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read product from stdin")?;
        buf
    } else {
        let path = ctx.resolve_path(source);
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read product file: {}", path.display()))?
    };

    serde_json::from_str(&content).context("Product record is not valid JSON")
}

fn clear(store: &mut CartStore, yes: bool, ctx: &Context) -> Result<()> {
    if store.cart().is_empty() {
        ctx.output.info("Cart is already empty");
        return Ok(());
    }

    if !yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove all {} items from the cart?", store.count()))
            .default(false)
            .interact()?;

        if !confirmed {
            ctx.output.info("Cancelled");
            return Ok(());
        }
    }

    store.clear();
    ctx.output.success("Cart cleared");
    show(store, ctx)
}

fn show(store: &CartStore, ctx: &Context) -> Result<()> {
    let totals = store.totals(ctx.config.delivery_fee()?);

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "items": store.cart().items(),
            "totals": totals,
        }));
        return Ok(());
    }

    if store.cart().is_empty() {
        ctx.output.info("Cart is empty");
        return Ok(());
    }

    ctx.output.header("Cart");
    ctx.output.cart(store.cart().items(), &totals);
    Ok(())
}
