//! Place a cash-on-delivery order from the cart.

use anyhow::{bail, Result};
use reina_commerce::checkout::{place_order, CustomerDetails};
use serde_json::json;

use super::CheckoutArgs;
use crate::context::Context;
use crate::output::{delivery_label, status_badge};

/// Run the checkout command.
pub fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let mut store = ctx.open_cart()?;
    if store.cart().is_empty() {
        bail!("Cart is empty. Add items with `reina cart add` first.");
    }

    let customer = CustomerDetails::new(args.name, args.phone, args.address)?;
    let mut book = ctx.order_book()?;

    tracing::debug!(
        rows = store.cart().len(),
        units = store.count(),
        "submitting order"
    );
    let order = place_order(&mut store, customer, ctx.config.delivery_fee()?, &mut book)?;

    // The order is already taken; a stock failure only warns.
    let stock = match ctx
        .inventory()
        .and_then(|inventory| inventory.apply_sale(&order.items).map_err(Into::into))
    {
        Ok(changes) => changes,
        Err(e) => {
            tracing::warn!(order_id = %order.id, error = %e, "could not update stock");
            Vec::new()
        }
    };

    if ctx.output.is_json() {
        ctx.output.json(&json!({ "order": order, "stock": stock }));
        return Ok(());
    }

    ctx.output.success(&format!("Order placed: {}", order.id));
    ctx.output.kv("Status", &status_badge(order.status));
    ctx.output.kv("Items", &order.item_count().to_string());
    ctx.output.kv("Subtotal", &order.subtotal.display());
    ctx.output.kv("Delivery", &delivery_label(order.delivery_fee));
    ctx.output.kv("Total", &order.total_amount.display());
    ctx.output.kv("Payment", "Cash on delivery");

    for change in &stock {
        ctx.output.kv(
            &format!("Stock {}", change.product_id),
            &format!("{} -> {}", change.before, change.after),
        );
        if change.after == 0 {
            ctx.output
                .warn(&format!("{} is now out of stock", change.product_id));
        }
    }

    Ok(())
}
