//! Order management commands.

use anyhow::{bail, Result};
use reina_commerce::checkout::{Order, OrderBook, OrderStatus};
use reina_commerce::ids::OrderId;
use serde_json::json;

use super::{OrdersArgs, OrdersCommand};
use crate::context::Context;
use crate::output::{delivery_label, status_badge, variant_label};

/// Run the orders command.
pub fn run(args: OrdersArgs, ctx: &Context) -> Result<()> {
    let book = ctx.order_book()?;

    match args.command {
        OrdersCommand::Summary { recent } => summary(&book, recent, ctx),
        OrdersCommand::List { status } => {
            let orders = match status {
                Some(status) => book.with_status(status.parse()?)?,
                None => book.list()?,
            };
            list(&orders, ctx);
            Ok(())
        }
        OrdersCommand::Show { id } => {
            let id = OrderId::new(id);
            match book.get(&id)? {
                Some(order) => {
                    show(&order, ctx);
                    Ok(())
                }
                None => bail!("Order not found: {}", id),
            }
        }
        OrdersCommand::Status {
            id,
            status,
            tracking,
        } => {
            let next: OrderStatus = status.parse()?;
            let order = book.update_status(&OrderId::new(id), next, tracking)?;
            ctx.output.success(&format!(
                "Order {} is now {}",
                order.id,
                status_badge(order.status)
            ));
            show(&order, ctx);
            Ok(())
        }
    }
}

fn summary(book: &OrderBook, recent: usize, ctx: &Context) -> Result<()> {
    let summary = book.summary(ctx.config.currency()?)?;
    let orders = book.list()?;
    let recent = &orders[..recent.min(orders.len())];
    tracing::debug!(orders = summary.orders, pending = summary.pending, "order summary");

    if ctx.output.is_json() {
        ctx.output
            .json(&json!({ "summary": summary, "recent": recent }));
        return Ok(());
    }

    ctx.output.header("Store summary");
    ctx.output.kv("Total sales", &summary.total_sales.display());
    ctx.output.kv("Orders", &summary.orders.to_string());
    ctx.output.kv("Pending", &summary.pending.to_string());

    if !recent.is_empty() {
        list(recent, ctx);
    }
    Ok(())
}

fn list(orders: &[Order], ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(&orders);
        return;
    }

    if orders.is_empty() {
        ctx.output.info("No orders");
        return;
    }

    ctx.output.header("Orders");
    let widths = [18, 20, 22, 12, 14];
    ctx.output
        .table_row(&["ID", "PLACED", "CUSTOMER", "STATUS", "TOTAL"], &widths);
    for order in orders {
        let placed = order.created_at.format("%Y-%m-%d %H:%M").to_string();
        let total = order.total_amount.display();
        ctx.output.table_row(
            &[
                order.id.as_str(),
                &placed,
                &order.customer.name,
                order.status.as_str(),
                &total,
            ],
            &widths,
        );
    }
}

fn show(order: &Order, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(order);
        return;
    }

    ctx.output.header(&format!("Order {}", order.id));
    ctx.output.kv("Status", &status_badge(order.status));
    ctx.output
        .kv("Placed", &order.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    ctx.output.kv("Customer", &order.customer.name);
    ctx.output.kv("Phone", &order.customer.phone);
    ctx.output.kv("Address", &order.customer.address);
    if let Some(ref tracking) = order.tracking_number {
        ctx.output.kv("Tracking", tracking);
    }

    println!();
    for item in &order.items {
        ctx.output.kv(
            &format!("{} x{}", item.name, item.quantity),
            &format!("{} [{}]", item.line_total().display(), variant_label(item)),
        );
    }
    println!();
    ctx.output.kv("Subtotal", &order.subtotal.display());
    ctx.output.kv("Delivery", &delivery_label(order.delivery_fee));
    ctx.output.kv("Total", &order.total_amount.display());
}
