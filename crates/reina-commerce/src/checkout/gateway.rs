//! Order submission.

use reina_cache::{cache_key, Cache};
use serde::{Deserialize, Serialize};

use crate::cart::CartStore;
use crate::checkout::{CustomerDetails, Order, OrderStatus};
use crate::error::CommerceError;
use crate::ids::OrderId;
use crate::money::{Currency, Money};

const ORDER_NAMESPACE: &str = "order";

/// The external service that records orders.
pub trait OrderGateway {
    /// Record a new order. An error means the order was not taken.
    fn create_order(&mut self, order: &Order) -> Result<(), CommerceError>;
}

/// Place a cash-on-delivery order for everything in the cart.
///
/// The cart is cleared only after the gateway accepts the order; on any
/// error it is left exactly as it was.
pub fn place_order(
    store: &mut CartStore,
    customer: CustomerDetails,
    delivery_fee: Money,
    gateway: &mut dyn OrderGateway,
) -> Result<Order, CommerceError> {
    store.hydrate();
    let order = Order::from_cart(store.cart(), customer, delivery_fee)?;

    gateway.create_order(&order).map_err(|e| {
        tracing::warn!(order_id = %order.id, error = %e, "order submission failed");
        e
    })?;

    tracing::info!(
        order_id = %order.id,
        items = order.items.len(),
        total = %order.total_amount,
        "order placed"
    );
    store.clear();
    Ok(order)
}

/// Headline figures across every order in an [`OrderBook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    /// Number of orders.
    pub orders: usize,
    /// Orders still waiting in [`OrderStatus::Pending`].
    pub pending: usize,
    /// Sum of order totals, whatever their status.
    pub total_sales: Money,
}

/// Orders kept in a [`Cache`], one entry per order under `order:<id>`.
///
/// Stands in for the hosted orders table: checkout writes here and the
/// admin views read and update statuses.
#[derive(Debug)]
pub struct OrderBook {
    cache: Cache,
}

impl OrderBook {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    /// Fetch one order.
    pub fn get(&self, id: &OrderId) -> Result<Option<Order>, CommerceError> {
        Ok(self.cache.get(&cache_key!(ORDER_NAMESPACE, id))?)
    }

    /// All orders, newest first.
    pub fn list(&self) -> Result<Vec<Order>, CommerceError> {
        let mut orders = Vec::new();
        for key in self.cache.keys_with_prefix(ORDER_NAMESPACE)? {
            match self.cache.get::<Order>(&key) {
                Ok(Some(order)) => orders.push(order),
                Ok(None) => {}
                Err(e) => tracing::warn!(key = %key, error = %e, "skipping unreadable order"),
            }
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// All orders currently in `status`.
    pub fn with_status(&self, status: OrderStatus) -> Result<Vec<Order>, CommerceError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|o| o.status == status)
            .collect())
    }

    /// Order count, pending count and total sales. Orders in another
    /// currency are counted but not added to the sales figure.
    pub fn summary(&self, currency: Currency) -> Result<OrderSummary, CommerceError> {
        let orders = self.list()?;
        Ok(OrderSummary {
            orders: orders.len(),
            pending: orders
                .iter()
                .filter(|o| o.status == OrderStatus::Pending)
                .count(),
            total_sales: Money::saturating_sum(orders.iter().map(|o| o.total_amount), currency),
        })
    }

    /// Move an order to a new status, optionally recording a tracking number.
    pub fn update_status(
        &self,
        id: &OrderId,
        next: OrderStatus,
        tracking_number: Option<String>,
    ) -> Result<Order, CommerceError> {
        let mut order = self
            .get(id)?
            .ok_or_else(|| CommerceError::OrderNotFound(id.to_string()))?;
        let from = order.status;
        order.set_status(next)?;
        if tracking_number.is_some() {
            order.tracking_number = tracking_number;
        }
        self.cache.set(&cache_key!(ORDER_NAMESPACE, id), &order)?;
        tracing::info!(order_id = %id, %from, to = %next, "order status updated");
        Ok(order)
    }
}

impl OrderGateway for OrderBook {
    fn create_order(&mut self, order: &Order) -> Result<(), CommerceError> {
        let key = cache_key!(ORDER_NAMESPACE, order.id);
        if self.cache.exists(&key)? {
            return Err(CommerceError::OrderService(format!(
                "order {} already exists",
                order.id
            )));
        }
        self.cache.set(&key, order)?;
        Ok(())
    }
}
