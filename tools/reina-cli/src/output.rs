//! Output formatting for the CLI.

use console::style;
use reina_commerce::cart::{CartLineItem, CartTotals};
use reina_commerce::checkout::OrderStatus;
use reina_commerce::money::Money;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| format!("{:width$}", col, width = width))
            .collect();
        println!("  {}", formatted.join("  "));
    }

    /// Print cart rows followed by the totals block.
    pub fn cart(&self, items: &[CartLineItem], totals: &CartTotals) {
        if self.json {
            return;
        }
        const WIDTHS: [usize; 5] = [12, 24, 10, 5, 14];
        self.table_row(&["ID", "NAME", "VARIANT", "QTY", "LINE TOTAL"], &WIDTHS);
        for item in items {
            let variant = variant_label(item);
            let quantity = item.quantity.to_string();
            let line_total = item.line_total().display();
            self.table_row(
                &[
                    item.id.as_str(),
                    &item.name,
                    &variant,
                    &quantity,
                    &line_total,
                ],
                &WIDTHS,
            );
        }
        println!();
        self.kv("Items", &totals.count.to_string());
        self.kv("Subtotal", &totals.subtotal.display());
        self.kv("Delivery", &delivery_label(totals.delivery_fee));
        self.kv("Total", &style(totals.grand_total.display()).bold().to_string());
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// "size / color" for a row, or "-".
pub fn variant_label(item: &CartLineItem) -> String {
    match (&item.size, &item.color) {
        (Some(size), Some(color)) => format!("{} / {}", size, color),
        (Some(size), None) => size.clone(),
        (None, Some(color)) => color.clone(),
        (None, None) => "-".to_string(),
    }
}

/// Delivery fee, or "Free" when there is none.
pub fn delivery_label(fee: Money) -> String {
    if fee.is_zero() {
        "Free".to_string()
    } else {
        fee.display()
    }
}

/// Status badge for order states.
pub fn status_badge(status: OrderStatus) -> String {
    let label = status.as_str();
    match status {
        OrderStatus::Delivered => style(label).green().to_string(),
        OrderStatus::Shipped => style(label).blue().to_string(),
        OrderStatus::Pending | OrderStatus::Processing => style(label).yellow().to_string(),
        OrderStatus::Cancelled => style(label).dim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reina_commerce::ids::ProductId;
    use reina_commerce::money::Currency;

    fn item(size: Option<&str>, color: Option<&str>) -> CartLineItem {
        CartLineItem {
            id: ProductId::new("A"),
            name: "Flip".into(),
            unit_price: Money::new(100, Currency::LKR),
            image_ref: String::new(),
            quantity: 1,
            size: size.map(str::to_string),
            color: color.map(str::to_string),
        }
    }

    #[test]
    fn test_variant_label() {
        assert_eq!(variant_label(&item(Some("40"), Some("Red"))), "40 / Red");
        assert_eq!(variant_label(&item(Some("40"), None)), "40");
        assert_eq!(variant_label(&item(None, Some("Red"))), "Red");
        assert_eq!(variant_label(&item(None, None)), "-");
    }

    #[test]
    fn test_delivery_label() {
        assert_eq!(delivery_label(Money::zero(Currency::LKR)), "Free");
        assert_eq!(delivery_label(Money::new(35_000, Currency::LKR)), "Rs. 350.00");
    }
}
