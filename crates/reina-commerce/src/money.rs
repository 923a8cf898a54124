//! Money type for representing monetary values.
//!
//! Uses an integer count of the currency's smallest unit to avoid
//! floating-point drift when prices are multiplied and summed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    LKR,
    USD,
    EUR,
    GBP,
    INR,
    JPY,
}

impl Currency {
    /// Get the currency code (e.g., "LKR").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::LKR => "LKR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::INR => "INR",
            Currency::JPY => "JPY",
        }
    }

    /// Get the currency symbol as it prefixes an amount (e.g., "Rs. ").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::LKR => "Rs. ",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::INR => "\u{20b9}",
            Currency::JPY => "\u{00a5}",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "LKR" => Some(Currency::LKR),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "INR" => Some(Currency::INR),
            "JPY" => Some(Currency::JPY),
            _ => None,
        }
    }

    fn minor_per_major(&self) -> i64 {
        10_i64.pow(self.decimal_places())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// Amounts are stored in the smallest unit of the currency (cents for LKR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit.
    pub amount_cents: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Create a Money value from a decimal amount, rounding to the nearest
    /// minor unit. Returns `None` for non-finite or unrepresentable input.
    ///
    /// ```
    /// use reina_commerce::money::{Money, Currency};
    /// let price = Money::from_decimal(1499.5, Currency::LKR).unwrap();
    /// assert_eq!(price.amount_cents, 149950);
    /// ```
    pub fn from_decimal(amount: f64, currency: Currency) -> Option<Self> {
        let scaled = (amount * currency.minor_per_major() as f64).round();
        if !scaled.is_finite() || scaled.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Self::new(scaled as i64, currency))
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Format as a display string (e.g., "Rs. 1,500.00").
    pub fn display(&self) -> String {
        format!("{}{}", self.currency.symbol(), self.display_amount())
    }

    /// Format as a display string without symbol (e.g., "1,500.00").
    pub fn display_amount(&self) -> String {
        let per_major = self.currency.minor_per_major();
        let abs = self.amount_cents.unsigned_abs();
        let major = abs / per_major as u64;
        let minor = abs % per_major as u64;

        let digits = major.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if self.amount_cents < 0 { "-" } else { "" };
        let places = self.currency.decimal_places() as usize;
        if places == 0 {
            format!("{}{}", sign, grouped)
        } else {
            format!("{}{}.{:0places$}", sign, grouped, minor)
        }
    }

    /// Multiply by a quantity, saturating at the numeric bounds.
    pub fn saturating_mul(&self, factor: u32) -> Money {
        Money::new(
            self.amount_cents.saturating_mul(i64::from(factor)),
            self.currency,
        )
    }

    /// Sum an iterator of amounts in `currency`, saturating at the numeric
    /// bounds. Amounts in other currencies are skipped.
    pub fn saturating_sum(iter: impl IntoIterator<Item = Money>, currency: Currency) -> Money {
        let amount = iter
            .into_iter()
            .filter(|m| m.currency == currency)
            .fold(0_i64, |acc, m| acc.saturating_add(m.amount_cents));
        Money::new(amount, currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}
