//! Listed instruments and their live price.

use rust_decimal::Decimal;

use super::error::LedgerError;

/// A registered instrument.
///
/// The price is only changed through the instrument registry so that every
/// change is announced to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stock {
    symbol: String,
    price: Decimal,
}

impl Stock {
    pub(crate) fn new(symbol: String) -> Self {
        Stock {
            symbol,
            price: Decimal::ZERO,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub(crate) fn set_price(&mut self, price: Decimal) {
        self.price = price;
    }
}

/// Canonical form of a ticker symbol: trimmed and uppercased.
pub fn normalize_symbol(raw: &str) -> Result<String, LedgerError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return Err(LedgerError::InvalidSymbol {
            symbol: raw.to_string(),
        });
    }
    Ok(trimmed.to_uppercase())
}
