//! Executed trades (buy or sell) recorded in a portfolio ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use super::investor::InvestorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("buy"),
            Side::Sell => f.write_str("sell"),
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" | "b" => Ok(Side::Buy),
            "sell" | "s" => Ok(Side::Sell),
            other => Err(format!("unknown side '{other}', expected buy or sell")),
        }
    }
}

/// A single trade.
///
/// `price` is the execution price and is independent of the stock's live
/// price. Once appended to a ledger a transaction is never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub investor: InvestorId,
    pub symbol: String,
    pub quantity: u64,
    pub price: Decimal,
    pub date: DateTime<Utc>,
    pub side: Side,
}

impl Transaction {
    pub fn buy(
        investor: InvestorId,
        symbol: impl Into<String>,
        quantity: u64,
        price: Decimal,
        date: DateTime<Utc>,
    ) -> Self {
        Transaction {
            investor,
            symbol: symbol.into(),
            quantity,
            price,
            date,
            side: Side::Buy,
        }
    }

    pub fn sell(
        investor: InvestorId,
        symbol: impl Into<String>,
        quantity: u64,
        price: Decimal,
        date: DateTime<Utc>,
    ) -> Self {
        Transaction {
            investor,
            symbol: symbol.into(),
            quantity,
            price,
            date,
            side: Side::Sell,
        }
    }

    pub fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }

    /// Signed cash flow: a buy is an outflow (negative), a sell an inflow.
    ///
    /// Panics if `quantity * price` does not fit in a `Decimal`. Transactions
    /// held by a [`Ledger`](super::ledger::Ledger) are always in range; use
    /// [`checked_amount`](Self::checked_amount) for anything else.
    pub fn amount(&self) -> Decimal {
        let gross = Decimal::from(self.quantity) * self.price;
        match self.side {
            Side::Buy => -gross,
            Side::Sell => gross,
        }
    }

    /// Like [`amount`](Self::amount), but `None` when the product overflows.
    pub fn checked_amount(&self) -> Option<Decimal> {
        let gross = Decimal::from(self.quantity).checked_mul(self.price)?;
        Some(match self.side {
            Side::Buy => -gross,
            Side::Sell => gross,
        })
    }

    /// Absolute monetary value of the trade.
    pub fn notional(&self) -> Decimal {
        self.amount().abs()
    }

    /// Share delta: buys add, sells remove.
    pub fn signed_quantity(&self) -> i128 {
        match self.side {
            Side::Buy => i128::from(self.quantity),
            Side::Sell => -i128::from(self.quantity),
        }
    }
}
