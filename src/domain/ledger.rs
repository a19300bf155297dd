//! Append-only transaction ledger with the ownership check.
//!
//! Holdings are always recomputed from the full history rather than kept in a
//! running counter: the log is the state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::error::LedgerError;
use super::transaction::{Side, Transaction};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Net shares of `symbol`: buys minus sells.
    pub fn owned_shares(&self, symbol: &str) -> i128 {
        self.entries
            .iter()
            .filter(|t| t.symbol == symbol)
            .map(Transaction::signed_quantity)
            .sum()
    }

    /// Net shares per symbol, omitting symbols that net to zero.
    pub fn holdings(&self) -> BTreeMap<String, i128> {
        let mut holdings: BTreeMap<String, i128> = BTreeMap::new();
        for t in &self.entries {
            *holdings.entry(t.symbol.clone()).or_default() += t.signed_quantity();
        }
        holdings.retain(|_, qty| *qty != 0);
        holdings
    }

    /// Validates `candidate` against the history and appends it.
    ///
    /// On error the ledger is unchanged.
    pub fn append(&mut self, candidate: Transaction, now: DateTime<Utc>) -> Result<(), LedgerError> {
        if candidate.quantity == 0 {
            return Err(LedgerError::InvalidQuantity {
                symbol: candidate.symbol,
            });
        }
        if candidate.price < Decimal::ZERO {
            return Err(LedgerError::InvalidPrice {
                symbol: candidate.symbol,
                price: candidate.price,
            });
        }
        // Net amount never exceeds gross notional, so bounding gross bounds both.
        let in_range = candidate
            .checked_amount()
            .map(|amount| amount.abs())
            .and_then(|notional| {
                self.entries
                    .iter()
                    .try_fold(notional, |acc, t| acc.checked_add(t.notional()))
            })
            .is_some();
        if !in_range {
            return Err(LedgerError::AmountOverflow {
                symbol: candidate.symbol,
            });
        }
        if candidate.date > now {
            return Err(LedgerError::FutureDatedTrade {
                date: candidate.date,
                now,
            });
        }
        if candidate.side == Side::Sell {
            let owned = self.owned_shares(&candidate.symbol);
            if i128::from(candidate.quantity) > owned {
                return Err(LedgerError::Oversell {
                    symbol: candidate.symbol,
                    requested: candidate.quantity,
                    owned,
                });
            }
        }
        self.entries.push(candidate);
        Ok(())
    }

    /// Transactions in execution order.
    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of signed amounts; positive means net cash inflow.
    pub fn net_amount(&self) -> Decimal {
        self.entries.iter().map(Transaction::amount).sum()
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
