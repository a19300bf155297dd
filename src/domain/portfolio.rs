//! Per-investor portfolio: a ledger plus the risk policy applied to it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

use super::error::LedgerError;
use super::investor::Investor;
use super::ledger::Ledger;
use super::risk::RiskStrategy;
use super::transaction::Transaction;

#[derive(Debug)]
pub struct Portfolio {
    investor: Investor,
    ledger: Ledger,
    risk_strategy: Box<dyn RiskStrategy>,
}

impl Portfolio {
    pub fn new(investor: Investor, risk_strategy: Box<dyn RiskStrategy>) -> Self {
        Portfolio {
            investor,
            ledger: Ledger::new(),
            risk_strategy,
        }
    }

    pub fn investor(&self) -> &Investor {
        &self.investor
    }

    pub fn risk_strategy(&self) -> &dyn RiskStrategy {
        self.risk_strategy.as_ref()
    }

    /// Appends `candidate` if it belongs to this investor and passes the
    /// ledger checks. `now` is the submission time.
    pub fn add_transaction(
        &mut self,
        candidate: Transaction,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        if candidate.investor != self.investor.id {
            return Err(LedgerError::InvestorMismatch {
                expected: self.investor.id,
                actual: candidate.investor,
            });
        }
        debug!(
            investor = %self.investor.id,
            symbol = %candidate.symbol,
            side = %candidate.side,
            quantity = candidate.quantity,
            price = %candidate.price,
            "submitting transaction"
        );
        self.ledger.append(candidate, now)
    }

    /// Signed sum of transaction amounts. Positive is a net cash inflow.
    pub fn net_profit(&self) -> Decimal {
        self.ledger.net_amount()
    }

    pub fn risk(&self) -> Decimal {
        self.risk_strategy.calculate_risk(self.ledger.entries())
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.ledger.entries()
    }

    pub fn owned_shares(&self, symbol: &str) -> i128 {
        self.ledger.owned_shares(symbol)
    }

    pub fn holdings(&self) -> BTreeMap<String, i128> {
        self.ledger.holdings()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}
