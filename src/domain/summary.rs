//! Read-only aggregation over a desk snapshot for reporting.
//!
//! Nothing here mutates the desk; every figure is derived from the recorded
//! transactions at the time [`summarize`] is called.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::desk::TradingDesk;
use super::investor::InvestorId;
use super::transaction::Transaction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioLine {
    pub investor: InvestorId,
    pub name: String,
    pub strategy: String,
    pub transactions: usize,
    pub net_profit: Decimal,
    pub risk: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockActivity {
    pub symbol: String,
    pub price: Decimal,
    pub transactions: usize,
    pub volume: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSummary {
    pub portfolios: Vec<PortfolioLine>,
    pub stocks: Vec<StockActivity>,
    pub net_amount: Decimal,
}

impl LedgerSummary {
    /// Highest net profit; the lowest investor id wins a tie.
    pub fn most_profitable(&self) -> Option<&PortfolioLine> {
        self.portfolios
            .iter()
            .filter(|p| p.transactions > 0)
            .reduce(|best, p| if p.net_profit > best.net_profit { p } else { best })
    }

    /// Stock with the most shares traded; ties go to the first symbol.
    pub fn highest_volume(&self) -> Option<&StockActivity> {
        self.stocks
            .iter()
            .filter(|s| s.volume > 0)
            .reduce(|best, s| if s.volume > best.volume { s } else { best })
    }

    pub fn negative_returns(&self) -> impl Iterator<Item = &PortfolioLine> {
        self.portfolios
            .iter()
            .filter(|p| p.net_profit < Decimal::ZERO)
    }
}

pub fn summarize(desk: &TradingDesk) -> LedgerSummary {
    let portfolios = desk
        .portfolios()
        .map(|p| PortfolioLine {
            investor: p.investor().id,
            name: p.investor().name.clone(),
            strategy: p.risk_strategy().name().to_string(),
            transactions: p.transactions().len(),
            net_profit: p.net_profit(),
            risk: p.risk(),
        })
        .collect();

    let mut by_symbol: BTreeMap<&str, (usize, u64)> = BTreeMap::new();
    for t in desk.all_transactions() {
        let entry = by_symbol.entry(t.symbol.as_str()).or_default();
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(t.quantity);
    }

    let stocks = desk
        .stocks()
        .map(|s| {
            let (transactions, volume) = by_symbol.get(s.symbol()).copied().unwrap_or_default();
            StockActivity {
                symbol: s.symbol().to_string(),
                price: s.price(),
                transactions,
                volume,
            }
        })
        .collect();

    LedgerSummary {
        portfolios,
        stocks,
        // Each ledger is bounded on its own; the desk-wide total may not be.
        net_amount: desk
            .all_transactions()
            .map(Transaction::amount)
            .fold(Decimal::ZERO, Decimal::saturating_add),
    }
}
