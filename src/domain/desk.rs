//! Trading desk: the entry point callers use to drive the ledger core.
//!
//! Owns the instrument registry and one portfolio per investor. Every
//! operation either succeeds completely or returns a [`LedgerError`] with no
//! state changed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;

use super::error::LedgerError;
use super::investor::{Investor, InvestorId};
use super::notification::{DeliveryReport, HandlerError, SubscriptionId};
use super::portfolio::Portfolio;
use super::registry::InstrumentRegistry;
use super::risk::{RiskStrategy, RiskStrategyKind};
use super::stock::Stock;
use super::transaction::{Side, Transaction};
use crate::adapters::system_clock::SystemClock;
use crate::ports::clock_port::Clock;

/// A trade request as submitted by a caller, before it is bound to a
/// portfolio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRequest {
    pub investor: InvestorId,
    pub symbol: String,
    pub quantity: u64,
    pub price: Decimal,
    pub date: DateTime<Utc>,
    pub side: Side,
}

pub struct TradingDesk {
    registry: InstrumentRegistry,
    portfolios: BTreeMap<InvestorId, Portfolio>,
    clock: Box<dyn Clock>,
}

impl fmt::Debug for TradingDesk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TradingDesk")
            .field("registry", &self.registry)
            .field("portfolios", &self.portfolios)
            .finish_non_exhaustive()
    }
}

impl Default for TradingDesk {
    fn default() -> Self {
        Self::new()
    }
}

impl TradingDesk {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        TradingDesk {
            registry: InstrumentRegistry::new(),
            portfolios: BTreeMap::new(),
            clock,
        }
    }

    pub fn register_stock(&mut self, symbol: &str) -> Result<Stock, LedgerError> {
        self.registry.register(symbol).cloned()
    }

    pub fn update_stock_price(
        &mut self,
        symbol: &str,
        price: Decimal,
    ) -> Result<DeliveryReport, LedgerError> {
        self.registry.update_price(symbol, price)
    }

    pub fn subscribe_to_price_changes<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&str, Decimal) -> Result<(), HandlerError> + Send + 'static,
    {
        self.registry.subscribe(handler)
    }

    pub fn unsubscribe_from_price_changes(&mut self, id: SubscriptionId) -> bool {
        self.registry.unsubscribe(id)
    }

    pub fn stock(&self, symbol: &str) -> Result<&Stock, LedgerError> {
        self.registry.get(symbol)
    }

    pub fn stocks(&self) -> impl Iterator<Item = &Stock> {
        self.registry.stocks()
    }

    pub fn registry(&self) -> &InstrumentRegistry {
        &self.registry
    }

    pub fn create_portfolio(
        &mut self,
        investor: Investor,
        kind: RiskStrategyKind,
    ) -> Result<&Portfolio, LedgerError> {
        self.create_portfolio_with_strategy(investor, kind.into_strategy())
    }

    /// Like [`create_portfolio`](Self::create_portfolio) with a caller-supplied
    /// risk policy.
    pub fn create_portfolio_with_strategy(
        &mut self,
        investor: Investor,
        strategy: Box<dyn RiskStrategy>,
    ) -> Result<&Portfolio, LedgerError> {
        let id = investor.id;
        if self.portfolios.contains_key(&id) {
            return Err(LedgerError::DuplicatePortfolio { investor: id });
        }
        tracing::debug!(investor = %id, name = %investor.name, strategy = strategy.name(), "created portfolio");
        let portfolio: &Portfolio = self
            .portfolios
            .entry(id)
            .or_insert_with(|| Portfolio::new(investor, strategy));
        Ok(portfolio)
    }

    pub fn portfolio(&self, investor: InvestorId) -> Result<&Portfolio, LedgerError> {
        self.portfolios
            .get(&investor)
            .ok_or(LedgerError::UnknownPortfolio { investor })
    }

    /// Portfolios in investor id order.
    pub fn portfolios(&self) -> impl Iterator<Item = &Portfolio> {
        self.portfolios.values()
    }

    /// Records a trade in the investor's portfolio.
    ///
    /// The symbol must be registered. The trade is checked against the
    /// portfolio's history and the current time from the desk's clock.
    pub fn submit_transaction(&mut self, request: TradeRequest) -> Result<(), LedgerError> {
        let now = self.clock.now();
        let portfolio = self
            .portfolios
            .get_mut(&request.investor)
            .ok_or(LedgerError::UnknownPortfolio {
                investor: request.investor,
            })?;
        let symbol = self.registry.get(&request.symbol)?.symbol().to_string();
        portfolio.add_transaction(
            Transaction {
                investor: request.investor,
                symbol,
                quantity: request.quantity,
                price: request.price,
                date: request.date,
                side: request.side,
            },
            now,
        )
    }

    pub fn net_profit(&self, investor: InvestorId) -> Result<Decimal, LedgerError> {
        self.portfolio(investor).map(Portfolio::net_profit)
    }

    pub fn risk(&self, investor: InvestorId) -> Result<Decimal, LedgerError> {
        self.portfolio(investor).map(Portfolio::risk)
    }

    /// Read-only view of an investor's transactions in execution order.
    pub fn transactions(&self, investor: InvestorId) -> Result<&[Transaction], LedgerError> {
        self.portfolio(investor).map(Portfolio::transactions)
    }

    /// Every recorded transaction, grouped by investor id then execution order.
    pub fn all_transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.portfolios.values().flat_map(Portfolio::transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn desk() -> TradingDesk {
        let mut desk = TradingDesk::with_clock(Box::new(FixedClock(now())));
        desk.register_stock("TCS").unwrap();
        desk.update_stock_price("TCS", dec!(3500)).unwrap();
        desk.create_portfolio(Investor::new(1, "Ravi"), RiskStrategyKind::Conservative)
            .unwrap();
        desk
    }

    fn request(side: Side, quantity: u64) -> TradeRequest {
        TradeRequest {
            investor: InvestorId(1),
            symbol: "TCS".into(),
            quantity,
            price: dec!(3500),
            date: now() - Duration::hours(1),
            side,
        }
    }

    #[test]
    fn submit_and_query() {
        let mut desk = desk();
        desk.submit_transaction(request(Side::Buy, 10)).unwrap();
        assert_eq!(desk.transactions(InvestorId(1)).unwrap().len(), 1);
        assert_eq!(desk.net_profit(InvestorId(1)).unwrap(), dec!(-35000));
        assert_eq!(desk.risk(InvestorId(1)).unwrap(), dec!(1750));
    }

    #[test]
    fn symbol_is_stored_in_canonical_form() {
        let mut desk = desk();
        let mut req = request(Side::Buy, 1);
        req.symbol = "tcs".into();
        desk.submit_transaction(req).unwrap();
        assert_eq!(desk.transactions(InvestorId(1)).unwrap()[0].symbol, "TCS");
    }

    #[test]
    fn unregistered_symbol_is_rejected() {
        let mut desk = desk();
        let mut req = request(Side::Buy, 1);
        req.symbol = "XYZ".into();
        assert!(matches!(
            desk.submit_transaction(req),
            Err(LedgerError::UnknownSymbol { .. })
        ));
    }

    #[test]
    fn missing_portfolio_is_rejected() {
        let mut desk = desk();
        let mut req = request(Side::Buy, 1);
        req.investor = InvestorId(9);
        assert_eq!(
            desk.submit_transaction(req),
            Err(LedgerError::UnknownPortfolio {
                investor: InvestorId(9)
            })
        );
        assert!(desk.net_profit(InvestorId(9)).is_err());
    }

    #[test]
    fn second_portfolio_for_investor_is_rejected() {
        let mut desk = desk();
        let err = desk
            .create_portfolio(Investor::new(1, "Ravi"), RiskStrategyKind::Aggressive)
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::DuplicatePortfolio {
                investor: InvestorId(1)
            }
        );
        assert_eq!(
            desk.portfolio(InvestorId(1)).unwrap().risk_strategy().name(),
            "conservative"
        );
    }

    #[test]
    fn trade_price_is_independent_of_live_price() {
        let mut desk = desk();
        desk.submit_transaction(request(Side::Buy, 10)).unwrap();
        desk.update_stock_price("TCS", dec!(9999)).unwrap();
        assert_eq!(desk.net_profit(InvestorId(1)).unwrap(), dec!(-35000));
    }

    #[test]
    fn all_transactions_spans_portfolios() {
        let mut desk = desk();
        desk.create_portfolio(Investor::new(2, "Amit"), RiskStrategyKind::Aggressive)
            .unwrap();
        desk.submit_transaction(request(Side::Buy, 10)).unwrap();
        let mut req = request(Side::Buy, 5);
        req.investor = InvestorId(2);
        desk.submit_transaction(req).unwrap();
        assert_eq!(desk.all_transactions().count(), 2);
        assert_eq!(desk.portfolios().count(), 2);
    }

    #[test]
    fn desk_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<TradingDesk>();
    }
}
