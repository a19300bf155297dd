#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use tradeledger::domain::desk::{TradeRequest, TradingDesk};
use tradeledger::domain::investor::{Investor, InvestorId};
use tradeledger::domain::notification::HandlerError;
use tradeledger::domain::risk::RiskStrategyKind;
use tradeledger::domain::transaction::Side;
use tradeledger::ports::clock_port::Clock;

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn hours_ago(hours: i64) -> DateTime<Utc> {
    now() - Duration::hours(hours)
}

pub fn fixed_desk() -> TradingDesk {
    TradingDesk::with_clock(Box::new(FixedClock(now())))
}

/// Desk with TCS @ 3500 and INFY @ 1500, Ravi (#1, conservative) and
/// Amit (#2, aggressive).
pub fn seeded_desk() -> TradingDesk {
    let mut desk = fixed_desk();
    desk.register_stock("TCS").unwrap();
    desk.register_stock("INFY").unwrap();
    desk.update_stock_price("TCS", Decimal::from(3500)).unwrap();
    desk.update_stock_price("INFY", Decimal::from(1500)).unwrap();
    desk.create_portfolio(Investor::new(1, "Ravi"), RiskStrategyKind::Conservative)
        .unwrap();
    desk.create_portfolio(Investor::new(2, "Amit"), RiskStrategyKind::Aggressive)
        .unwrap();
    desk
}

pub fn trade(investor: u32, symbol: &str, side: Side, quantity: u64, price: Decimal) -> TradeRequest {
    TradeRequest {
        investor: InvestorId(investor),
        symbol: symbol.to_string(),
        quantity,
        price,
        date: hours_ago(1),
        side,
    }
}

pub type Calls = Arc<Mutex<Vec<(String, Decimal)>>>;

pub fn recording_handler(
    calls: &Calls,
) -> impl FnMut(&str, Decimal) -> Result<(), HandlerError> + Send + 'static {
    let calls = Arc::clone(calls);
    move |symbol, price| {
        calls.lock().unwrap().push((symbol.to_string(), price));
        Ok(())
    }
}
