//! Trading scenarios loaded from configuration and replayed through a desk.
//!
//! A scenario seeds stocks and opening prices, opens one portfolio per
//! investor, submits trades in order and then applies later price updates.
//! Numbered sections (`investor.N`, `trade.N`, `price_update.N`) are processed
//! in ascending `N`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::str::FromStr;
use tracing::{info, warn};

use super::desk::{TradeRequest, TradingDesk};
use super::error::{LedgerError, TradeLedgerError};
use super::investor::{Investor, InvestorId};
use super::risk::RiskStrategyKind;
use super::stock::normalize_symbol;
use super::transaction::Side;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvestorSetup {
    pub investor: Investor,
    pub risk: RiskStrategyKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceUpdate {
    pub symbol: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub symbols: Vec<String>,
    pub opening_prices: Vec<PriceUpdate>,
    pub investors: Vec<InvestorSetup>,
    pub trades: Vec<TradeRequest>,
    pub price_updates: Vec<PriceUpdate>,
}

/// A trade the desk refused, with its position in the scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedTrade {
    pub index: usize,
    pub request: TradeRequest,
    pub error: LedgerError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub accepted: usize,
    pub rejected: Vec<RejectedTrade>,
    pub failed_notifications: usize,
}

pub fn load_scenario(config: &dyn ConfigPort) -> Result<Scenario, TradeLedgerError> {
    let name = config
        .get_string("scenario", "name")
        .unwrap_or_else(|| "Unnamed".to_string());
    let symbols = parse_symbols(config)?;
    let opening_prices = parse_opening_prices(config, &symbols)?;

    let mut investors = Vec::new();
    let mut seen_ids = HashSet::new();
    for (n, section) in numbered_sections(config, "investor")? {
        let setup = parse_investor(config, &section, n)?;
        if !seen_ids.insert(setup.investor.id) {
            return Err(TradeLedgerError::invalid(&section, "id", "duplicate investor id"));
        }
        investors.push(setup);
    }

    let trades = numbered_sections(config, "trade")?
        .into_iter()
        .map(|(_, section)| parse_trade(config, &section, &symbols, &seen_ids))
        .collect::<Result<Vec<_>, _>>()?;

    let price_updates = numbered_sections(config, "price_update")?
        .into_iter()
        .map(|(_, section)| {
            let symbol = known_symbol(config, &section, &symbols)?;
            let price = require_price(config, &section, "price")?;
            Ok(PriceUpdate { symbol, price })
        })
        .collect::<Result<Vec<_>, TradeLedgerError>>()?;

    Ok(Scenario {
        name,
        symbols,
        opening_prices,
        investors,
        trades,
        price_updates,
    })
}

/// Builds the market and portfolios on `desk`, then submits every trade and
/// price update. Rejected trades are recorded and replay continues.
///
/// Setup failures (duplicate symbol, duplicate portfolio) abort the replay.
pub fn replay(scenario: &Scenario, desk: &mut TradingDesk) -> Result<ReplayOutcome, LedgerError> {
    info!(scenario = %scenario.name, trades = scenario.trades.len(), "replaying scenario");
    let mut outcome = ReplayOutcome::default();

    for symbol in &scenario.symbols {
        desk.register_stock(symbol)?;
    }
    for update in &scenario.opening_prices {
        outcome.failed_notifications += desk.update_stock_price(&update.symbol, update.price)?.failed.len();
    }
    for setup in &scenario.investors {
        desk.create_portfolio(setup.investor.clone(), setup.risk)?;
    }

    for (index, request) in scenario.trades.iter().enumerate() {
        match desk.submit_transaction(request.clone()) {
            Ok(()) => outcome.accepted += 1,
            Err(error) => {
                warn!(index, investor = %request.investor, %error, "trade rejected");
                outcome.rejected.push(RejectedTrade {
                    index,
                    request: request.clone(),
                    error,
                });
            }
        }
    }

    for update in &scenario.price_updates {
        outcome.failed_notifications += desk.update_stock_price(&update.symbol, update.price)?.failed.len();
    }
    Ok(outcome)
}

fn parse_symbols(config: &dyn ConfigPort) -> Result<Vec<String>, TradeLedgerError> {
    let raw = match config.get_string("market", "symbols") {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Err(TradeLedgerError::missing("market", "symbols")),
    };
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();
    for token in raw.split(',') {
        let symbol = normalize_symbol(token)
            .map_err(|e| TradeLedgerError::invalid("market", "symbols", e.to_string()))?;
        if !seen.insert(symbol.clone()) {
            return Err(TradeLedgerError::invalid(
                "market",
                "symbols",
                format!("duplicate symbol {symbol}"),
            ));
        }
        symbols.push(symbol);
    }
    Ok(symbols)
}

fn parse_opening_prices(
    config: &dyn ConfigPort,
    symbols: &[String],
) -> Result<Vec<PriceUpdate>, TradeLedgerError> {
    let mut prices = Vec::new();
    for symbol in symbols {
        let key = symbol.to_lowercase();
        if config.get_string("prices", &key).is_some() {
            let price = require_price(config, "prices", &key)?;
            prices.push(PriceUpdate {
                symbol: symbol.clone(),
                price,
            });
        }
    }
    Ok(prices)
}

fn parse_investor(
    config: &dyn ConfigPort,
    section: &str,
    n: u32,
) -> Result<InvestorSetup, TradeLedgerError> {
    let name = match config.get_string(section, "name") {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => return Err(TradeLedgerError::missing(section, "name")),
    };
    let risk = match config.get_string(section, "risk") {
        None => RiskStrategyKind::Conservative,
        Some(s) => {
            RiskStrategyKind::from_str(&s).map_err(|e| TradeLedgerError::invalid(section, "risk", e))?
        }
    };
    Ok(InvestorSetup {
        investor: Investor::new(n, name),
        risk,
    })
}

fn parse_trade(
    config: &dyn ConfigPort,
    section: &str,
    symbols: &[String],
    investors: &HashSet<InvestorId>,
) -> Result<TradeRequest, TradeLedgerError> {
    let investor = config
        .get_string(section, "investor")
        .ok_or_else(|| TradeLedgerError::missing(section, "investor"))?;
    let investor = investor
        .trim()
        .parse::<u32>()
        .map(InvestorId)
        .map_err(|_| TradeLedgerError::invalid(section, "investor", "expected an investor number"))?;
    if !investors.contains(&investor) {
        return Err(TradeLedgerError::invalid(
            section,
            "investor",
            format!("no [investor.{}] section", investor.0),
        ));
    }

    let symbol = known_symbol(config, section, symbols)?;

    let side = config
        .get_string(section, "side")
        .ok_or_else(|| TradeLedgerError::missing(section, "side"))?
        .parse::<Side>()
        .map_err(|e| TradeLedgerError::invalid(section, "side", e))?;

    let quantity = config.get_int(section, "quantity", 0);
    if quantity <= 0 {
        return Err(TradeLedgerError::invalid(
            section,
            "quantity",
            "quantity must be a positive integer",
        ));
    }

    let price = require_price(config, section, "price")?;

    let date = match config.get_string(section, "date") {
        Some(s) => parse_date(&s).ok_or_else(|| {
            TradeLedgerError::invalid(
                section,
                "date",
                "expected YYYY-MM-DD or an RFC 3339 timestamp",
            )
        })?,
        None => return Err(TradeLedgerError::missing(section, "date")),
    };

    Ok(TradeRequest {
        investor,
        symbol,
        quantity: quantity as u64,
        price,
        date,
        side,
    })
}

fn known_symbol(
    config: &dyn ConfigPort,
    section: &str,
    symbols: &[String],
) -> Result<String, TradeLedgerError> {
    let raw = config
        .get_string(section, "symbol")
        .ok_or_else(|| TradeLedgerError::missing(section, "symbol"))?;
    let symbol = normalize_symbol(&raw)
        .map_err(|e| TradeLedgerError::invalid(section, "symbol", e.to_string()))?;
    if !symbols.contains(&symbol) {
        return Err(TradeLedgerError::invalid(
            section,
            "symbol",
            format!("{symbol} is not listed in [market] symbols"),
        ));
    }
    Ok(symbol)
}

fn require_price(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Decimal, TradeLedgerError> {
    let raw = config
        .get_string(section, key)
        .ok_or_else(|| TradeLedgerError::missing(section, key))?;
    let price = Decimal::from_str(raw.trim())
        .map_err(|_| TradeLedgerError::invalid(section, key, "expected a decimal number"))?;
    if price < Decimal::ZERO {
        return Err(TradeLedgerError::invalid(section, key, "price must be non-negative"));
    }
    Ok(price)
}

/// `YYYY-MM-DD` is read as midnight UTC.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn numbered_sections(
    config: &dyn ConfigPort,
    prefix: &str,
) -> Result<Vec<(u32, String)>, TradeLedgerError> {
    let mut numbered = Vec::new();
    for section in config.sections() {
        let Some(suffix) = section
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('.'))
        else {
            continue;
        };
        let n = suffix.parse::<u32>().map_err(|_| {
            TradeLedgerError::invalid(&section, "section", format!("expected [{prefix}.<number>]"))
        })?;
        numbered.push((n, section));
    }
    numbered.sort_by_key(|(n, _)| *n);
    Ok(numbered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;
    use rust_decimal_macros::dec;

    const SCENARIO: &str = r#"
[scenario]
name = Demo

[market]
symbols = TCS, infy

[prices]
tcs = 3500
infy = 1500

[investor.2]
name = Amit
risk = aggressive

[investor.1]
name = Ravi
risk = conservative

[trade.2]
investor = 1
symbol = TCS
side = sell
quantity = 15
price = 3500
date = 2024-01-16

[trade.1]
investor = 1
symbol = tcs
side = buy
quantity = 10
price = 3500
date = 2024-01-15

[trade.3]
investor = 2
symbol = INFY
side = buy
quantity = 5
price = 1500
date = 2024-01-15T09:30:00+05:30

[price_update.1]
symbol = TCS
price = 3600
"#;

    fn scenario() -> Scenario {
        let adapter = FileConfigAdapter::from_string(SCENARIO).unwrap();
        load_scenario(&adapter).unwrap()
    }

    fn load(ini: &str) -> Result<Scenario, TradeLedgerError> {
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        load_scenario(&adapter)
    }

    #[test]
    fn loads_market_and_prices() {
        let s = scenario();
        assert_eq!(s.name, "Demo");
        assert_eq!(s.symbols, vec!["TCS", "INFY"]);
        assert_eq!(s.opening_prices.len(), 2);
        assert_eq!(s.opening_prices[0].price, dec!(3500));
    }

    #[test]
    fn numbered_sections_are_ordered() {
        let s = scenario();
        let ids: Vec<u32> = s.investors.iter().map(|i| i.investor.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(s.trades[0].side, Side::Buy);
        assert_eq!(s.trades[1].side, Side::Sell);
        assert_eq!(s.trades[0].symbol, "TCS");
    }

    #[test]
    fn rfc3339_dates_are_converted_to_utc() {
        let s = scenario();
        assert_eq!(s.trades[2].date, parse_date("2024-01-15T04:00:00Z").unwrap());
    }

    #[test]
    fn replay_records_rejections_and_continues() {
        let s = scenario();
        let mut desk = TradingDesk::new();
        let outcome = replay(&s, &mut desk).unwrap();

        assert_eq!(outcome.accepted, 2);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].index, 1);
        assert!(matches!(outcome.rejected[0].error, LedgerError::Oversell { .. }));
        assert_eq!(desk.stock("TCS").unwrap().price(), dec!(3600));
        assert_eq!(desk.risk(InvestorId(1)).unwrap(), dec!(1750));
    }

    #[test]
    fn missing_symbols_is_reported() {
        let err = load("[scenario]\nname = x\n").unwrap_err();
        assert!(matches!(err, TradeLedgerError::ConfigMissing { key, .. } if key == "symbols"));
    }

    #[test]
    fn duplicate_symbols_are_rejected() {
        let err = load("[market]\nsymbols = TCS,tcs\n").unwrap_err();
        assert!(matches!(err, TradeLedgerError::ConfigInvalid { key, .. } if key == "symbols"));
    }

    #[test]
    fn negative_price_is_rejected() {
        let err = load("[market]\nsymbols = TCS\n[prices]\ntcs = -3\n").unwrap_err();
        assert!(matches!(err, TradeLedgerError::ConfigInvalid { section, .. } if section == "prices"));
    }

    #[test]
    fn unknown_risk_kind_is_rejected() {
        let err = load("[market]\nsymbols = TCS\n[investor.1]\nname = Ravi\nrisk = yolo\n").unwrap_err();
        assert!(matches!(err, TradeLedgerError::ConfigInvalid { key, .. } if key == "risk"));
    }

    #[test]
    fn trade_for_unknown_investor_is_rejected() {
        let ini = "[market]\nsymbols = TCS\n[trade.1]\ninvestor = 3\nsymbol = TCS\nside = buy\nquantity = 1\nprice = 1\ndate = 2024-01-01\n";
        let err = load(ini).unwrap_err();
        assert!(matches!(err, TradeLedgerError::ConfigInvalid { key, .. } if key == "investor"));
    }

    #[test]
    fn trade_with_unlisted_symbol_is_rejected() {
        let ini = "[market]\nsymbols = TCS\n[investor.1]\nname = Ravi\n[trade.1]\ninvestor = 1\nsymbol = XYZ\nside = buy\nquantity = 1\nprice = 1\ndate = 2024-01-01\n";
        let err = load(ini).unwrap_err();
        assert!(matches!(err, TradeLedgerError::ConfigInvalid { key, .. } if key == "symbol"));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let ini = "[market]\nsymbols = TCS\n[investor.1]\nname = Ravi\n[trade.1]\ninvestor = 1\nsymbol = TCS\nside = buy\nquantity = 0\nprice = 1\ndate = 2024-01-01\n";
        let err = load(ini).unwrap_err();
        assert!(matches!(err, TradeLedgerError::ConfigInvalid { key, .. } if key == "quantity"));
    }

    #[test]
    fn bad_date_is_rejected() {
        let ini = "[market]\nsymbols = TCS\n[investor.1]\nname = Ravi\n[trade.1]\ninvestor = 1\nsymbol = TCS\nside = buy\nquantity = 1\nprice = 1\ndate = 01/02/2024\n";
        let err = load(ini).unwrap_err();
        assert!(matches!(err, TradeLedgerError::ConfigInvalid { key, .. } if key == "date"));
    }

    #[test]
    fn non_numeric_section_suffix_is_rejected() {
        let err = load("[market]\nsymbols = TCS\n[trade.first]\ninvestor = 1\n").unwrap_err();
        assert!(matches!(err, TradeLedgerError::ConfigInvalid { section, .. } if section == "trade.first"));
    }

    #[test]
    fn investor_defaults_to_conservative() {
        let s = load("[market]\nsymbols = TCS\n[investor.7]\nname = Lee\n").unwrap();
        assert_eq!(s.investors[0].risk, RiskStrategyKind::Conservative);
        assert_eq!(s.investors[0].investor.id, InvestorId(7));
    }
}
