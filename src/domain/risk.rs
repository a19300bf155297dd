//! Risk exposure strategies.
//!
//! A strategy is a pure function of a transaction sequence. Portfolios hold a
//! boxed [`RiskStrategy`] chosen at creation time, so callers can plug in their
//! own policy alongside the built-in [`RiskStrategyKind`] variants.

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use super::transaction::Transaction;

pub trait RiskStrategy: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Risk exposure of `transactions`. Must be non-negative and return zero
    /// for an empty slice.
    fn calculate_risk(&self, transactions: &[Transaction]) -> Decimal;
}

/// Sum of absolute transaction amounts.
pub fn gross_notional(transactions: &[Transaction]) -> Decimal {
    transactions.iter().map(Transaction::notional).sum()
}

/// Risk as a fixed fraction of gross notional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotionalRateRisk {
    name: String,
    rate: Decimal,
}

impl NotionalRateRisk {
    pub fn new(name: impl Into<String>, rate: Decimal) -> Self {
        NotionalRateRisk {
            name: name.into(),
            rate: rate.abs(),
        }
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }
}

impl RiskStrategy for NotionalRateRisk {
    fn name(&self) -> &str {
        &self.name
    }

    fn calculate_risk(&self, transactions: &[Transaction]) -> Decimal {
        gross_notional(transactions).saturating_mul(self.rate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskStrategyKind {
    Conservative,
    Aggressive,
}

impl RiskStrategyKind {
    /// 5% for conservative, 15% for aggressive.
    pub fn rate(self) -> Decimal {
        match self {
            RiskStrategyKind::Conservative => Decimal::new(5, 2),
            RiskStrategyKind::Aggressive => Decimal::new(15, 2),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskStrategyKind::Conservative => "conservative",
            RiskStrategyKind::Aggressive => "aggressive",
        }
    }

    pub fn into_strategy(self) -> Box<dyn RiskStrategy> {
        Box::new(NotionalRateRisk::new(self.label(), self.rate()))
    }
}

impl fmt::Display for RiskStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RiskStrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conservative" => Ok(RiskStrategyKind::Conservative),
            "aggressive" => Ok(RiskStrategyKind::Aggressive),
            other => Err(format!(
                "unknown risk strategy '{other}', expected conservative or aggressive"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::investor::InvestorId;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn trades() -> Vec<Transaction> {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        vec![
            Transaction::buy(InvestorId(1), "TCS", 10, dec!(3500), at),
            Transaction::sell(InvestorId(1), "TCS", 5, dec!(3600), at),
        ]
    }

    #[test]
    fn empty_sequence_has_zero_risk() {
        for kind in [RiskStrategyKind::Conservative, RiskStrategyKind::Aggressive] {
            assert_eq!(kind.into_strategy().calculate_risk(&[]), Decimal::ZERO);
        }
    }

    #[test]
    fn conservative_is_five_percent_of_gross_notional() {
        let risk = RiskStrategyKind::Conservative
            .into_strategy()
            .calculate_risk(&trades());
        // 35000 + 18000 = 53000
        assert_eq!(risk, dec!(2650));
    }

    #[test]
    fn aggressive_is_fifteen_percent_of_gross_notional() {
        let risk = RiskStrategyKind::Aggressive
            .into_strategy()
            .calculate_risk(&trades());
        assert_eq!(risk, dec!(7950));
    }

    #[test]
    fn risk_is_deterministic() {
        let strategy = RiskStrategyKind::Aggressive.into_strategy();
        let t = trades();
        assert_eq!(strategy.calculate_risk(&t), strategy.calculate_risk(&t));
    }

    #[test]
    fn custom_rate_is_non_negative() {
        let strategy = NotionalRateRisk::new("inverted", dec!(-0.10));
        assert_eq!(strategy.rate(), dec!(0.10));
        assert!(strategy.calculate_risk(&trades()) >= Decimal::ZERO);
    }

    #[test]
    fn kind_parses_from_config_text() {
        assert_eq!(
            "Conservative".parse::<RiskStrategyKind>().unwrap(),
            RiskStrategyKind::Conservative
        );
        assert_eq!(
            "aggressive".parse::<RiskStrategyKind>().unwrap(),
            RiskStrategyKind::Aggressive
        );
        assert!("reckless".parse::<RiskStrategyKind>().is_err());
    }

    #[test]
    fn strategy_name_matches_kind() {
        assert_eq!(RiskStrategyKind::Aggressive.into_strategy().name(), "aggressive");
    }
}
