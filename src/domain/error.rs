//! Domain error types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::investor::InvestorId;

/// Validation failure raised by the ledger core.
///
/// Every variant is recoverable. An operation that returns one of these has
/// left registry and portfolio state untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("symbol {symbol} is already registered")]
    DuplicateSymbol { symbol: String },

    #[error("unknown symbol: {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("invalid symbol: {symbol:?}")]
    InvalidSymbol { symbol: String },

    #[error("invalid price for {symbol}: {price}")]
    InvalidPrice { symbol: String, price: Decimal },

    #[error("invalid quantity for {symbol}: must be positive")]
    InvalidQuantity { symbol: String },

    #[error("trade amount for {symbol} is too large to record")]
    AmountOverflow { symbol: String },

    #[error("trade dated {date} is after submission time {now}")]
    FutureDatedTrade {
        date: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("cannot sell {requested} {symbol}: only {owned} held")]
    Oversell {
        symbol: String,
        requested: u64,
        owned: i128,
    },

    #[error("trade for investor {actual} submitted to portfolio of investor {expected}")]
    InvestorMismatch {
        expected: InvestorId,
        actual: InvestorId,
    },

    #[error("investor {investor} already has a portfolio")]
    DuplicatePortfolio { investor: InvestorId },

    #[error("no portfolio for investor {investor}")]
    UnknownPortfolio { investor: InvestorId },
}

/// Top-level error type for tradeledger.
#[derive(Debug, thiserror::Error)]
pub enum TradeLedgerError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradeLedgerError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        TradeLedgerError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(section: &str, key: &str) -> Self {
        TradeLedgerError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }
}

impl From<&TradeLedgerError> for std::process::ExitCode {
    fn from(err: &TradeLedgerError) -> Self {
        let code: u8 = match err {
            TradeLedgerError::Io(_) => 1,
            TradeLedgerError::ConfigParse { .. }
            | TradeLedgerError::ConfigMissing { .. }
            | TradeLedgerError::ConfigInvalid { .. } => 2,
            TradeLedgerError::Ledger(_) => 3,
        };
        std::process::ExitCode::from(code)
    }
}
