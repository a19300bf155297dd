//! Plain-text report adapter.

use std::fmt::Write;

use crate::domain::summary::LedgerSummary;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Clone, Default)]
pub struct TextReportAdapter {
    pub title: Option<String>,
}

impl TextReportAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }
}

impl ReportPort for TextReportAdapter {
    fn render(&self, summary: &LedgerSummary) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = write_report(&mut out, self.title.as_deref(), summary);
        out
    }
}

fn write_report(out: &mut String, title: Option<&str>, summary: &LedgerSummary) -> std::fmt::Result {
    if let Some(title) = title {
        writeln!(out, "{title}")?;
        writeln!(out, "{}", "=".repeat(title.chars().count()))?;
        writeln!(out)?;
    }

    writeln!(out, "Portfolios")?;
    if summary.portfolios.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for p in &summary.portfolios {
        writeln!(
            out,
            "  {:<6} {:<16} {:<13} trades={:<4} net={:>14} risk={:>12}",
            p.investor.to_string(),
            p.name,
            p.strategy,
            p.transactions,
            p.net_profit.round_dp(2),
            p.risk.round_dp(2),
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Stocks")?;
    if summary.stocks.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for s in &summary.stocks {
        writeln!(
            out,
            "  {:<8} price={:>12} trades={:<4} volume={}",
            s.symbol,
            s.price.round_dp(2),
            s.transactions,
            s.volume,
        )?;
    }

    writeln!(out)?;
    match summary.most_profitable() {
        Some(p) => writeln!(out, "Most profitable investor: {} ({})", p.name, p.net_profit.round_dp(2))?,
        None => writeln!(out, "Most profitable investor: n/a")?,
    }
    match summary.highest_volume() {
        Some(s) => writeln!(out, "Highest volume stock: {} ({})", s.symbol, s.volume)?,
        None => writeln!(out, "Highest volume stock: n/a")?,
    }
    writeln!(out, "Net amount: {}", summary.net_amount.round_dp(2))?;

    let negative: Vec<&str> = summary
        .negative_returns()
        .map(|p| p.name.as_str())
        .collect();
    if negative.is_empty() {
        writeln!(out, "Negative returns: none")?;
    } else {
        writeln!(out, "Negative returns: {}", negative.join(", "))?;
    }
    Ok(())
}
