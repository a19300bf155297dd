//! Report generation port trait.

use crate::domain::error::TradeLedgerError;
use crate::domain::summary::LedgerSummary;

/// Port for rendering a ledger summary.
pub trait ReportPort {
    fn render(&self, summary: &LedgerSummary) -> String;

    /// Default implementation: renders and writes to `output_path`.
    fn write(&self, summary: &LedgerSummary, output_path: &str) -> Result<(), TradeLedgerError> {
        std::fs::write(output_path, self.render(summary))?;
        Ok(())
    }
}
