//! Port traits at the edges of the ledger core.

pub mod clock_port;
pub mod config_port;
pub mod report_port;
