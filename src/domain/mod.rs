//! Core domain types and logic.

pub mod investor;
pub mod stock;
pub mod transaction;
pub mod risk;
pub mod notification;
pub mod registry;
pub mod ledger;
pub mod portfolio;
pub mod desk;
pub mod scenario;
pub mod summary;
pub mod error;
