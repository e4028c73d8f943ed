//! Core domain types and logic.

pub mod account;
pub mod calendar;
pub mod error;
pub mod fund;
pub mod ledger;
pub mod market;
pub mod position;
pub mod transaction;
pub mod valuation;
