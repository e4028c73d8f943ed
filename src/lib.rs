//! fundsim — simulated fund-trading ledger and market-pricing service.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! stateful orchestration in [`services`], concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod cli;
