#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use fundsim::adapters::clock::FixedClock;
use fundsim::adapters::memory_store::MemoryStore;
use fundsim::domain::account::Account;
use fundsim::domain::calendar::TradingCalendar;
use fundsim::domain::fund::{Fund, FundType, RiskLevel};
use fundsim::domain::ledger::FundingKind;
use fundsim::domain::market::SimulationConfig;
use fundsim::services::ledger_service::LedgerService;
use fundsim::services::market_service::MarketService;
use fundsim::services::portfolio_service::PortfolioService;

/// Monday, mid-session.
pub fn session_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 2)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

/// Saturday, same hour.
pub fn saturday() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 7)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

pub struct TestEnv {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
    pub ledger: Arc<LedgerService>,
    pub market: Arc<MarketService>,
    pub portfolio: Arc<PortfolioService>,
}

/// Full service stack over an in-memory store, with the clock pinned to a
/// weekday session time and a seeded RNG.
pub fn test_env() -> TestEnv {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::new(session_time()));
    let calendar = TradingCalendar::default();

    let ledger = Arc::new(LedgerService::new(store.clone(), clock.clone(), calendar));
    let market = Arc::new(MarketService::with_seed(
        store.clone(),
        clock.clone(),
        SimulationConfig::default(),
        calendar,
        42,
    ));
    let portfolio = Arc::new(PortfolioService::new(store.clone()));

    TestEnv {
        store,
        clock,
        ledger,
        market,
        portfolio,
    }
}

pub fn public_fund(id: &str) -> Fund {
    Fund {
        id: id.into(),
        name: "Balanced Allocation Fund".into(),
        fund_type: FundType::PublicFund,
        current_nav: 1.0,
        initial_nav: 1.0,
        daily_change: 0.0,
        total_return: 0.0,
        risk_level: RiskLevel::Medium,
        min_investment: 1000.0,
        subscription_fee_rate: 0.01,
        redemption_fee_rate: 0.005,
        lockup_period_months: None,
        nav_history: Vec::new(),
    }
}

pub fn private_fund(id: &str) -> Fund {
    Fund {
        id: id.into(),
        name: "Steady Growth Private Fund I".into(),
        fund_type: FundType::PrivateEquity,
        current_nav: 1.0,
        initial_nav: 1.0,
        daily_change: 0.0,
        total_return: 0.0,
        risk_level: RiskLevel::High,
        min_investment: 1_000_000.0,
        subscription_fee_rate: 0.01,
        redemption_fee_rate: 0.005,
        lockup_period_months: Some(6),
        nav_history: Vec::new(),
    }
}

/// No-fee variant; handy when a test cares about share math, not fees.
pub fn no_fee_fund(id: &str) -> Fund {
    let mut fund = public_fund(id);
    fund.subscription_fee_rate = 0.0;
    fund.redemption_fee_rate = 0.0;
    fund
}

/// Create an account and give it an initial balance through the ledger.
pub fn funded_account(env: &TestEnv, username: &str, capital: f64) -> Account {
    let account = env.ledger.create_account(username, false).unwrap();
    env.ledger
        .fund_account(&account.id, capital, FundingKind::Initial)
        .unwrap()
}

pub fn funded_qualified_account(env: &TestEnv, username: &str, capital: f64) -> Account {
    let account = env.ledger.create_account(username, true).unwrap();
    env.ledger
        .fund_account(&account.id, capital, FundingKind::Initial)
        .unwrap()
}
