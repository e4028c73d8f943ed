//! Price simulation loop, fund seeding and the admin NAV override.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::calendar::TradingCalendar;
use crate::domain::error::FundsimError;
use crate::domain::fund::{Fund, FundType, RiskLevel};
use crate::domain::market::{self, SimulationConfig, TickDraw};
use crate::ports::clock_port::ClockPort;
use crate::ports::store_port::StorePort;

pub struct MarketService {
    store: Arc<dyn StorePort + Send + Sync>,
    clock: Arc<dyn ClockPort + Send + Sync>,
    config: SimulationConfig,
    calendar: TradingCalendar,
    rng: Mutex<StdRng>,
    /// Serializes every fund read-modify-write: the tick snapshots funds and
    /// writes them back whole-record, so an override landing in between
    /// would be erased by the stale write-back.
    fund_lock: Mutex<()>,
}

impl MarketService {
    pub fn new(
        store: Arc<dyn StorePort + Send + Sync>,
        clock: Arc<dyn ClockPort + Send + Sync>,
        config: SimulationConfig,
        calendar: TradingCalendar,
    ) -> Self {
        MarketService {
            store,
            clock,
            config,
            calendar,
            rng: Mutex::new(StdRng::from_entropy()),
            fund_lock: Mutex::new(()),
        }
    }

    /// Deterministic variant for tests.
    pub fn with_seed(
        store: Arc<dyn StorePort + Send + Sync>,
        clock: Arc<dyn ClockPort + Send + Sync>,
        config: SimulationConfig,
        calendar: TradingCalendar,
        seed: u64,
    ) -> Self {
        MarketService {
            store,
            clock,
            config,
            calendar,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            fund_lock: Mutex::new(()),
        }
    }

    /// Insert the starting fund catalogue if the store holds no funds yet.
    /// Returns the funds created, empty when seeding was skipped.
    pub fn seed_initial_funds(&self) -> Result<Vec<Fund>, FundsimError> {
        if !self.store.list_funds()?.is_empty() {
            debug!("funds already present, skipping seed");
            return Ok(Vec::new());
        }

        let nav = self.config.initial_nav;
        let catalogue = vec![
            seed_fund(
                "Steady Growth Private Fund I",
                FundType::PrivateEquity,
                RiskLevel::High,
                nav,
                1_000_000.0,
                0.01,
                0.005,
                Some(6),
            ),
            seed_fund(
                "Balanced Allocation Fund",
                FundType::PublicFund,
                RiskLevel::Medium,
                nav,
                1000.0,
                0.005,
                0.0025,
                None,
            ),
            seed_fund(
                "Stable Income Bond Fund",
                FundType::PublicFund,
                RiskLevel::Low,
                nav,
                100.0,
                0.001,
                0.001,
                None,
            ),
        ];
        for fund in &catalogue {
            self.store.insert_fund(fund)?;
            info!(fund_id = %fund.id, name = %fund.name, "seeded fund");
        }
        Ok(catalogue)
    }

    /// One simulation tick over every fund.
    ///
    /// While the market is closed each fund's daily change resets to zero;
    /// in session each fund takes an independent stochastic step. A store
    /// failure on one fund is logged and skipped, never aborting the rest.
    /// The fund lock is held for the whole pass: no admin override can land
    /// between the snapshot read and the write-back.
    pub fn tick(&self) -> Result<(), FundsimError> {
        let _guard = self.fund_lock.lock().unwrap_or_else(|e| e.into_inner());
        let now = self.clock.now();
        let funds = self.store.list_funds()?;
        let open = self.calendar.is_open(now);

        for mut fund in funds {
            if open {
                let draw = {
                    let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
                    TickDraw {
                        random_factor: rng.gen_range(-1.0..=1.0),
                        trend_factor: rng.r#gen::<f64>(),
                    }
                };
                market::simulate_fund_tick(&mut fund, draw, &self.config, now);
            } else {
                market::apply_closed_market(&mut fund);
            }
            if let Err(err) = self.store.update_fund(&fund) {
                warn!(fund_id = %fund.id, %err, "fund update failed, skipping");
            }
        }
        Ok(())
    }

    /// Administrative NAV override. Applies the percentage directly and
    /// returns the updated fund.
    pub fn set_fund_change(
        &self,
        fund_id: &str,
        change_percentage: f64,
    ) -> Result<Fund, FundsimError> {
        let _guard = self.fund_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut fund =
            self.store
                .get_fund(fund_id)?
                .ok_or_else(|| FundsimError::FundNotFound {
                    fund_id: fund_id.to_string(),
                })?;
        fund.apply_admin_change(change_percentage);
        self.store.update_fund(&fund)?;
        info!(
            fund_id,
            change_percentage,
            nav = fund.current_nav,
            "admin NAV override applied"
        );
        Ok(fund)
    }

    pub fn all_funds(&self) -> Result<Vec<Fund>, FundsimError> {
        self.store.list_funds()
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.config.tick_interval_secs)
    }

    /// Start the background price-update loop. Tick failures are logged and
    /// the loop keeps running.
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let interval = self.tick_interval();
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                timer.tick().await;
                if let Err(err) = self.tick() {
                    warn!(%err, "simulation tick failed");
                }
            }
        })
    }
}

#[allow(clippy::too_many_arguments)]
fn seed_fund(
    name: &str,
    fund_type: FundType,
    risk_level: RiskLevel,
    nav: f64,
    min_investment: f64,
    subscription_fee_rate: f64,
    redemption_fee_rate: f64,
    lockup_period_months: Option<u32>,
) -> Fund {
    Fund {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        fund_type,
        current_nav: nav,
        initial_nav: nav,
        daily_change: 0.0,
        total_return: 0.0,
        risk_level,
        min_investment,
        subscription_fee_rate,
        redemption_fee_rate,
        lockup_period_months,
        nav_history: Vec::new(),
    }
}
