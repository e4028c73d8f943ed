//! Stochastic NAV drift — the per-fund tick step.
//!
//! The random draws are sampled by the caller and passed in, so this module
//! stays deterministic and directly testable.

use chrono::NaiveDateTime;

use super::fund::{Fund, NAV_FLOOR, RiskLevel};
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    /// Per-tick volatility factor; doubled for high-risk funds.
    pub base_volatility: f64,
    /// Magnitude of the market trend term.
    pub trend_strength: f64,
    /// NAV that seeded funds start at and reference for total return.
    pub initial_nav: f64,
    /// Seconds between price updates.
    pub tick_interval_secs: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            base_volatility: 0.005,
            trend_strength: 0.0001,
            initial_nav: 1.0,
            tick_interval_secs: 5,
        }
    }
}

impl SimulationConfig {
    pub fn from_config(adapter: &dyn ConfigPort) -> Self {
        let defaults = SimulationConfig::default();
        SimulationConfig {
            base_volatility: adapter.get_double(
                "simulation",
                "base_volatility",
                defaults.base_volatility,
            ),
            trend_strength: adapter.get_double(
                "simulation",
                "trend_strength",
                defaults.trend_strength,
            ),
            initial_nav: adapter.get_double("simulation", "initial_nav", defaults.initial_nav),
            tick_interval_secs: adapter.get_int(
                "simulation",
                "tick_interval_secs",
                defaults.tick_interval_secs as i64,
            ) as u64,
        }
    }
}

/// Random inputs for one fund's tick, sampled once per fund per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickDraw {
    /// Uniform in [-1, 1].
    pub random_factor: f64,
    /// Uniform in [0, 1); shifted by -0.2 so the trend skews slightly negative.
    pub trend_factor: f64,
}

/// Advance one fund by one in-session tick.
///
/// `price_change = nav * (random_factor * daily_volatility + market_trend)`;
/// the new NAV is clamped to [`NAV_FLOOR`] but `daily_change` keeps the
/// pre-clamp change, matching the observed behavior of the model.
pub fn simulate_fund_tick(
    fund: &mut Fund,
    draw: TickDraw,
    config: &SimulationConfig,
    now: NaiveDateTime,
) {
    let daily_volatility = config.base_volatility
        * if fund.risk_level == RiskLevel::High {
            2.0
        } else {
            1.0
        };
    let market_trend = config.trend_strength * (draw.trend_factor - 0.2);

    let price_change = fund.current_nav * (draw.random_factor * daily_volatility + market_trend);
    let new_nav = (fund.current_nav + price_change).max(NAV_FLOOR);

    fund.daily_change = price_change;
    fund.current_nav = new_nav;
    fund.total_return = (new_nav - fund.initial_nav) / fund.initial_nav;
    fund.push_nav(now, new_nav);
}

/// Off-hours and non-trading days: the market is closed, the NAV holds still
/// and the daily change resets.
pub fn apply_closed_market(fund: &mut Fund) {
    fund.daily_change = 0.0;
}
