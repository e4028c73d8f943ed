//! Fund records: NAV state, history ring, admin override math.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// NAV never drops to or below zero; any update is clamped to this floor.
pub const NAV_FLOOR: f64 = 0.0001;

/// NAV history keeps at most one year of samples; the oldest is evicted first.
pub const NAV_HISTORY_CAP: usize = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundType {
    PrivateEquity,
    PublicFund,
}

impl FundType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FundType::PrivateEquity => "PrivateEquity",
            FundType::PublicFund => "PublicFund",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PrivateEquity" => Some(FundType::PrivateEquity),
            "PublicFund" => Some(FundType::PublicFund),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Low" => Some(RiskLevel::Low),
            "Medium" => Some(RiskLevel::Medium),
            "High" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavPoint {
    pub timestamp: NaiveDateTime,
    pub nav: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    pub id: String,
    pub name: String,
    pub fund_type: FundType,
    pub current_nav: f64,
    /// Reference NAV that `total_return` is computed against.
    pub initial_nav: f64,
    pub daily_change: f64,
    pub total_return: f64,
    pub risk_level: RiskLevel,
    pub min_investment: f64,
    pub subscription_fee_rate: f64,
    pub redemption_fee_rate: f64,
    /// Lock-up duration in months; private equity funds only.
    pub lockup_period_months: Option<u32>,
    pub nav_history: Vec<NavPoint>,
}

impl Fund {
    /// Record a NAV sample, evicting the oldest once the cap is exceeded.
    pub fn push_nav(&mut self, timestamp: NaiveDateTime, nav: f64) {
        self.nav_history.push(NavPoint { timestamp, nav });
        if self.nav_history.len() > NAV_HISTORY_CAP {
            self.nav_history.remove(0);
        }
    }

    /// Apply an administrative percentage change, bypassing the stochastic step.
    ///
    /// `new_nav = current_nav * (1 + pct/100)`, clamped to [`NAV_FLOOR`];
    /// `daily_change = new_nav * (pct/100)`.
    pub fn apply_admin_change(&mut self, change_percentage: f64) {
        let new_nav = (self.current_nav * (1.0 + change_percentage / 100.0)).max(NAV_FLOOR);
        self.daily_change = new_nav * (change_percentage / 100.0);
        self.current_nav = new_nav;
    }
}
