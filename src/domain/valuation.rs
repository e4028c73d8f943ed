//! Account-level valuation: the asset overview and its history series.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::account::Account;
use super::fund::Fund;
use super::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetOverview {
    pub available_balance: f64,
    pub total_portfolio_value: f64,
    pub total_asset: f64,
    pub total_profit: f64,
    pub total_investment_cost: f64,
    pub asset_history: Vec<AssetPoint>,
}

/// Build the asset overview for one account from its current holdings.
///
/// `total_investment_cost` multiplies each position's shares by its lump
/// cost figure, and every history point is valued as
/// `initial_capital + (nav - first nav sample for that fund) * shares`.
/// Both are approximations inherited from the pricing model: the history
/// series ignores the true timing of purchases and redemptions against the
/// NAV samples. They are kept as-is rather than corrected, so reported
/// figures stay consistent with what the rest of the system computes.
pub fn asset_overview(account: &Account, holdings: &[(Position, Fund)]) -> AssetOverview {
    let total_portfolio_value: f64 = holdings
        .iter()
        .map(|(pos, fund)| pos.market_value(fund.current_nav))
        .sum();
    let total_investment_cost: f64 = holdings
        .iter()
        .map(|(pos, _)| pos.shares * pos.average_cost)
        .sum();
    let total_asset = account.available_balance + total_portfolio_value;
    let total_profit = total_asset - account.initial_capital - total_investment_cost;

    let mut asset_history: Vec<AssetPoint> = Vec::new();
    for (pos, fund) in holdings {
        let Some(first) = fund.nav_history.first() else {
            continue;
        };
        for sample in &fund.nav_history {
            asset_history.push(AssetPoint {
                timestamp: sample.timestamp,
                value: account.initial_capital + (sample.nav - first.nav) * pos.shares,
            });
        }
    }
    asset_history.sort_by_key(|p| p.timestamp);

    AssetOverview {
        available_balance: account.available_balance,
        total_portfolio_value,
        total_asset,
        total_profit,
        total_investment_cost,
        asset_history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fund::{FundType, NavPoint, RiskLevel};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn dt(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn account() -> Account {
        Account {
            id: "u1".into(),
            username: "alice".into(),
            available_balance: 500.0,
            initial_capital: 1000.0,
            qualified_investor: false,
        }
    }

    fn fund(id: &str, nav: f64, history: Vec<NavPoint>) -> Fund {
        Fund {
            id: id.into(),
            name: format!("Fund {id}"),
            fund_type: FundType::PublicFund,
            current_nav: nav,
            initial_nav: 1.0,
            daily_change: 0.0,
            total_return: 0.0,
            risk_level: RiskLevel::Medium,
            min_investment: 100.0,
            subscription_fee_rate: 0.0,
            redemption_fee_rate: 0.0,
            lockup_period_months: None,
            nav_history: history,
        }
    }

    #[test]
    fn empty_holdings_report_balance_only() {
        let overview = asset_overview(&account(), &[]);
        assert!((overview.total_portfolio_value - 0.0).abs() < f64::EPSILON);
        assert!((overview.total_asset - 500.0).abs() < 1e-9);
        // 500 - 1000 - 0
        assert!((overview.total_profit - -500.0).abs() < 1e-9);
        assert!(overview.asset_history.is_empty());
    }

    #[test]
    fn overview_totals() {
        let pos = Position::open("u1", "f1", 100.0, 120.0, dt(2, 10));
        let holdings = vec![(pos, fund("f1", 1.5, Vec::new()))];
        let overview = asset_overview(&account(), &holdings);

        assert_relative_eq!(overview.total_portfolio_value, 150.0);
        assert_relative_eq!(overview.total_asset, 650.0);
        // cost = shares * lump cost = 100 * 120 = 12000
        assert_relative_eq!(overview.total_investment_cost, 12_000.0);
        assert_relative_eq!(overview.total_profit, 650.0 - 1000.0 - 12_000.0);
    }

    #[test]
    fn history_points_offset_from_first_sample() {
        let history = vec![
            NavPoint {
                timestamp: dt(2, 10),
                nav: 1.0,
            },
            NavPoint {
                timestamp: dt(3, 10),
                nav: 1.2,
            },
        ];
        let pos = Position::open("u1", "f1", 50.0, 50.0, dt(2, 10));
        let holdings = vec![(pos, fund("f1", 1.2, history))];
        let overview = asset_overview(&account(), &holdings);

        assert_eq!(overview.asset_history.len(), 2);
        assert!((overview.asset_history[0].value - 1000.0).abs() < 1e-9);
        // 1000 + (1.2 - 1.0) * 50
        assert!((overview.asset_history[1].value - 1010.0).abs() < 1e-9);
    }

    #[test]
    fn history_merged_across_funds_ascending() {
        let h1 = vec![
            NavPoint {
                timestamp: dt(2, 10),
                nav: 1.0,
            },
            NavPoint {
                timestamp: dt(4, 10),
                nav: 1.1,
            },
        ];
        let h2 = vec![NavPoint {
            timestamp: dt(3, 10),
            nav: 2.0,
        }];
        let holdings = vec![
            (
                Position::open("u1", "f1", 10.0, 10.0, dt(2, 10)),
                fund("f1", 1.1, h1),
            ),
            (
                Position::open("u1", "f2", 5.0, 10.0, dt(3, 10)),
                fund("f2", 2.0, h2),
            ),
        ];
        let overview = asset_overview(&account(), &holdings);
        let stamps: Vec<_> = overview.asset_history.iter().map(|p| p.timestamp).collect();
        assert_eq!(stamps, vec![dt(2, 10), dt(3, 10), dt(4, 10)]);
    }

    #[test]
    fn fund_without_history_contributes_no_points() {
        let holdings = vec![(
            Position::open("u1", "f1", 10.0, 10.0, dt(2, 10)),
            fund("f1", 1.0, Vec::new()),
        )];
        let overview = asset_overview(&account(), &holdings);
        assert!(overview.asset_history.is_empty());
    }
}
