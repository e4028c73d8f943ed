//! Per-user-per-fund holdings.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A holding in one fund. A position with `shares <= 0` must never be
/// persisted; full redemption deletes the record instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub user_id: String,
    pub fund_id: String,
    pub shares: f64,
    /// Cost basis of the currently held shares as a lump sum, NOT per share.
    /// Blended with the purchase amount on each buy; untouched by redemption.
    pub average_cost: f64,
    /// Set on first purchase and never reset; drives lock-up calculations.
    pub acquired_at: NaiveDateTime,
}

impl Position {
    /// Open a fresh position: the cost basis starts as the full purchase amount.
    pub fn open(
        user_id: impl Into<String>,
        fund_id: impl Into<String>,
        shares: f64,
        amount: f64,
        acquired_at: NaiveDateTime,
    ) -> Self {
        Position {
            user_id: user_id.into(),
            fund_id: fund_id.into(),
            shares,
            average_cost: amount,
            acquired_at,
        }
    }

    /// Fold an additional purchase into the position.
    ///
    /// `average_cost = (old_average_cost * old_shares + amount) / new_shares`
    /// — the blend uses the purchase amount, deliberately keeping the cost
    /// basis as a lump figure rather than a per-share average.
    pub fn apply_purchase(&mut self, shares: f64, amount: f64) {
        let new_shares = self.shares + shares;
        self.average_cost = (self.average_cost * self.shares + amount) / new_shares;
        self.shares = new_shares;
    }

    /// Remove redeemed shares. Returns the remaining share count; the caller
    /// deletes the record when it is no longer positive.
    pub fn reduce_shares(&mut self, shares: f64) -> f64 {
        self.shares -= shares;
        self.shares
    }

    pub fn market_value(&self, nav: f64) -> f64 {
        self.shares * nav
    }

    /// Whole calendar months elapsed since acquisition, ignoring day-of-month.
    pub fn months_held(&self, now: NaiveDateTime) -> i32 {
        (now.year() - self.acquired_at.year()) * 12
            + (now.month() as i32 - self.acquired_at.month() as i32)
    }
}
