//! User accounts: simulated cash balance and investor status.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub username: String,
    /// Cash on hand; never allowed to go negative.
    pub available_balance: f64,
    /// Cash credited at account opening; fixed once set.
    pub initial_capital: f64,
    /// Gate for private equity purchases.
    pub qualified_investor: bool,
}

impl Account {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Account {
            id: id.into(),
            username: username.into(),
            available_balance: 0.0,
            initial_capital: 0.0,
            qualified_investor: false,
        }
    }
}
