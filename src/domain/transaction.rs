//! Append-only transaction records — the durable audit trail.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    InitialFunding,
    Deposit,
    Purchase,
    Redemption,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::InitialFunding => "InitialFunding",
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Purchase => "Purchase",
            TransactionKind::Redemption => "Redemption",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "InitialFunding" => Some(TransactionKind::InitialFunding),
            "Deposit" => Some(TransactionKind::Deposit),
            "Purchase" => Some(TransactionKind::Purchase),
            "Redemption" => Some(TransactionKind::Redemption),
            _ => None,
        }
    }
}

/// Settlement is synchronous in this design, so every recorded transaction
/// is `Completed`; the enum exists so the wire format states it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Completed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Completed" => Some(TransactionStatus::Completed),
            _ => None,
        }
    }
}

/// Immutable once written; the store exposes no update or delete for these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub fund_id: Option<String>,
    pub kind: TransactionKind,
    pub amount: f64,
    pub shares: Option<f64>,
    pub fee: f64,
    pub status: TransactionStatus,
    pub timestamp: NaiveDateTime,
}

impl Transaction {
    pub fn funding(
        user_id: impl Into<String>,
        kind: TransactionKind,
        amount: f64,
        timestamp: NaiveDateTime,
    ) -> Self {
        Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            fund_id: None,
            kind,
            amount,
            shares: None,
            fee: 0.0,
            status: TransactionStatus::Completed,
            timestamp,
        }
    }

    pub fn purchase(
        user_id: impl Into<String>,
        fund_id: impl Into<String>,
        amount: f64,
        shares: f64,
        fee: f64,
        timestamp: NaiveDateTime,
    ) -> Self {
        Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            fund_id: Some(fund_id.into()),
            kind: TransactionKind::Purchase,
            amount,
            shares: Some(shares),
            fee,
            status: TransactionStatus::Completed,
            timestamp,
        }
    }

    pub fn redemption(
        user_id: impl Into<String>,
        fund_id: impl Into<String>,
        amount: f64,
        shares: f64,
        fee: f64,
        timestamp: NaiveDateTime,
    ) -> Self {
        Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            fund_id: Some(fund_id.into()),
            kind: TransactionKind::Redemption,
            amount,
            shares: Some(shares),
            fee,
            status: TransactionStatus::Completed,
            timestamp,
        }
    }
}
