//! Storage port trait.

use crate::domain::account::Account;
use crate::domain::error::FundsimError;
use crate::domain::fund::Fund;
use crate::domain::position::Position;
use crate::domain::transaction::Transaction;

/// Position effect of a ledger commit.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionChange {
    Upsert(Position),
    Remove { user_id: String, fund_id: String },
}

/// One ledger operation's full effect, applied atomically: either every
/// record lands or none do. Funding operations carry no position change.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerCommit {
    pub account: Account,
    pub position: Option<PositionChange>,
    pub transaction: Transaction,
}

pub trait StorePort {
    fn insert_account(&self, account: &Account) -> Result<(), FundsimError>;
    fn get_account(&self, user_id: &str) -> Result<Option<Account>, FundsimError>;

    fn insert_fund(&self, fund: &Fund) -> Result<(), FundsimError>;
    /// Whole-record update, NAV history included.
    fn update_fund(&self, fund: &Fund) -> Result<(), FundsimError>;
    fn get_fund(&self, fund_id: &str) -> Result<Option<Fund>, FundsimError>;
    fn list_funds(&self) -> Result<Vec<Fund>, FundsimError>;

    fn get_position(&self, user_id: &str, fund_id: &str)
    -> Result<Option<Position>, FundsimError>;
    fn list_positions(&self, user_id: &str) -> Result<Vec<Position>, FundsimError>;

    /// Ordered by timestamp ascending.
    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, FundsimError>;

    fn commit_ledger(&self, commit: LedgerCommit) -> Result<(), FundsimError>;
}
