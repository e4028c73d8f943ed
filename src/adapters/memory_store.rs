//! In-memory store for tests and demos.
//!
//! A single `RwLock` over all tables; `commit_ledger` applies its whole
//! effect inside one write-lock scope, giving the same all-or-nothing
//! behavior as the SQL adapter's transaction.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::account::Account;
use crate::domain::error::FundsimError;
use crate::domain::fund::Fund;
use crate::domain::position::Position;
use crate::domain::transaction::Transaction;
use crate::ports::store_port::{LedgerCommit, PositionChange, StorePort};

#[derive(Default)]
struct Tables {
    accounts: HashMap<String, Account>,
    funds: Vec<Fund>,
    positions: Vec<Position>,
    transactions: Vec<Transaction>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl StorePort for MemoryStore {
    fn insert_account(&self, account: &Account) -> Result<(), FundsimError> {
        let mut tables = self.write();
        if tables.accounts.contains_key(&account.id) {
            return Err(FundsimError::Store {
                reason: format!("account already exists: {}", account.id),
            });
        }
        tables.accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    fn get_account(&self, user_id: &str) -> Result<Option<Account>, FundsimError> {
        Ok(self.read().accounts.get(user_id).cloned())
    }

    fn insert_fund(&self, fund: &Fund) -> Result<(), FundsimError> {
        let mut tables = self.write();
        if tables.funds.iter().any(|f| f.id == fund.id) {
            return Err(FundsimError::Store {
                reason: format!("fund already exists: {}", fund.id),
            });
        }
        tables.funds.push(fund.clone());
        Ok(())
    }

    fn update_fund(&self, fund: &Fund) -> Result<(), FundsimError> {
        let mut tables = self.write();
        match tables.funds.iter_mut().find(|f| f.id == fund.id) {
            Some(existing) => {
                *existing = fund.clone();
                Ok(())
            }
            None => Err(FundsimError::Store {
                reason: format!("fund not found for update: {}", fund.id),
            }),
        }
    }

    fn get_fund(&self, fund_id: &str) -> Result<Option<Fund>, FundsimError> {
        Ok(self.read().funds.iter().find(|f| f.id == fund_id).cloned())
    }

    fn list_funds(&self) -> Result<Vec<Fund>, FundsimError> {
        Ok(self.read().funds.clone())
    }

    fn get_position(
        &self,
        user_id: &str,
        fund_id: &str,
    ) -> Result<Option<Position>, FundsimError> {
        Ok(self
            .read()
            .positions
            .iter()
            .find(|p| p.user_id == user_id && p.fund_id == fund_id)
            .cloned())
    }

    fn list_positions(&self, user_id: &str) -> Result<Vec<Position>, FundsimError> {
        Ok(self
            .read()
            .positions
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, FundsimError> {
        let mut transactions: Vec<Transaction> = self
            .read()
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        transactions.sort_by_key(|t| t.timestamp);
        Ok(transactions)
    }

    fn commit_ledger(&self, commit: LedgerCommit) -> Result<(), FundsimError> {
        let mut tables = self.write();
        if !tables.accounts.contains_key(&commit.account.id) {
            return Err(FundsimError::Store {
                reason: format!("account not found for commit: {}", commit.account.id),
            });
        }
        tables
            .accounts
            .insert(commit.account.id.clone(), commit.account);
        match commit.position {
            Some(PositionChange::Upsert(position)) => {
                match tables
                    .positions
                    .iter_mut()
                    .find(|p| p.user_id == position.user_id && p.fund_id == position.fund_id)
                {
                    Some(existing) => *existing = position,
                    None => tables.positions.push(position),
                }
            }
            Some(PositionChange::Remove { user_id, fund_id }) => {
                tables
                    .positions
                    .retain(|p| !(p.user_id == user_id && p.fund_id == fund_id));
            }
            None => {}
        }
        tables.transactions.push(commit.transaction);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fund::{FundType, RiskLevel};
    use chrono::NaiveDate;

    fn now() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn sample_fund(id: &str) -> Fund {
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
            subscription_fee_rate: 0.005,
            redemption_fee_rate: 0.0025,
            lockup_period_months: None,
            nav_history: Vec::new(),
        }
    }

    #[test]
    fn account_round_trip() {
        let store = MemoryStore::new();
        let account = Account::new("u1", "alice");
        store.insert_account(&account).unwrap();
        assert_eq!(store.get_account("u1").unwrap(), Some(account));
        assert_eq!(store.get_account("u2").unwrap(), None);
    }

    #[test]
    fn duplicate_account_rejected() {
        let store = MemoryStore::new();
        store.insert_account(&Account::new("u1", "alice")).unwrap();
        assert!(store.insert_account(&Account::new("u1", "bob")).is_err());
    }

    #[test]
    fn fund_update_replaces_whole_record() {
        let store = MemoryStore::new();
        let mut fund = sample_fund("f1");
        store.insert_fund(&fund).unwrap();

        fund.current_nav = 1.25;
        fund.push_nav(now(), 1.25);
        store.update_fund(&fund).unwrap();

        let fetched = store.get_fund("f1").unwrap().unwrap();
        assert!((fetched.current_nav - 1.25).abs() < f64::EPSILON);
        assert_eq!(fetched.nav_history.len(), 1);
    }

    #[test]
    fn update_missing_fund_fails() {
        let store = MemoryStore::new();
        assert!(store.update_fund(&sample_fund("ghost")).is_err());
    }

    #[test]
    fn commit_applies_account_position_transaction() {
        let store = MemoryStore::new();
        store.insert_account(&Account::new("u1", "alice")).unwrap();

        let mut account = Account::new("u1", "alice");
        account.available_balance = 990.0;
        let position = Position::open("u1", "f1", 1000.0, 1000.0, now());
        let tx = Transaction::purchase("u1", "f1", 1000.0, 1000.0, 10.0, now());

        store
            .commit_ledger(LedgerCommit {
                account,
                position: Some(PositionChange::Upsert(position)),
                transaction: tx,
            })
            .unwrap();

        assert!(
            (store.get_account("u1").unwrap().unwrap().available_balance - 990.0).abs() < 1e-9
        );
        assert!(store.get_position("u1", "f1").unwrap().is_some());
        assert_eq!(store.list_transactions("u1").unwrap().len(), 1);
    }

    #[test]
    fn commit_remove_deletes_position() {
        let store = MemoryStore::new();
        store.insert_account(&Account::new("u1", "alice")).unwrap();
        let position = Position::open("u1", "f1", 10.0, 10.0, now());
        store
            .commit_ledger(LedgerCommit {
                account: Account::new("u1", "alice"),
                position: Some(PositionChange::Upsert(position)),
                transaction: Transaction::purchase("u1", "f1", 10.0, 10.0, 0.0, now()),
            })
            .unwrap();

        store
            .commit_ledger(LedgerCommit {
                account: Account::new("u1", "alice"),
                position: Some(PositionChange::Remove {
                    user_id: "u1".into(),
                    fund_id: "f1".into(),
                }),
                transaction: Transaction::redemption("u1", "f1", 10.0, 10.0, 0.0, now()),
            })
            .unwrap();

        assert!(store.get_position("u1", "f1").unwrap().is_none());
        assert_eq!(store.list_transactions("u1").unwrap().len(), 2);
    }

    #[test]
    fn transactions_ordered_by_timestamp() {
        let store = MemoryStore::new();
        store.insert_account(&Account::new("u1", "alice")).unwrap();
        let later = now() + chrono::Duration::hours(2);
        // Committed out of order on purpose.
        store
            .commit_ledger(LedgerCommit {
                account: Account::new("u1", "alice"),
                position: None,
                transaction: Transaction::funding(
                    "u1",
                    crate::domain::transaction::TransactionKind::Deposit,
                    2.0,
                    later,
                ),
            })
            .unwrap();
        store
            .commit_ledger(LedgerCommit {
                account: Account::new("u1", "alice"),
                position: None,
                transaction: Transaction::funding(
                    "u1",
                    crate::domain::transaction::TransactionKind::Deposit,
                    1.0,
                    now(),
                ),
            })
            .unwrap();

        let txs = store.list_transactions("u1").unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].timestamp, now());
        assert_eq!(txs[1].timestamp, later);
    }

    #[test]
    fn positions_filtered_by_user() {
        let store = MemoryStore::new();
        store.insert_account(&Account::new("u1", "alice")).unwrap();
        store.insert_account(&Account::new("u2", "bob")).unwrap();
        for (user, fund) in [("u1", "f1"), ("u1", "f2"), ("u2", "f1")] {
            store
                .commit_ledger(LedgerCommit {
                    account: Account::new(user, "x"),
                    position: Some(PositionChange::Upsert(Position::open(
                        user,
                        fund,
                        1.0,
                        1.0,
                        now(),
                    ))),
                    transaction: Transaction::purchase(user, fund, 1.0, 1.0, 0.0, now()),
                })
                .unwrap();
        }
        assert_eq!(store.list_positions("u1").unwrap().len(), 2);
        assert_eq!(store.list_positions("u2").unwrap().len(), 1);
    }
}
