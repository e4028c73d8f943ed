//! Ledger orchestration: entity resolution, per-user serialization, atomic
//! commits.
//!
//! The business gates themselves live in [`crate::domain::ledger`]; this
//! service resolves the entities from the store, calls the planner while
//! holding a per-user lock, and persists the outcome in one commit. The lock
//! spans the whole read-plan-commit sequence, so concurrent operations on the
//! same account cannot read stale balances or share counts and overwrite each
//! other's writes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::info;
use uuid::Uuid;

use crate::domain::account::Account;
use crate::domain::calendar::TradingCalendar;
use crate::domain::error::FundsimError;
use crate::domain::ledger::{self, FundingKind};
use crate::domain::transaction::Transaction;
use crate::ports::clock_port::ClockPort;
use crate::ports::store_port::{LedgerCommit, PositionChange, StorePort};

pub struct LedgerService {
    store: Arc<dyn StorePort + Send + Sync>,
    clock: Arc<dyn ClockPort + Send + Sync>,
    calendar: TradingCalendar,
    user_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl LedgerService {
    pub fn new(
        store: Arc<dyn StorePort + Send + Sync>,
        clock: Arc<dyn ClockPort + Send + Sync>,
        calendar: TradingCalendar,
    ) -> Self {
        LedgerService {
            store,
            clock,
            calendar,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = lock_unpoisoned(&self.user_locks);
        locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Create an empty account. Funding is a separate step so the opening
    /// credit goes through the same audited path as every later deposit.
    pub fn create_account(
        &self,
        username: &str,
        qualified_investor: bool,
    ) -> Result<Account, FundsimError> {
        let mut account = Account::new(Uuid::new_v4().to_string(), username);
        account.qualified_investor = qualified_investor;
        self.store.insert_account(&account)?;
        info!(user_id = %account.id, username, "account created");
        Ok(account)
    }

    pub fn fund_account(
        &self,
        user_id: &str,
        amount: f64,
        kind: FundingKind,
    ) -> Result<Account, FundsimError> {
        // Amount is validated before any lookup so a bad request never turns
        // into a not-found error.
        if amount <= 0.0 {
            return Err(FundsimError::InvalidAmount);
        }
        let lock = self.user_lock(user_id);
        let _guard = lock_unpoisoned(&lock);

        let account = self.get_account(user_id)?;
        let outcome = ledger::plan_funding(&account, amount, kind, self.clock.now())?;
        self.store.commit_ledger(LedgerCommit {
            account: outcome.account.clone(),
            position: None,
            transaction: outcome.transaction,
        })?;
        info!(user_id, amount, kind = ?kind, "account funded");
        Ok(outcome.account)
    }

    pub fn purchase_fund(
        &self,
        user_id: &str,
        fund_id: &str,
        amount: f64,
    ) -> Result<Transaction, FundsimError> {
        if amount <= 0.0 {
            return Err(FundsimError::InvalidAmount);
        }
        let lock = self.user_lock(user_id);
        let _guard = lock_unpoisoned(&lock);

        let account = self.get_account(user_id)?;
        let fund = self
            .store
            .get_fund(fund_id)?
            .ok_or_else(|| FundsimError::FundNotFound {
                fund_id: fund_id.to_string(),
            })?;
        let position = self.store.get_position(user_id, fund_id)?;

        let outcome = ledger::plan_purchase(
            &account,
            &fund,
            position.as_ref(),
            amount,
            self.clock.now(),
            &self.calendar,
        )?;
        let transaction = outcome.transaction.clone();
        self.store.commit_ledger(LedgerCommit {
            account: outcome.account,
            position: Some(PositionChange::Upsert(outcome.position)),
            transaction: outcome.transaction,
        })?;
        info!(
            user_id,
            fund_id,
            amount,
            shares = transaction.shares,
            fee = transaction.fee,
            "purchase executed"
        );
        Ok(transaction)
    }

    pub fn redeem_fund(
        &self,
        user_id: &str,
        fund_id: &str,
        shares: f64,
    ) -> Result<Transaction, FundsimError> {
        if shares <= 0.0 {
            return Err(FundsimError::InvalidAmount);
        }
        let lock = self.user_lock(user_id);
        let _guard = lock_unpoisoned(&lock);

        // Missing entities read as an invalid redemption rather than a plain
        // not-found: there is nothing to redeem against.
        let account =
            self.store
                .get_account(user_id)?
                .ok_or_else(|| FundsimError::InvalidRedemption {
                    reason: format!("account not found: {user_id}"),
                })?;
        let fund =
            self.store
                .get_fund(fund_id)?
                .ok_or_else(|| FundsimError::InvalidRedemption {
                    reason: format!("fund not found: {fund_id}"),
                })?;
        let position = self.store.get_position(user_id, fund_id)?;

        let outcome = ledger::plan_redemption(
            &account,
            &fund,
            position.as_ref(),
            shares,
            self.clock.now(),
            &self.calendar,
        )?;
        let transaction = outcome.transaction.clone();
        let position_change = match outcome.position {
            Some(updated) => PositionChange::Upsert(updated),
            None => PositionChange::Remove {
                user_id: user_id.to_string(),
                fund_id: fund_id.to_string(),
            },
        };
        self.store.commit_ledger(LedgerCommit {
            account: outcome.account,
            position: Some(position_change),
            transaction: outcome.transaction,
        })?;
        info!(
            user_id,
            fund_id,
            shares,
            amount = transaction.amount,
            fee = transaction.fee,
            "redemption executed"
        );
        Ok(transaction)
    }

    pub fn get_account(&self, user_id: &str) -> Result<Account, FundsimError> {
        self.store
            .get_account(user_id)?
            .ok_or_else(|| FundsimError::AccountNotFound {
                user_id: user_id.to_string(),
            })
    }

    pub fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, FundsimError> {
        self.store.list_transactions(user_id)
    }
}
