//! SQLite storage adapter.
//!
//! Ledger commits and fund updates run inside a single transaction each, so
//! a failure at any point rolls the whole write back. NAV history is stored
//! in a side table and rewritten with its fund, keeping `update_fund` a
//! whole-record operation.

use chrono::NaiveDateTime;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Transaction as SqlTransaction, params};

use crate::domain::account::Account;
use crate::domain::error::FundsimError;
use crate::domain::fund::{Fund, FundType, NavPoint, RiskLevel};
use crate::domain::position::Position;
use crate::domain::transaction::{Transaction, TransactionKind, TransactionStatus};
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::{LedgerCommit, PositionChange, StorePort};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

fn db_err<E: std::fmt::Display>(e: E) -> FundsimError {
    FundsimError::Store {
        reason: e.to_string(),
    }
}

fn conversion_err(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, msg.into())
}

fn format_ts(ts: NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

fn parse_ts(idx: usize, s: &str) -> Result<NaiveDateTime, rusqlite::Error> {
    NaiveDateTime::parse_from_str(s, TS_FORMAT)
        .map_err(|e| conversion_err(idx, format!("bad timestamp {s}: {e}")))
}

pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, FundsimError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| FundsimError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;
        let pool_size = config.get_int("sqlite", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(db_err)?;

        Ok(Self { pool })
    }

    /// In-memory database on a single pooled connection (a shared in-memory
    /// database only lives as long as its one connection).
    pub fn in_memory() -> Result<Self, FundsimError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(db_err)?;
        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), FundsimError> {
        let conn = self.pool.get().map_err(db_err)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL,
                available_balance REAL NOT NULL,
                initial_capital REAL NOT NULL,
                qualified_investor INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS funds (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                fund_type TEXT NOT NULL,
                current_nav REAL NOT NULL,
                initial_nav REAL NOT NULL,
                daily_change REAL NOT NULL,
                total_return REAL NOT NULL,
                risk_level TEXT NOT NULL,
                min_investment REAL NOT NULL,
                subscription_fee_rate REAL NOT NULL,
                redemption_fee_rate REAL NOT NULL,
                lockup_period_months INTEGER
            );
            CREATE TABLE IF NOT EXISTS nav_history (
                fund_id TEXT NOT NULL,
                seq INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                nav REAL NOT NULL,
                PRIMARY KEY (fund_id, seq)
            );
            CREATE TABLE IF NOT EXISTS positions (
                user_id TEXT NOT NULL,
                fund_id TEXT NOT NULL,
                shares REAL NOT NULL,
                average_cost REAL NOT NULL,
                acquired_at TEXT NOT NULL,
                PRIMARY KEY (user_id, fund_id)
            );
            CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                fund_id TEXT,
                kind TEXT NOT NULL,
                amount REAL NOT NULL,
                shares REAL,
                fee REAL NOT NULL,
                status TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_transactions_user ON transactions(user_id);
            CREATE INDEX IF NOT EXISTS idx_positions_user ON positions(user_id);",
        )
        .map_err(db_err)?;
        Ok(())
    }

    fn write_account(tx: &SqlTransaction<'_>, account: &Account) -> Result<(), FundsimError> {
        let updated = tx
            .execute(
                "UPDATE accounts
                 SET username = ?2, available_balance = ?3, initial_capital = ?4,
                     qualified_investor = ?5
                 WHERE id = ?1",
                params![
                    account.id,
                    account.username,
                    account.available_balance,
                    account.initial_capital,
                    account.qualified_investor
                ],
            )
            .map_err(db_err)?;
        if updated != 1 {
            return Err(FundsimError::Store {
                reason: format!("account not found for commit: {}", account.id),
            });
        }
        Ok(())
    }

    fn write_fund(tx: &SqlTransaction<'_>, fund: &Fund) -> Result<(), FundsimError> {
        tx.execute(
            "INSERT OR REPLACE INTO funds
             (id, name, fund_type, current_nav, initial_nav, daily_change, total_return,
              risk_level, min_investment, subscription_fee_rate, redemption_fee_rate,
              lockup_period_months)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                fund.id,
                fund.name,
                fund.fund_type.as_str(),
                fund.current_nav,
                fund.initial_nav,
                fund.daily_change,
                fund.total_return,
                fund.risk_level.as_str(),
                fund.min_investment,
                fund.subscription_fee_rate,
                fund.redemption_fee_rate,
                fund.lockup_period_months
            ],
        )
        .map_err(db_err)?;

        tx.execute("DELETE FROM nav_history WHERE fund_id = ?1", params![fund.id])
            .map_err(db_err)?;
        for (seq, point) in fund.nav_history.iter().enumerate() {
            tx.execute(
                "INSERT INTO nav_history (fund_id, seq, timestamp, nav) VALUES (?1, ?2, ?3, ?4)",
                params![fund.id, seq as i64, format_ts(point.timestamp), point.nav],
            )
            .map_err(db_err)?;
        }
        Ok(())
    }

    fn write_transaction(
        tx: &SqlTransaction<'_>,
        transaction: &Transaction,
    ) -> Result<(), FundsimError> {
        tx.execute(
            "INSERT INTO transactions
             (id, user_id, fund_id, kind, amount, shares, fee, status, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                transaction.id,
                transaction.user_id,
                transaction.fund_id,
                transaction.kind.as_str(),
                transaction.amount,
                transaction.shares,
                transaction.fee,
                transaction.status.as_str(),
                format_ts(transaction.timestamp)
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    fn load_nav_history(
        conn: &rusqlite::Connection,
        fund_id: &str,
    ) -> Result<Vec<NavPoint>, FundsimError> {
        let mut stmt = conn
            .prepare("SELECT timestamp, nav FROM nav_history WHERE fund_id = ?1 ORDER BY seq ASC")
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![fund_id], |row| {
                let ts_str: String = row.get(0)?;
                Ok(NavPoint {
                    timestamp: parse_ts(0, &ts_str)?,
                    nav: row.get(1)?,
                })
            })
            .map_err(db_err)?;

        let mut history = Vec::new();
        for row in rows {
            history.push(row.map_err(db_err)?);
        }
        Ok(history)
    }
}

fn fund_from_row(row: &rusqlite::Row<'_>) -> Result<Fund, rusqlite::Error> {
    let fund_type_str: String = row.get(2)?;
    let fund_type = FundType::parse(&fund_type_str)
        .ok_or_else(|| conversion_err(2, format!("unknown fund type: {fund_type_str}")))?;
    let risk_str: String = row.get(7)?;
    let risk_level = RiskLevel::parse(&risk_str)
        .ok_or_else(|| conversion_err(7, format!("unknown risk level: {risk_str}")))?;
    Ok(Fund {
        id: row.get(0)?,
        name: row.get(1)?,
        fund_type,
        current_nav: row.get(3)?,
        initial_nav: row.get(4)?,
        daily_change: row.get(5)?,
        total_return: row.get(6)?,
        risk_level,
        min_investment: row.get(8)?,
        subscription_fee_rate: row.get(9)?,
        redemption_fee_rate: row.get(10)?,
        lockup_period_months: row.get(11)?,
        nav_history: Vec::new(),
    })
}

const FUND_COLUMNS: &str = "id, name, fund_type, current_nav, initial_nav, daily_change, \
                            total_return, risk_level, min_investment, subscription_fee_rate, \
                            redemption_fee_rate, lockup_period_months";

impl StorePort for SqliteStore {
    fn insert_account(&self, account: &Account) -> Result<(), FundsimError> {
        let conn = self.pool.get().map_err(db_err)?;
        conn.execute(
            "INSERT INTO accounts
             (id, username, available_balance, initial_capital, qualified_investor)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                account.id,
                account.username,
                account.available_balance,
                account.initial_capital,
                account.qualified_investor
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    fn get_account(&self, user_id: &str) -> Result<Option<Account>, FundsimError> {
        let conn = self.pool.get().map_err(db_err)?;
        let mut stmt = conn
            .prepare(
                "SELECT id, username, available_balance, initial_capital, qualified_investor
                 FROM accounts WHERE id = ?1",
            )
            .map_err(db_err)?;
        let mut rows = stmt
            .query_map(params![user_id], |row| {
                Ok(Account {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    available_balance: row.get(2)?,
                    initial_capital: row.get(3)?,
                    qualified_investor: row.get(4)?,
                })
            })
            .map_err(db_err)?;
        match rows.next() {
            Some(row) => Ok(Some(row.map_err(db_err)?)),
            None => Ok(None),
        }
    }

    fn insert_fund(&self, fund: &Fund) -> Result<(), FundsimError> {
        let mut conn = self.pool.get().map_err(db_err)?;
        let tx = conn.transaction().map_err(db_err)?;
        Self::write_fund(&tx, fund)?;
        tx.commit().map_err(db_err)?;
        Ok(())
    }

    fn update_fund(&self, fund: &Fund) -> Result<(), FundsimError> {
        let mut conn = self.pool.get().map_err(db_err)?;
        let tx = conn.transaction().map_err(db_err)?;
        let exists: bool = tx
            .query_row(
                "SELECT COUNT(*) FROM funds WHERE id = ?1",
                params![fund.id],
                |row| row.get::<_, i64>(0).map(|n| n > 0),
            )
            .map_err(db_err)?;
        if !exists {
            return Err(FundsimError::Store {
                reason: format!("fund not found for update: {}", fund.id),
            });
        }
        Self::write_fund(&tx, fund)?;
        tx.commit().map_err(db_err)?;
        Ok(())
    }

    fn get_fund(&self, fund_id: &str) -> Result<Option<Fund>, FundsimError> {
        let conn = self.pool.get().map_err(db_err)?;
        let query = format!("SELECT {FUND_COLUMNS} FROM funds WHERE id = ?1");
        let mut stmt = conn.prepare(&query).map_err(db_err)?;
        let mut rows = stmt
            .query_map(params![fund_id], fund_from_row)
            .map_err(db_err)?;
        match rows.next() {
            Some(row) => {
                let mut fund = row.map_err(db_err)?;
                fund.nav_history = Self::load_nav_history(&conn, &fund.id)?;
                Ok(Some(fund))
            }
            None => Ok(None),
        }
    }

    fn list_funds(&self) -> Result<Vec<Fund>, FundsimError> {
        let conn = self.pool.get().map_err(db_err)?;
        let query = format!("SELECT {FUND_COLUMNS} FROM funds ORDER BY name");
        let mut stmt = conn.prepare(&query).map_err(db_err)?;
        let rows = stmt.query_map([], fund_from_row).map_err(db_err)?;

        let mut funds = Vec::new();
        for row in rows {
            funds.push(row.map_err(db_err)?);
        }
        for fund in &mut funds {
            fund.nav_history = Self::load_nav_history(&conn, &fund.id)?;
        }
        Ok(funds)
    }

    fn get_position(
        &self,
        user_id: &str,
        fund_id: &str,
    ) -> Result<Option<Position>, FundsimError> {
        let conn = self.pool.get().map_err(db_err)?;
        let mut stmt = conn
            .prepare(
                "SELECT user_id, fund_id, shares, average_cost, acquired_at
                 FROM positions WHERE user_id = ?1 AND fund_id = ?2",
            )
            .map_err(db_err)?;
        let mut rows = stmt
            .query_map(params![user_id, fund_id], position_from_row)
            .map_err(db_err)?;
        match rows.next() {
            Some(row) => Ok(Some(row.map_err(db_err)?)),
            None => Ok(None),
        }
    }

    fn list_positions(&self, user_id: &str) -> Result<Vec<Position>, FundsimError> {
        let conn = self.pool.get().map_err(db_err)?;
        let mut stmt = conn
            .prepare(
                "SELECT user_id, fund_id, shares, average_cost, acquired_at
                 FROM positions WHERE user_id = ?1 ORDER BY fund_id",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![user_id], position_from_row)
            .map_err(db_err)?;

        let mut positions = Vec::new();
        for row in rows {
            positions.push(row.map_err(db_err)?);
        }
        Ok(positions)
    }

    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, FundsimError> {
        let conn = self.pool.get().map_err(db_err)?;
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, fund_id, kind, amount, shares, fee, status, timestamp
                 FROM transactions WHERE user_id = ?1 ORDER BY timestamp ASC",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                let kind_str: String = row.get(3)?;
                let kind = TransactionKind::parse(&kind_str).ok_or_else(|| {
                    conversion_err(3, format!("unknown transaction kind: {kind_str}"))
                })?;
                let status_str: String = row.get(7)?;
                let status = TransactionStatus::parse(&status_str).ok_or_else(|| {
                    conversion_err(7, format!("unknown transaction status: {status_str}"))
                })?;
                let ts_str: String = row.get(8)?;
                Ok(Transaction {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    fund_id: row.get(2)?,
                    kind,
                    amount: row.get(4)?,
                    shares: row.get(5)?,
                    fee: row.get(6)?,
                    status,
                    timestamp: parse_ts(8, &ts_str)?,
                })
            })
            .map_err(db_err)?;

        let mut transactions = Vec::new();
        for row in rows {
            transactions.push(row.map_err(db_err)?);
        }
        Ok(transactions)
    }

    fn commit_ledger(&self, commit: LedgerCommit) -> Result<(), FundsimError> {
        let mut conn = self.pool.get().map_err(db_err)?;
        let tx = conn.transaction().map_err(db_err)?;

        Self::write_account(&tx, &commit.account)?;
        match &commit.position {
            Some(PositionChange::Upsert(position)) => {
                tx.execute(
                    "INSERT OR REPLACE INTO positions
                     (user_id, fund_id, shares, average_cost, acquired_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        position.user_id,
                        position.fund_id,
                        position.shares,
                        position.average_cost,
                        format_ts(position.acquired_at)
                    ],
                )
                .map_err(db_err)?;
            }
            Some(PositionChange::Remove { user_id, fund_id }) => {
                tx.execute(
                    "DELETE FROM positions WHERE user_id = ?1 AND fund_id = ?2",
                    params![user_id, fund_id],
                )
                .map_err(db_err)?;
            }
            None => {}
        }
        Self::write_transaction(&tx, &commit.transaction)?;

        tx.commit().map_err(db_err)?;
        Ok(())
    }
}

fn position_from_row(row: &rusqlite::Row<'_>) -> Result<Position, rusqlite::Error> {
    let acquired_str: String = row.get(4)?;
    Ok(Position {
        user_id: row.get(0)?,
        fund_id: row.get(1)?,
        shares: row.get(2)?,
        average_cost: row.get(3)?,
        acquired_at: parse_ts(4, &acquired_str)?,
    })
}
