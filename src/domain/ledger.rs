//! Purchase, redemption and funding planners.
//!
//! Each planner takes point-in-time snapshots of the entities involved and
//! either rejects the request or returns the complete set of updated records
//! to persist. Nothing here touches storage: the service layer resolves the
//! entities, calls a planner, and commits the outcome atomically, so a
//! rejection can never leave partial effects behind.

use chrono::NaiveDateTime;

use super::account::Account;
use super::calendar::TradingCalendar;
use super::error::FundsimError;
use super::fund::{Fund, FundType};
use super::position::Position;
use super::transaction::{Transaction, TransactionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundingKind {
    /// Account-opening credit; also fixes `initial_capital`. Callers must
    /// invoke this exactly once per account, at creation.
    Initial,
    Deposit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FundingOutcome {
    pub account: Account,
    pub transaction: Transaction,
}

pub fn plan_funding(
    account: &Account,
    amount: f64,
    kind: FundingKind,
    now: NaiveDateTime,
) -> Result<FundingOutcome, FundsimError> {
    if amount <= 0.0 {
        return Err(FundsimError::InvalidAmount);
    }

    let mut account = account.clone();
    account.available_balance += amount;
    let tx_kind = match kind {
        FundingKind::Initial => {
            account.initial_capital = amount;
            TransactionKind::InitialFunding
        }
        FundingKind::Deposit => TransactionKind::Deposit,
    };

    let transaction = Transaction::funding(account.id.clone(), tx_kind, amount, now);
    Ok(FundingOutcome {
        account,
        transaction,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseOutcome {
    pub account: Account,
    pub position: Position,
    pub transaction: Transaction,
}

/// Plan a fund purchase.
///
/// Gate order: positive amount, private-equity minimum, investor
/// qualification, trading window, then balance sufficiency against
/// `amount + fee`. A closed market rejects outright — orders are never
/// queued for the next session. Shares are priced at the NAV read here,
/// at execution time; price movement between request and execution is
/// accepted as part of the model.
pub fn plan_purchase(
    account: &Account,
    fund: &Fund,
    position: Option<&Position>,
    amount: f64,
    now: NaiveDateTime,
    calendar: &TradingCalendar,
) -> Result<PurchaseOutcome, FundsimError> {
    if amount <= 0.0 {
        return Err(FundsimError::InvalidAmount);
    }
    if fund.fund_type == FundType::PrivateEquity && amount < fund.min_investment {
        return Err(FundsimError::BelowMinimumInvestment {
            minimum: fund.min_investment,
            offered: amount,
        });
    }
    if fund.fund_type == FundType::PrivateEquity && !account.qualified_investor {
        return Err(FundsimError::NotQualifiedInvestor);
    }
    if !calendar.is_open(now) {
        return Err(FundsimError::MarketClosed);
    }

    let fee = amount * fund.subscription_fee_rate;
    let net_debit = amount + fee;
    if account.available_balance < net_debit {
        return Err(FundsimError::InsufficientFunds {
            required: net_debit,
            available: account.available_balance,
        });
    }

    let mut account = account.clone();
    account.available_balance -= net_debit;

    let shares = amount / fund.current_nav;
    let position = match position {
        Some(existing) => {
            let mut updated = existing.clone();
            updated.apply_purchase(shares, amount);
            updated
        }
        None => Position::open(account.id.clone(), fund.id.clone(), shares, amount, now),
    };

    let transaction =
        Transaction::purchase(account.id.clone(), fund.id.clone(), amount, shares, fee, now);

    Ok(PurchaseOutcome {
        account,
        position,
        transaction,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct RedemptionOutcome {
    pub account: Account,
    /// `None` means the position was fully redeemed and must be deleted —
    /// zero-share records are never persisted.
    pub position: Option<Position>,
    pub transaction: Transaction,
}

/// Plan a redemption.
///
/// The lock-up gate runs before the trading-window gate: a locked position
/// is reported as locked even when the market also happens to be closed.
/// Redemption never touches the position's cost basis.
pub fn plan_redemption(
    account: &Account,
    fund: &Fund,
    position: Option<&Position>,
    shares_to_redeem: f64,
    now: NaiveDateTime,
    calendar: &TradingCalendar,
) -> Result<RedemptionOutcome, FundsimError> {
    if shares_to_redeem <= 0.0 {
        return Err(FundsimError::InvalidAmount);
    }

    let position = position.ok_or_else(|| FundsimError::InvalidRedemption {
        reason: "no position held in this fund".into(),
    })?;
    if position.shares < shares_to_redeem {
        return Err(FundsimError::InvalidRedemption {
            reason: format!(
                "insufficient shares: have {}, requested {}",
                position.shares, shares_to_redeem
            ),
        });
    }

    if fund.fund_type == FundType::PrivateEquity {
        if let Some(lockup_months) = fund.lockup_period_months {
            let held = position.months_held(now);
            if held < lockup_months as i32 {
                return Err(FundsimError::LockupActive {
                    remaining_months: (lockup_months as i32 - held) as u32,
                });
            }
        }
    }

    if !calendar.is_open(now) {
        return Err(FundsimError::MarketClosed);
    }

    let redemption_amount = shares_to_redeem * fund.current_nav;
    let fee = redemption_amount * fund.redemption_fee_rate;
    let net_credit = redemption_amount - fee;

    let mut updated = position.clone();
    let remaining = updated.reduce_shares(shares_to_redeem);
    let position = if remaining <= 0.0 { None } else { Some(updated) };

    let mut account = account.clone();
    account.available_balance += net_credit;

    let transaction = Transaction::redemption(
        account.id.clone(),
        fund.id.clone(),
        redemption_amount,
        shares_to_redeem,
        fee,
        now,
    );

    Ok(RedemptionOutcome {
        account,
        position,
        transaction,
    })
}
