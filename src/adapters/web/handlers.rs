//! Request handlers.
//!
//! Services are synchronous over the store, so handlers call them directly;
//! no operation here blocks long enough to justify `spawn_blocking` for a
//! simulated exchange.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use super::{ApiError, AppState};
use crate::domain::account::Account;
use crate::domain::fund::Fund;
use crate::domain::ledger::FundingKind;
use crate::domain::transaction::Transaction;
use crate::domain::valuation::AssetOverview;
use crate::services::portfolio_service::Holding;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetChangeRequest {
    pub change_percentage: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub fund_id: String,
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    pub fund_id: String,
    pub shares: f64,
}

pub async fn list_funds(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Fund>>, ApiError> {
    let funds = state.market.all_funds()?;
    Ok(Json(funds))
}

pub async fn set_fund_change(
    State(state): State<Arc<AppState>>,
    Path(fund_id): Path<String>,
    Json(req): Json<SetChangeRequest>,
) -> Result<Json<Fund>, ApiError> {
    let fund = state
        .market
        .set_fund_change(&fund_id, req.change_percentage)?;
    Ok(Json(fund))
}

pub async fn deposit(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(req): Json<DepositRequest>,
) -> Result<Json<Account>, ApiError> {
    let account = state
        .ledger
        .fund_account(&user_id, req.amount, FundingKind::Deposit)?;
    Ok(Json(account))
}

pub async fn purchase(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(req): Json<PurchaseRequest>,
) -> Result<Json<Transaction>, ApiError> {
    let transaction = state
        .ledger
        .purchase_fund(&user_id, &req.fund_id, req.amount)?;
    Ok(Json(transaction))
}

pub async fn redeem(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(req): Json<RedeemRequest>,
) -> Result<Json<Transaction>, ApiError> {
    let transaction = state
        .ledger
        .redeem_fund(&user_id, &req.fund_id, req.shares)?;
    Ok(Json(transaction))
}

pub async fn asset_overview(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<AssetOverview>, ApiError> {
    let overview = state.portfolio.get_user_asset_overview(&user_id)?;
    Ok(Json(overview))
}

pub async fn holdings(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Holding>>, ApiError> {
    let holdings = state.portfolio.get_user_holdings(&user_id)?;
    Ok(Json(holdings))
}
