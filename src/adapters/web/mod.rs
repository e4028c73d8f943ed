//! Web adapter.
//!
//! Axum JSON API over the three services. Handlers stay thin: decode the
//! request, call a service, encode the result.

mod error;
mod handlers;

pub use error::ApiError;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::services::ledger_service::LedgerService;
use crate::services::market_service::MarketService;
use crate::services::portfolio_service::PortfolioService;

pub struct AppState {
    pub ledger: Arc<LedgerService>,
    pub market: Arc<MarketService>,
    pub portfolio: Arc<PortfolioService>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/market/funds", get(handlers::list_funds))
        .route(
            "/api/market/admin/fund/{fund_id}/set-change",
            post(handlers::set_fund_change),
        )
        .route(
            "/api/transactions/{user_id}/deposit",
            post(handlers::deposit),
        )
        .route(
            "/api/transactions/{user_id}/purchase",
            post(handlers::purchase),
        )
        .route(
            "/api/transactions/{user_id}/redeem",
            post(handlers::redeem),
        )
        .route(
            "/api/transactions/{user_id}/overview",
            get(handlers::asset_overview),
        )
        .route(
            "/api/portfolio/{user_id}/holdings",
            get(handlers::holdings),
        )
        .with_state(Arc::new(state))
}
