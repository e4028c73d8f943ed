//! Read-side portfolio queries: holdings and the asset overview.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::error::FundsimError;
use crate::domain::fund::Fund;
use crate::domain::position::Position;
use crate::domain::valuation::{self, AssetOverview};
use crate::ports::store_port::StorePort;

/// A position joined with its fund record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub position: Position,
    pub fund: Fund,
}

pub struct PortfolioService {
    store: Arc<dyn StorePort + Send + Sync>,
}

impl PortfolioService {
    pub fn new(store: Arc<dyn StorePort + Send + Sync>) -> Self {
        PortfolioService { store }
    }

    pub fn get_user_holdings(&self, user_id: &str) -> Result<Vec<Holding>, FundsimError> {
        let positions = self.store.list_positions(user_id)?;
        let mut holdings = Vec::with_capacity(positions.len());
        for position in positions {
            let fund =
                self.store
                    .get_fund(&position.fund_id)?
                    .ok_or_else(|| FundsimError::FundNotFound {
                        fund_id: position.fund_id.clone(),
                    })?;
            holdings.push(Holding { position, fund });
        }
        Ok(holdings)
    }

    pub fn get_user_asset_overview(&self, user_id: &str) -> Result<AssetOverview, FundsimError> {
        let account =
            self.store
                .get_account(user_id)?
                .ok_or_else(|| FundsimError::AccountNotFound {
                    user_id: user_id.to_string(),
                })?;
        let holdings: Vec<(Position, Fund)> = self
            .get_user_holdings(user_id)?
            .into_iter()
            .map(|h| (h.position, h.fund))
            .collect();
        Ok(valuation::asset_overview(&account, &holdings))
    }
}
