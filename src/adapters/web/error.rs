//! HTTP error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::error::FundsimError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl From<FundsimError> for ApiError {
    fn from(err: FundsimError) -> Self {
        ApiError {
            status: status_from_error(&err),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub fn status_from_error(err: &FundsimError) -> StatusCode {
    match err {
        FundsimError::AccountNotFound { .. } | FundsimError::FundNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        FundsimError::NotQualifiedInvestor
        | FundsimError::BelowMinimumInvestment { .. }
        | FundsimError::LockupActive { .. } => StatusCode::FORBIDDEN,
        FundsimError::InvalidAmount
        | FundsimError::MarketClosed
        | FundsimError::InsufficientFunds { .. }
        | FundsimError::InvalidRedemption { .. } => StatusCode::BAD_REQUEST,
        FundsimError::Store { .. }
        | FundsimError::ConfigParse { .. }
        | FundsimError::ConfigMissing { .. }
        | FundsimError::ConfigInvalid { .. }
        | FundsimError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_status_mapping() {
        assert_eq!(
            status_from_error(&FundsimError::AccountNotFound {
                user_id: "u1".into()
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_from_error(&FundsimError::NotQualifiedInvestor),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_from_error(&FundsimError::LockupActive {
                remaining_months: 2
            }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_from_error(&FundsimError::MarketClosed),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_from_error(&FundsimError::Store {
                reason: "disk".into()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
