//! Domain error types.

/// Top-level error type for fundsim.
///
/// Every variant except `Store`, the config errors and `Io` is a synchronous
/// request rejection: the operation was refused and no state was touched.
#[derive(Debug, thiserror::Error)]
pub enum FundsimError {
    #[error("amount must be positive")]
    InvalidAmount,

    #[error("account not found: {user_id}")]
    AccountNotFound { user_id: String },

    #[error("fund not found: {fund_id}")]
    FundNotFound { fund_id: String },

    #[error("minimum investment for this fund is {minimum}, offered {offered}")]
    BelowMinimumInvestment { minimum: f64, offered: f64 },

    #[error("qualified investor confirmation required for private equity funds")]
    NotQualifiedInvestor,

    #[error("market is closed; orders are only accepted on trading days during session hours")]
    MarketClosed,

    #[error("insufficient funds: need {required}, available {available}")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("invalid redemption: {reason}")]
    InvalidRedemption { reason: String },

    #[error("fund is in its lock-up period; {remaining_months} month(s) remaining")]
    LockupActive { remaining_months: u32 },

    #[error("store error: {reason}")]
    Store { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FundsimError {
    /// True for errors that reject a caller's request, as opposed to
    /// infrastructure failures.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            FundsimError::Store { .. }
                | FundsimError::ConfigParse { .. }
                | FundsimError::ConfigMissing { .. }
                | FundsimError::ConfigInvalid { .. }
                | FundsimError::Io(_)
        )
    }
}

impl From<&FundsimError> for std::process::ExitCode {
    fn from(err: &FundsimError) -> Self {
        let code: u8 = match err {
            FundsimError::Io(_) => 1,
            FundsimError::ConfigParse { .. }
            | FundsimError::ConfigMissing { .. }
            | FundsimError::ConfigInvalid { .. } => 2,
            FundsimError::Store { .. } => 3,
            _ => 4,
        };
        std::process::ExitCode::from(code)
    }
}
