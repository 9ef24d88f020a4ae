//! Errors raised by the balance engine and the expense store.
//!
//! The engine itself performs no I/O, so [`BalanceError`] only reports
//! malformed input. [`StoreError`] wraps whatever the configured backend
//! reports.
use thiserror::Error;

/// Validation failures of the balance engine.
///
/// `expense` is the position of the offending record in the input slice.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BalanceError {
    #[error("expense #{expense} has a negative price")]
    NegativePrice { expense: usize },
    #[error("expense #{expense} assigns a negative share to \"{user_id}\"")]
    NegativeSplit { expense: usize, user_id: String },
    #[error("balance of \"{user_id}\" overflowed")]
    Overflow { user_id: String },
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// Failures of the expense store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("\"{0}\" group not found")]
    GroupNotFound(String),
    #[error("\"{0}\" group already present")]
    ExistingGroup(String),
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
    #[error(transparent)]
    Encoding(#[from] bson::ser::Error),
}
