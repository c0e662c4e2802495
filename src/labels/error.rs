use thiserror::Error;

use super::record::LabelId;

/// Errors surfaced by label operations. None of them leave the session in a
/// partially updated state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown category: {0}")]
    CategoryNotFound(String),

    #[error("no label with id {0} in history")]
    NotFound(LabelId),
}

pub type Result<T> = std::result::Result<T, LabelError>;
