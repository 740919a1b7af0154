#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TopKError {
    #[error("top-k capacity must be greater than zero")]
    InvalidCapacity,

    #[error("cannot increment '{key}' by a non-positive amount")]
    NonPositiveAmount { key: String },

    #[error("score for '{key}' would overflow")]
    ScoreOverflow { key: String },
}
