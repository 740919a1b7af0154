use crate::topk::TopKError;

#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    #[error(transparent)]
    Capacity(#[from] TopKError),

    #[error("flush period must be greater than zero")]
    InvalidPeriod,

    #[error("observation channel capacity must be greater than zero")]
    InvalidChannelCapacity,

    #[error("aggregation loop already started")]
    AlreadyStarted,

    #[error("aggregation loop not started")]
    NotStarted,

    #[error("failed to launch aggregation loop: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("aggregation loop panicked")]
    LoopPanicked,
}
