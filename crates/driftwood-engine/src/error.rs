use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Store(#[from] driftwood_store::StoreError),

    #[error("summary error: {0}")]
    Summary(#[from] driftwood_summary::SummaryError),

    #[error("status check failed: {0}")]
    StatusCheck(String),
}
