use std::time::Duration;
use thiserror::Error;

/// Failures reported by the session store or slot registry.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store backend error: {0}")]
    Backend(String),
    #[error("session fetch cancelled")]
    Cancelled,
    #[error("session fetch timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid slot capacity: {0}")]
    InvalidCapacity(u32),
    #[error("store lock poisoned")]
    Lock,
}

/// The only errors a caller of the analytics engine ever sees.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("invalid period: {0:?}")]
    InvalidPeriod(String),
    #[error("analytics unavailable: {0}")]
    Unavailable(#[from] StoreError),
}
