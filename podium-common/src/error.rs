//! Common error types for Podium

use thiserror::Error;

/// Common result type for Podium operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared across the Podium services
///
/// The attempt lifecycle fails fast: every rejected operation maps to
/// exactly one of these kinds, and no operation retries internally.
#[derive(Error, Debug)]
pub enum Error {
    /// Session creation attempted without a presentation configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Requested session or attempt not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Retry requested while the latest attempt is still pending
    #[error("Attempt in progress: {0}")]
    AttemptInProgress(String),

    /// Analysis start requested while a job is running or already finished
    #[error("Analysis already running: {0}")]
    AlreadyRunning(String),

    /// Self-evaluation rating outside the 1..=5 scale
    #[error("Invalid rating: {0} (must be between 1 and 5)")]
    InvalidRating(i64),

    /// Rating category outside the fixed four-category set
    #[error("Unknown rating category: {0}")]
    UnknownCategory(String),

    /// Commit attempted before both analysis and self-evaluation finished
    #[error("Premature commit: {0}")]
    PrematureCommit(String),

    /// Mutation attempted on an attempt that has already been committed
    #[error("Attempt already committed: {0}")]
    AlreadyCommitted(String),

    /// Failure reported by the analysis job or its score source
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
