use thiserror::Error;

/// Top-level error type for the Veritor engine.
///
/// Each variant corresponds to a failure class with its own containment
/// policy: collaborator and assessment failures are recoverable and degrade,
/// configuration errors are returned synchronously to the caller.
#[derive(Debug, Error)]
pub enum VeritorError {
    /// A collaborator subsystem failed to respond or timed out.
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    /// An assessment run could not complete (retried on the next cycle).
    #[error("Assessment error: {0}")]
    Assessment(String),

    /// A remediation attempt was rejected or a step failed.
    #[error("Remediation error: {0}")]
    Remediation(String),

    /// Invalid configuration or an unknown regulation/requirement id.
    #[error("Config error: {0}")]
    Config(String),

    /// A regulatory catalog lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// A cron schedule could not be parsed or has no upcoming fire times.
    #[error("Schedule error: {0}")]
    Schedule(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`VeritorError`].
pub type VeritorResult<T> = Result<T, VeritorError>;
