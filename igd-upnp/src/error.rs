//! Error types for description fetching and parsing.

use thiserror::Error;

/// Failure modes of the discovery pipeline.
///
/// Discovery folds these into logged, empty results at its component
/// boundaries; they surface inside the crate and in diagnostics only.
#[derive(Debug, Error)]
pub enum UpnpError {
    /// Network-related errors (connect failures, HTTP error statuses, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// Description document errors (XML syntax, wrong root element)
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Convenience Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, UpnpError>;
