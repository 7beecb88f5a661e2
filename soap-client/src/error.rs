//! Error types for the SOAP client

use thiserror::Error;

/// Errors that can occur during SOAP communication
///
/// A SOAP fault is not an error at this layer: fault bodies are dispatched
/// through the message handlers like any other reply body.
#[derive(Debug, Error)]
pub enum SoapError {
    /// Network or HTTP communication error
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// XML parsing error in the reply envelope
    #[error("XML parsing error: {0}")]
    Parse(String),
}

/// Convenience Result type alias for SOAP operations.
pub type Result<T> = std::result::Result<T, SoapError>;
