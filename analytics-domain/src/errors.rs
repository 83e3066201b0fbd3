// Domain errors

use thiserror::Error;

/// Failure of a single geolocation lookup. Always recovered by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("lookup responded with status {0}")]
    Status(u16),
    #[error("lookup transport failed: {0}")]
    Transport(String),
    #[error("lookup response could not be decoded: {0}")]
    Decode(String),
}

/// Failure of one analysis engine. Other engines are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("insufficient data for {engine}: need at least {required} distinct samples, found {available}")]
    InsufficientData {
        engine: &'static str,
        required: usize,
        available: usize,
    },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Serialization(err.to_string())
    }
}
