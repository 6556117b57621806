//! Error types for defparse-core
//!
//! Parsing a definition never fails; these errors belong to the change-event
//! boundary that feeds the parser.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid change event JSON: {0}")]
    InvalidEvent(#[from] serde_json::Error),

    #[error("Change event body must be a JSON object or a JSON-encoded string, got {kind}")]
    UnsupportedBody { kind: &'static str },

    #[error("Change event has no definition")]
    MissingDefinition,

    #[error("Envelope setting not configured: {name}")]
    MissingSetting { name: &'static str },
}
