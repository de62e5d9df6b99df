use thiserror::Error;

/// Failure taxonomy for one batch invocation.
///
/// Every variant aborts the invocation. Malformed record bodies are not
/// represented here; see [`crate::contract::BodyParse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("credential error: {0}")]
    Credential(String),

    #[error("database connection error: {0}")]
    Connection(String),

    #[error("audit write error: {0}")]
    Write(String),

    #[error("archive storage error: {0}")]
    Storage(String),
}

impl IngestError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Credential(_) => "credential",
            Self::Connection(_) => "connection",
            Self::Write(_) => "write",
            Self::Storage(_) => "storage",
        }
    }
}
