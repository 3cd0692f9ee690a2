use thiserror::Error;

pub const MISSING_SELECTION_MSG: &str = "Please enter both fighter names";
pub const DUPLICATE_SELECTION_MSG: &str = "Please select two different fighters";
pub const TRANSPORT_FAILURE_MSG: &str =
    "Failed to connect to the prediction server. Please make sure the backend is running.";

/// Every failure the client can run into, from local validation to the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictError {
    #[error("{}", MISSING_SELECTION_MSG)]
    MissingSelection,
    #[error("{}", DUPLICATE_SELECTION_MSG)]
    DuplicateSelection,
    #[error("fighter directory unavailable: {0}")]
    DirectoryUnavailable(String),
    #[error("fighter not found")]
    MetadataNotFound,
    /// Message reported by the prediction service, shown verbatim.
    #[error("{0}")]
    ServiceError(String),
    /// The cause is kept for logs; users only ever see the generic message.
    #[error("{}", TRANSPORT_FAILURE_MSG)]
    TransportFailure(String),
}

impl PredictError {
    pub fn transport(err: &anyhow::Error) -> Self {
        Self::TransportFailure(format!("{err:#}"))
    }

    pub fn directory(err: &anyhow::Error) -> Self {
        Self::DirectoryUnavailable(format!("{err:#}"))
    }

    /// Text for the log console. Includes the transport cause, unlike `Display`.
    pub fn log_detail(&self) -> String {
        match self {
            Self::TransportFailure(cause) => format!("transport failure: {cause}"),
            other => other.to_string(),
        }
    }
}
