use serde::{Deserialize, Serialize};

/// Structured failure classification surfaced to tests and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NoFileSelected,
    UploadTransportError,
    QueryTransportError,
}

impl ErrorKind {
    /// Whether the failure came from talking to the backend, as opposed to a
    /// precondition caught before any request was made.
    pub fn is_transport(self) -> bool {
        !matches!(self, ErrorKind::NoFileSelected)
    }
}

/// Body the backend returns when its own handler raised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Best-effort extraction of the backend's error text from a raw body.
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}
