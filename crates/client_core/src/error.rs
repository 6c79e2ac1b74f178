use shared::error::ErrorKind;
use thiserror::Error;

use crate::{
    transport::TransportError,
    types::{ANSWER_FAILED_PLACEHOLDER, NO_FILE_SELECTED_PROMPT, UPLOAD_FAILED_MESSAGE},
};

/// Failures at the controller boundary. `Display` is the sanitized text shown
/// to the user; the transport cause is only reachable through `source()`.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{}", NO_FILE_SELECTED_PROMPT)]
    NoFileSelected,
    #[error("{}", UPLOAD_FAILED_MESSAGE)]
    UploadTransport(#[source] TransportError),
    #[error("{}", ANSWER_FAILED_PLACEHOLDER)]
    QueryTransport(#[source] TransportError),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::NoFileSelected => ErrorKind::NoFileSelected,
            ClientError::UploadTransport(_) => ErrorKind::UploadTransportError,
            ClientError::QueryTransport(_) => ErrorKind::QueryTransportError,
        }
    }

    pub fn cause(&self) -> Option<&TransportError> {
        match self {
            ClientError::NoFileSelected => None,
            ClientError::UploadTransport(err) | ClientError::QueryTransport(err) => Some(err),
        }
    }
}
