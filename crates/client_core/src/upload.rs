use std::sync::Arc;

use shared::{domain::Endpoint, protocol::IngestResponse};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::{
    error::ClientError,
    inflight::{join_request, InflightSlot},
    session::SessionStore,
    transport::{BackendApi, TransportError},
    types::{SelectedDocument, UploadStatus, NO_FILE_SELECTED_PROMPT, UPLOAD_DEFAULT_MESSAGE},
    ClientEvent,
};

/// Sends a selected document to the ingestion endpoint and reconciles the
/// outcome into `UploadStatus`.
pub struct UploadController {
    backend: Arc<dyn BackendApi>,
    store: Arc<SessionStore>,
    events: broadcast::Sender<ClientEvent>,
    inflight: Arc<InflightSlot>,
}

impl UploadController {
    pub(crate) fn new(
        backend: Arc<dyn BackendApi>,
        store: Arc<SessionStore>,
        events: broadcast::Sender<ClientEvent>,
        inflight: InflightSlot,
    ) -> Self {
        Self {
            backend,
            store,
            events,
            inflight: Arc::new(inflight),
        }
    }

    /// Fails with `NoFileSelected` before touching any state when `document`
    /// is absent. Transport failures never surface here; they land in
    /// `UploadStatus::Failed`.
    pub async fn submit_upload(&self, document: Option<SelectedDocument>) -> Result<(), ClientError> {
        let Some(document) = document else {
            debug!("upload requested with no document selected");
            let _ = self
                .events
                .send(ClientEvent::Prompt(NO_FILE_SELECTED_PROMPT.to_string()));
            return Err(ClientError::NoFileSelected);
        };

        let ticket = self.inflight.begin();
        self.store.set_upload_status(UploadStatus::InProgress);
        info!(
            file_name = document.name(),
            bytes = document.len(),
            media_type = document.media_type(),
            "uploading document"
        );

        let backend = Arc::clone(&self.backend);
        let store = Arc::clone(&self.store);
        let events = self.events.clone();
        let inflight = Arc::clone(&self.inflight);
        let task = tokio::spawn(async move {
            let result = backend.ingest(&document).await;
            if !inflight.may_apply(ticket) {
                debug!(file_name = document.name(), "discarding superseded upload response");
                return;
            }

            let status = match reconcile_ingest(result) {
                Ok(message) => {
                    info!(file_name = document.name(), %message, "document ingested");
                    let _ = events.send(ClientEvent::RequestCompleted {
                        endpoint: Endpoint::Ingest,
                    });
                    UploadStatus::Succeeded(message)
                }
                Err(err) => {
                    let _ = events.send(ClientEvent::RequestFailed { kind: err.kind() });
                    UploadStatus::Failed(err.to_string())
                }
            };
            store.set_upload_status(status);
            inflight.finish(ticket);
        });
        self.inflight.track(ticket, task.abort_handle());

        join_request(task).await;
        Ok(())
    }
}

fn reconcile_ingest(result: Result<IngestResponse, TransportError>) -> Result<String, ClientError> {
    match result {
        Ok(body) => {
            if let Some(reported) = &body.error {
                warn!(error = %reported, "ingestion endpoint reported an error with a success status");
            }
            Ok(body
                .message
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| UPLOAD_DEFAULT_MESSAGE.to_string()))
        }
        Err(source) => {
            let err = ClientError::UploadTransport(source);
            if let Some(cause) = err.cause() {
                error!(kind = ?err.kind(), error = %cause, "document upload failed");
            }
            Err(err)
        }
    }
}
