use std::sync::Arc;

use shared::{domain::Endpoint, error::ErrorKind};
use tokio::sync::{broadcast, watch};

pub mod config;
pub mod error;
mod inflight;
pub mod query;
pub mod session;
pub mod transport;
pub mod types;
pub mod upload;

pub use config::{load_settings, ClientConfig, ConfigError, InflightPolicy, SettingsOverrides};
pub use error::ClientError;
pub use query::QueryController;
pub use session::SessionStore;
pub use transport::{BackendApi, HttpBackend, TransportError};
pub use types::{SelectedDocument, SessionSnapshot, UploadStatus};
pub use upload::UploadController;

use inflight::InflightSlot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A blocking message the user has to acknowledge.
    Prompt(String),
    RequestCompleted { endpoint: Endpoint },
    RequestFailed { kind: ErrorKind },
}

/// Session State plus the two controllers that write into it.
pub struct DocChatClient {
    store: Arc<SessionStore>,
    upload: UploadController,
    query: QueryController,
    events: broadcast::Sender<ClientEvent>,
}

impl DocChatClient {
    pub fn new(config: &ClientConfig) -> Result<Arc<Self>, ConfigError> {
        let backend = HttpBackend::new(config)?;
        Ok(Self::new_with_backend(
            Arc::new(backend),
            config.inflight_policy,
        ))
    }

    pub fn new_with_backend(backend: Arc<dyn BackendApi>, policy: InflightPolicy) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        let store = Arc::new(SessionStore::new());
        Arc::new(Self {
            upload: UploadController::new(
                Arc::clone(&backend),
                Arc::clone(&store),
                events.clone(),
                InflightSlot::new(policy),
            ),
            query: QueryController::new(
                backend,
                Arc::clone(&store),
                events.clone(),
                InflightSlot::new(policy),
            ),
            store,
            events,
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.store.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub fn select_document(&self, document: SelectedDocument) {
        self.store.select_document(document);
    }

    pub fn set_question(&self, question: impl Into<String>) {
        self.store.set_question(question);
    }

    /// Uploads whatever document is currently selected.
    pub async fn upload(&self) -> Result<(), ClientError> {
        let document = self.store.snapshot().document;
        self.upload.submit_upload(document).await
    }

    /// Submits the current question text.
    pub async fn ask(&self) {
        let question = self.store.snapshot().question;
        self.query.submit_question(&question).await;
    }

    pub fn upload_controller(&self) -> &UploadController {
        &self.upload
    }

    pub fn query_controller(&self) -> &QueryController {
        &self.query
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
