use std::sync::Arc;

use shared::{domain::Endpoint, protocol::AskResponse};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::{
    error::ClientError,
    inflight::{join_request, InflightSlot},
    session::SessionStore,
    transport::{BackendApi, TransportError},
    ClientEvent,
};

/// Sends question text to the query endpoint and reconciles the outcome into
/// `Answer`.
pub struct QueryController {
    backend: Arc<dyn BackendApi>,
    store: Arc<SessionStore>,
    events: broadcast::Sender<ClientEvent>,
    inflight: Arc<InflightSlot>,
}

impl QueryController {
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

    /// Blank questions are ignored. Any failure sets the answer placeholder.
    pub async fn submit_question(&self, question: &str) {
        if question.trim().is_empty() {
            return;
        }

        let ticket = self.inflight.begin();
        info!(question_len = question.len(), "submitting question");

        let question = question.to_string();
        let backend = Arc::clone(&self.backend);
        let store = Arc::clone(&self.store);
        let events = self.events.clone();
        let inflight = Arc::clone(&self.inflight);
        let task = tokio::spawn(async move {
            let result = backend.ask(&question).await;
            if !inflight.may_apply(ticket) {
                debug!("discarding superseded answer");
                return;
            }

            let answer = match reconcile_answer(result) {
                Ok(answer) => {
                    info!(answer_len = answer.len(), "answer received");
                    let _ = events.send(ClientEvent::RequestCompleted {
                        endpoint: Endpoint::Ask,
                    });
                    answer
                }
                Err(err) => {
                    let _ = events.send(ClientEvent::RequestFailed { kind: err.kind() });
                    err.to_string()
                }
            };
            store.set_answer(answer);
            inflight.finish(ticket);
        });
        self.inflight.track(ticket, task.abort_handle());

        join_request(task).await;
    }
}

fn reconcile_answer(result: Result<AskResponse, TransportError>) -> Result<String, ClientError> {
    match result {
        Ok(body) => {
            if let Some(reported) = &body.error {
                warn!(error = %reported, "query endpoint reported an error with a success status");
            }
            Ok(body.answer.unwrap_or_default())
        }
        Err(source) => {
            let err = ClientError::QueryTransport(source);
            if let Some(cause) = err.cause() {
                error!(kind = ?err.kind(), error = %cause, "question request failed");
            }
            Err(err)
        }
    }
}
