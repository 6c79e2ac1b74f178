//! Session State: a single replace-on-write snapshot observable by polling or
//! subscription.

use tokio::sync::watch;

use crate::types::{SelectedDocument, SessionSnapshot, UploadStatus};

pub struct SessionStore {
    tx: watch::Sender<SessionSnapshot>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionSnapshot::default());
        Self { tx }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    /// The returned receiver treats the current snapshot as already seen.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    pub fn select_document(&self, document: SelectedDocument) {
        self.tx.send_modify(|state| state.document = Some(document));
    }

    pub fn set_question(&self, question: impl Into<String>) {
        let question = question.into();
        self.tx.send_modify(|state| state.question = question);
    }

    pub(crate) fn set_upload_status(&self, status: UploadStatus) {
        self.tx.send_modify(|state| state.upload_status = status);
    }

    pub(crate) fn set_answer(&self, answer: impl Into<String>) {
        let answer = answer.into();
        self.tx.send_modify(|state| state.answer = Some(answer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_replace_only_their_own_field() {
        let store = SessionStore::new();
        store.set_question("What database did the user use?");
        store.set_answer("PostgreSQL");
        store.set_upload_status(UploadStatus::Failed("Upload failed.".into()));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.question, "What database did the user use?");
        assert_eq!(snapshot.answer.as_deref(), Some("PostgreSQL"));
        assert!(snapshot.upload_status.is_failure());
        assert!(snapshot.document.is_none());
    }

    #[test]
    fn reselection_replaces_document_wholesale() {
        let store = SessionStore::new();
        store.select_document(SelectedDocument::new("a.pdf", b"a".to_vec(), "application/pdf"));
        store.select_document(SelectedDocument::new("b.txt", b"bb".to_vec(), "text/plain"));

        let document = store.snapshot().document.expect("document");
        assert_eq!(document.name(), "b.txt");
        assert_eq!(document.media_type(), "text/plain");
        assert_eq!(document.len(), 2);
    }

    #[tokio::test]
    async fn subscribers_observe_every_write() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().expect("sender alive"));

        store.set_upload_status(UploadStatus::InProgress);
        rx.changed().await.expect("changed");
        assert!(rx.borrow_and_update().upload_status.is_in_progress());
    }
}
