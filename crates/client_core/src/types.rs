use std::{fmt, path::Path};

use anyhow::{anyhow, Context, Result};
use bytes::Bytes;
use shared::domain::FALLBACK_MEDIA_TYPE;

pub const NO_FILE_SELECTED_PROMPT: &str = "Please select a PDF first.";
pub const UPLOADING_TEXT: &str = "Uploading...";
pub const UPLOAD_DEFAULT_MESSAGE: &str = "Upload successful!";
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed.";
pub const ANSWER_FAILED_PLACEHOLDER: &str = "Failed to get answer.";

/// A document the user picked for ingestion. Content is shared so session
/// snapshots stay cheap to clone.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedDocument {
    name: String,
    content: Bytes,
    media_type: String,
}

impl SelectedDocument {
    pub fn new(
        name: impl Into<String>,
        content: impl Into<Bytes>,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            media_type: media_type.into(),
        }
    }

    /// Reads `path` and declares its media type from the file extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow!("'{}' does not name a file", path.display()))?
            .to_string();
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read document '{}'", path.display()))?;
        let media_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(FALLBACK_MEDIA_TYPE);
        Ok(Self::new(name, content, media_type))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// The content as a refcounted buffer, for handing to the http body.
    pub fn bytes(&self) -> Bytes {
        self.content.clone()
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl fmt::Debug for SelectedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedDocument")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("bytes", &self.content.len())
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadStatus {
    #[default]
    Idle,
    InProgress,
    Succeeded(String),
    Failed(String),
}

impl UploadStatus {
    pub fn display_text(&self) -> &str {
        match self {
            UploadStatus::Idle => "",
            UploadStatus::InProgress => UPLOADING_TEXT,
            UploadStatus::Succeeded(message) | UploadStatus::Failed(message) => message,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, UploadStatus::Failed(_))
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, UploadStatus::InProgress)
    }
}

/// Everything the presentation layer renders from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub document: Option<SelectedDocument>,
    pub question: String,
    pub upload_status: UploadStatus,
    pub answer: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text_matches_lifecycle() {
        assert_eq!(UploadStatus::Idle.display_text(), "");
        assert_eq!(UploadStatus::InProgress.display_text(), UPLOADING_TEXT);
        assert_eq!(
            UploadStatus::Succeeded("Indexed 12 pages".into()).display_text(),
            "Indexed 12 pages"
        );
        assert!(UploadStatus::Failed(UPLOAD_FAILED_MESSAGE.into()).is_failure());
        assert!(!UploadStatus::InProgress.is_failure());
    }

    #[test]
    fn debug_does_not_dump_document_bytes() {
        let doc = SelectedDocument::new("report.pdf", b"%PDF".to_vec(), "application/pdf");
        let rendered = format!("{doc:?}");
        assert!(rendered.contains("report.pdf"));
        assert!(rendered.contains("bytes: 4"));
    }

    #[tokio::test]
    async fn from_path_guesses_pdf_media_type() {
        let unique = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("docchat_doc_test_{unique}"));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("report.pdf");
        std::fs::write(&path, b"%PDF-1.7").expect("write");

        let doc = SelectedDocument::from_path(&path).await.expect("read");
        assert_eq!(doc.name(), "report.pdf");
        assert_eq!(doc.media_type(), "application/pdf");
        assert_eq!(doc.content(), b"%PDF-1.7");

        std::fs::remove_dir_all(dir).expect("cleanup");
    }

    #[tokio::test]
    async fn from_path_reports_missing_file() {
        let err = SelectedDocument::from_path("/definitely/not/here.pdf")
            .await
            .expect_err("must fail");
        assert!(err.to_string().contains("failed to read document"));
    }
}
