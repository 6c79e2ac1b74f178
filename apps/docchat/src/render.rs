//! Renders Session State snapshots to the terminal.

use client_core::{SessionSnapshot, UploadStatus};

/// Lines to print for what changed between two snapshots.
pub fn render_changes(previous: &SessionSnapshot, current: &SessionSnapshot) -> Vec<String> {
    let mut lines = Vec::new();

    if previous.document != current.document {
        if let Some(document) = &current.document {
            lines.push(format!(
                "Selected {} ({} bytes, {})",
                document.name(),
                document.len(),
                document.media_type()
            ));
        }
    }

    if previous.upload_status != current.upload_status {
        if let Some(line) = render_upload_status(&current.upload_status) {
            lines.push(line);
        }
    }

    if previous.answer != current.answer {
        if let Some(answer) = current.answer.as_deref().filter(|a| !a.is_empty()) {
            lines.push(format!("Answer:\n{answer}"));
        }
    }

    lines
}

fn render_upload_status(status: &UploadStatus) -> Option<String> {
    match status {
        UploadStatus::Idle => None,
        UploadStatus::Failed(_) => Some(format!("[upload] error: {}", status.display_text())),
        _ => Some(format!("[upload] {}", status.display_text())),
    }
}

pub fn render_status(snapshot: &SessionSnapshot) -> String {
    let document = snapshot
        .document
        .as_ref()
        .map(|d| format!("{} ({} bytes)", d.name(), d.len()))
        .unwrap_or_else(|| "none".to_string());
    let upload = match &snapshot.upload_status {
        UploadStatus::Idle => "idle".to_string(),
        other => other.display_text().to_string(),
    };
    let answer = snapshot.answer.as_deref().unwrap_or("-");
    format!(
        "document: {document}\nupload:   {upload}\nquestion: {}\nanswer:   {answer}",
        snapshot.question
    )
}
