use serde::{Deserialize, Serialize};

/// Multipart field name the ingestion endpoint reads the document from.
pub const UPLOAD_FILE_FIELD: &str = "file";
/// Query-string parameter carrying the question text.
pub const QUESTION_PARAM: &str = "question";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskQuery {
    pub question: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_response_tolerates_missing_message() {
        let body: IngestResponse = serde_json::from_str("{}").expect("parse");
        assert!(body.message.is_none());

        let body: IngestResponse =
            serde_json::from_str(r#"{"message":"PDF processed and stored in vector DB"}"#)
                .expect("parse");
        assert_eq!(
            body.message.as_deref(),
            Some("PDF processed and stored in vector DB")
        );
    }

    #[test]
    fn ask_query_uses_question_param() {
        let value = serde_json::to_value(AskQuery {
            question: "What database did the user use?".to_string(),
        })
        .expect("serialize");
        assert!(value.get(QUESTION_PARAM).is_some());
    }

    #[test]
    fn ask_response_rejects_non_string_answer() {
        assert!(serde_json::from_str::<AskResponse>(r#"{"answer":42}"#).is_err());
        let body: AskResponse = serde_json::from_str(r#"{"answer":"PostgreSQL","extra":1}"#)
            .expect("unknown fields are ignored");
        assert_eq!(body.answer.as_deref(), Some("PostgreSQL"));
    }
}
