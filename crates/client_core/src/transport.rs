//! HTTP transport for the ingestion and query contracts.

use async_trait::async_trait;
use reqwest::{multipart, Body, Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::Endpoint,
    error::ApiError,
    protocol::{AskQuery, AskResponse, IngestResponse, UPLOAD_FILE_FIELD},
};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::{
    config::{ClientConfig, ConfigError},
    types::SelectedDocument,
};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("question is {actual} bytes once encoded, limit is {limit}")]
    QuestionTooLong { actual: usize, limit: usize },
}

/// The backend collaborator as seen by the controllers.
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn ingest(&self, document: &SelectedDocument) -> Result<IngestResponse, TransportError>;
    async fn ask(&self, question: &str) -> Result<AskResponse, TransportError>;
}

pub struct HttpBackend {
    http: Client,
    ingest_url: Url,
    ask_url: Url,
    max_question_bytes: usize,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            ingest_url: config.endpoint_url(Endpoint::Ingest)?,
            ask_url: config.endpoint_url(Endpoint::Ask)?,
            max_question_bytes: config.max_question_bytes,
        })
    }

    fn endpoint_url(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::Ingest => &self.ingest_url,
            Endpoint::Ask => &self.ask_url,
        }
    }
}

pub(crate) fn encoded_question_len(question: &str) -> usize {
    url::form_urlencoded::byte_serialize(question.as_bytes())
        .map(str::len)
        .sum()
}

async fn decode_success<T: DeserializeOwned>(
    endpoint: Endpoint,
    response: Response,
) -> Result<T, TransportError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let body = ApiError::from_body(&body).map(|e| e.error).unwrap_or(body);
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let bytes = response.bytes().await?;
    debug!(
        method = endpoint.method(),
        endpoint = ?endpoint,
        status = status.as_u16(),
        bytes = bytes.len(),
        "backend response received"
    );
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn ingest(&self, document: &SelectedDocument) -> Result<IngestResponse, TransportError> {
        let content = document.bytes();
        let length = content.len() as u64;
        let part = multipart::Part::stream_with_length(Body::from(content), length)
            .file_name(document.name().to_string())
            .mime_str(document.media_type())?;
        let form = multipart::Form::new().part(UPLOAD_FILE_FIELD, part);

        let response = self
            .http
            .post(self.endpoint_url(Endpoint::Ingest).clone())
            .multipart(form)
            .send()
            .await?;
        decode_success(Endpoint::Ingest, response).await
    }

    async fn ask(&self, question: &str) -> Result<AskResponse, TransportError> {
        let encoded = encoded_question_len(question);
        if encoded > self.max_question_bytes {
            return Err(TransportError::QuestionTooLong {
                actual: encoded,
                limit: self.max_question_bytes,
            });
        }

        let response = self
            .http
            .get(self.endpoint_url(Endpoint::Ask).clone())
            .query(&AskQuery {
                question: question.to_string(),
            })
            .send()
            .await?;
        decode_success(Endpoint::Ask, response).await
    }
}
