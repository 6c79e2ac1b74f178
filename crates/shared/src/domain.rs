use serde::{Deserialize, Serialize};

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// The two backend operations the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Ingest,
    Ask,
}

impl Endpoint {
    pub fn default_path(self) -> &'static str {
        match self {
            Endpoint::Ingest => "upload_pdf/",
            Endpoint::Ask => "ask/",
        }
    }

    pub fn method(self) -> &'static str {
        match self {
            Endpoint::Ingest => "POST",
            Endpoint::Ask => "GET",
        }
    }
}
