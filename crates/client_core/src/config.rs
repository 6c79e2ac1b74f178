use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::Deserialize;
use shared::domain::Endpoint;
use thiserror::Error;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "docchat.toml";
pub const DEFAULT_MAX_QUESTION_BYTES: usize = 4096;

/// What a controller does with its previous request when a new one starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InflightPolicy {
    /// Nothing is cancelled; whichever response resolves last is shown.
    #[default]
    LastResponseWins,
    /// The previous request is aborted and its result discarded.
    CancelPrevious,
}

impl FromStr for InflightPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "last_response_wins" => Ok(Self::LastResponseWins),
            "cancel_previous" => Ok(Self::CancelPrevious),
            other => Err(ConfigError::InvalidValue {
                key: "inflight_policy",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("api_base_url is not configured (set it in docchat.toml, DOCCHAT_API_BASE_URL or --api-base-url)")]
    MissingBaseUrl,
    #[error("invalid api_base_url '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: Url,
    pub upload_path: String,
    pub ask_path: String,
    pub request_timeout: Option<Duration>,
    pub max_question_bytes: usize,
    pub inflight_policy: InflightPolicy,
}

impl ClientConfig {
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url(api_base_url)?,
            upload_path: Endpoint::Ingest.default_path().to_string(),
            ask_path: Endpoint::Ask.default_path().to_string(),
            request_timeout: None,
            max_question_bytes: DEFAULT_MAX_QUESTION_BYTES,
            inflight_policy: InflightPolicy::default(),
        })
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url, ConfigError> {
        let path = match endpoint {
            Endpoint::Ingest => &self.upload_path,
            Endpoint::Ask => &self.ask_path,
        };
        self.api_base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ConfigError::InvalidValue {
                key: match endpoint {
                    Endpoint::Ingest => "upload_path",
                    Endpoint::Ask => "ask_path",
                },
                value: format!("{path} ({err})"),
            })
    }
}

/// Values supplied on the command line; they win over every other source.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub config_path: Option<PathBuf>,
    pub api_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    api_base_url: Option<String>,
    upload_path: Option<String>,
    ask_path: Option<String>,
    request_timeout_secs: Option<u64>,
    max_question_bytes: Option<usize>,
    inflight_policy: Option<InflightPolicy>,
}

pub fn load_settings(overrides: &SettingsOverrides) -> Result<ClientConfig, ConfigError> {
    load_settings_with_env(overrides, |key| std::env::var(key).ok())
}

/// Layers the config file, then environment, then `overrides`.
pub fn load_settings_with_env(
    overrides: &SettingsOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig, ConfigError> {
    let mut file_cfg = match &overrides.config_path {
        Some(path) => read_config_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                read_config_file(default_path)?
            } else {
                FileSettings::default()
            }
        }
    };

    if let Some(v) = env("DOCCHAT_API_BASE_URL") {
        file_cfg.api_base_url = Some(v);
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        file_cfg.api_base_url = Some(v);
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        file_cfg.request_timeout_secs = Some(v.parse().map_err(|_| ConfigError::InvalidValue {
            key: "request_timeout_secs",
            value: v.clone(),
        })?);
    }
    if let Some(v) = env("APP__MAX_QUESTION_BYTES") {
        file_cfg.max_question_bytes = Some(v.parse().map_err(|_| ConfigError::InvalidValue {
            key: "max_question_bytes",
            value: v.clone(),
        })?);
    }
    if let Some(v) = env("APP__INFLIGHT_POLICY") {
        file_cfg.inflight_policy = Some(v.parse()?);
    }
    if let Some(v) = &overrides.api_base_url {
        file_cfg.api_base_url = Some(v.clone());
    }

    let base = file_cfg
        .api_base_url
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingBaseUrl)?;

    let mut config = ClientConfig::new(base)?;
    if let Some(v) = file_cfg.upload_path {
        config.upload_path = v;
    }
    if let Some(v) = file_cfg.ask_path {
        config.ask_path = v;
    }
    config.request_timeout = file_cfg
        .request_timeout_secs
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);
    if let Some(v) = file_cfg.max_question_bytes {
        if v == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_question_bytes",
                value: v.to_string(),
            });
        }
        config.max_question_bytes = v;
    }
    if let Some(v) = file_cfg.inflight_policy {
        config.inflight_policy = v;
    }

    // Fail on bad paths at load time rather than on first request.
    config.endpoint_url(Endpoint::Ingest)?;
    config.endpoint_url(Endpoint::Ask)?;

    Ok(config)
}

fn read_config_file(path: &Path) -> Result<FileSettings, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        value: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }

    // Url::join drops the last path segment unless it ends with '/'.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
