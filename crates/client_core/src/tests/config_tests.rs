use super::*;

use std::{
    collections::HashMap,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn temp_config(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("docchat_config_test_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("docchat.toml");
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn missing_base_url_is_an_error() {
    let overrides = SettingsOverrides {
        config_path: None,
        api_base_url: None,
    };
    let err = load_settings_with_env(&overrides, env_from(&[])).expect_err("must fail");
    assert!(matches!(err, ConfigError::MissingBaseUrl));
}

#[test]
fn blank_base_url_counts_as_missing() {
    let err = load_settings_with_env(&SettingsOverrides::default(), env_from(&[("APP__API_BASE_URL", "  ")]))
        .expect_err("must fail");
    assert!(matches!(err, ConfigError::MissingBaseUrl));
}

#[test]
fn rejects_non_http_base_url() {
    let err = ClientConfig::new("ftp://localhost:8000").expect_err("must fail");
    assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));

    let err = ClientConfig::new("localhost:8000").expect_err("must fail");
    assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
}

#[test]
fn endpoint_urls_use_backend_default_paths() {
    let config = ClientConfig::new("http://localhost:8000").expect("config");
    assert_eq!(
        config.endpoint_url(Endpoint::Ingest).expect("ingest").as_str(),
        "http://localhost:8000/upload_pdf/"
    );
    assert_eq!(
        config.endpoint_url(Endpoint::Ask).expect("ask").as_str(),
        "http://localhost:8000/ask/"
    );
    assert_eq!(config.inflight_policy, InflightPolicy::LastResponseWins);
    assert!(config.request_timeout.is_none());
}

#[test]
fn base_url_path_prefix_is_kept() {
    let config = ClientConfig::new("https://rag.example.com/api/v1").expect("config");
    assert_eq!(
        config.endpoint_url(Endpoint::Ask).expect("ask").as_str(),
        "https://rag.example.com/api/v1/ask/"
    );
}

#[test]
fn file_values_are_overridden_by_env_then_cli() {
    let path = temp_config(
        r#"
api_base_url = "http://from-file:8000"
ask_path = "/ask_raw/"
request_timeout_secs = 30
inflight_policy = "cancel_previous"
"#,
    );

    let overrides = SettingsOverrides {
        config_path: Some(path.clone()),
        api_base_url: None,
    };
    let from_file = load_settings_with_env(&overrides, env_from(&[])).expect("file config");
    assert_eq!(from_file.api_base_url.as_str(), "http://from-file:8000/");
    assert_eq!(
        from_file.endpoint_url(Endpoint::Ask).expect("ask").as_str(),
        "http://from-file:8000/ask_raw/"
    );
    assert_eq!(from_file.request_timeout, Some(Duration::from_secs(30)));
    assert_eq!(from_file.inflight_policy, InflightPolicy::CancelPrevious);

    let env = env_from(&[
        ("DOCCHAT_API_BASE_URL", "http://from-docchat-env:8000"),
        ("APP__API_BASE_URL", "http://from-app-env:8000"),
        ("APP__INFLIGHT_POLICY", "last-response-wins"),
    ]);
    let from_env = load_settings_with_env(&overrides, &env).expect("env config");
    assert_eq!(from_env.api_base_url.as_str(), "http://from-app-env:8000/");
    assert_eq!(from_env.inflight_policy, InflightPolicy::LastResponseWins);

    let overrides = SettingsOverrides {
        config_path: Some(path.clone()),
        api_base_url: Some("http://from-cli:9000".to_string()),
    };
    let from_cli = load_settings_with_env(&overrides, &env).expect("cli config");
    assert_eq!(from_cli.api_base_url.as_str(), "http://from-cli:9000/");

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn explicit_config_path_must_exist() {
    let overrides = SettingsOverrides {
        config_path: Some(PathBuf::from("/definitely/not/here/docchat.toml")),
        api_base_url: Some("http://localhost:8000".to_string()),
    };
    let err = load_settings_with_env(&overrides, env_from(&[])).expect_err("must fail");
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn malformed_env_values_are_rejected() {
    let overrides = SettingsOverrides {
        config_path: None,
        api_base_url: Some("http://localhost:8000".to_string()),
    };

    let err = load_settings_with_env(&overrides, env_from(&[("APP__MAX_QUESTION_BYTES", "lots")]))
        .expect_err("must fail");
    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            key: "max_question_bytes",
            ..
        }
    ));

    let err = load_settings_with_env(&overrides, env_from(&[("APP__INFLIGHT_POLICY", "queue")]))
        .expect_err("must fail");
    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            key: "inflight_policy",
            ..
        }
    ));
}

#[test]
fn zero_timeout_means_no_timeout() {
    let overrides = SettingsOverrides {
        config_path: None,
        api_base_url: Some("http://localhost:8000".to_string()),
    };
    let config = load_settings_with_env(&overrides, env_from(&[("APP__REQUEST_TIMEOUT_SECS", "0")]))
        .expect("config");
    assert!(config.request_timeout.is_none());
}
