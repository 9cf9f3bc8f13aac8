//! Tests for config module.

use super::*;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

// ==================== Duration parsing tests ====================

#[test]
fn test_parse_duration_seconds() {
    let d = duration::parse_duration("30s").unwrap();
    assert_eq!(d, Duration::from_secs(30));
}

#[test]
fn test_parse_duration_minutes() {
    let d = duration::parse_duration("5m").unwrap();
    assert_eq!(d, Duration::from_secs(300));
}

#[test]
fn test_parse_duration_milliseconds() {
    let d = duration::parse_duration("250ms").unwrap();
    assert_eq!(d, Duration::from_millis(250));
}

#[test]
fn test_parse_duration_bare_number_is_seconds() {
    let d = duration::parse_duration("12").unwrap();
    assert_eq!(d, Duration::from_secs(12));
}

#[test]
fn test_parse_duration_invalid_unit() {
    let result = duration::parse_duration("10d");
    assert!(result.unwrap_err().contains("unknown duration unit"));
}

#[test]
fn test_parse_duration_invalid_number() {
    let result = duration::parse_duration("abc");
    assert!(result.unwrap_err().contains("invalid duration value"));
}

#[test]
fn test_parse_duration_out_of_range() {
    let result = duration::parse_duration("99999999999999999999h");
    assert!(result.unwrap_err().contains("out of range"));
}

#[test]
fn test_load_rejects_overflowing_ttl() {
    let yaml = r#"
app:
  name: risk
  env: development

cache:
  ttl: 99999999999999999999h
"#;
    assert!(matches!(from_yaml(yaml), Err(ConfigError::Parse(_))));
}

// ==================== YAML field loading tests ====================

/// Parse config from YAML string (for testing).
fn from_yaml(yaml: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_yaml::from_str(yaml)?;
    Ok(config)
}

fn minimal_valid_yaml() -> String {
    r#"
app:
  name: tradovate-risk
  env: development
"#
    .to_string()
}

#[test]
fn test_load_app_fields() {
    let yaml = r#"
app:
  name: risk
  env: production
  log_level: debug
"#;
    let cfg = from_yaml(yaml).unwrap();

    assert_eq!(cfg.app.name, "risk");
    assert_eq!(cfg.app.env, "production");
    assert_eq!(cfg.app.log_level, Some("debug".to_string()));
    assert!(!cfg.app.is_development());
}

#[test]
fn test_tradovate_defaults_to_demo() {
    let cfg = from_yaml(&minimal_valid_yaml()).unwrap();

    assert_eq!(cfg.tradovate.environment, Environment::Demo);
    assert_eq!(
        cfg.tradovate.base_url_for(Environment::Demo),
        "https://demo.tradovateapi.com/v1"
    );
    assert_eq!(
        cfg.tradovate.base_url_for(Environment::Live),
        "https://live.tradovateapi.com/v1"
    );
}

#[test]
fn test_tradovate_base_url_override() {
    let yaml = r#"
app:
  name: risk
  env: development

tradovate:
  environment: live
  base_url: http://127.0.0.1:9000/v1/
"#;
    let cfg = from_yaml(yaml).unwrap();

    assert_eq!(cfg.tradovate.environment, Environment::Live);
    // Override applies to both environments and drops the trailing slash
    assert_eq!(
        cfg.tradovate.base_url_for(Environment::Demo),
        "http://127.0.0.1:9000/v1"
    );
}

#[test]
fn test_load_server_fields() {
    let yaml = r#"
app:
  name: risk
  env: development

server:
  host: 127.0.0.1
  port: 8080
"#;
    let cfg = from_yaml(yaml).unwrap();
    assert_eq!(cfg.server().bind_address(), "127.0.0.1:8080");
}

#[test]
fn test_load_session_ttl() {
    let yaml = r#"
app:
  name: risk
  env: development

server:
  session_ttl: 15m
"#;
    let cfg = from_yaml(yaml).unwrap();
    assert_eq!(cfg.server().session_ttl(), Duration::from_secs(900));
}

#[test]
fn test_server_defaults() {
    let cfg = from_yaml(&minimal_valid_yaml()).unwrap();
    assert_eq!(cfg.server().bind_address(), "0.0.0.0:4000");
    assert_eq!(cfg.server().session_ttl(), DEFAULT_SESSION_TTL);
}

#[test]
fn test_load_cache_fields() {
    let yaml = r#"
app:
  name: risk
  env: development

cache:
  enabled: true
  ttl: 2m
"#;
    let cfg = from_yaml(yaml).unwrap();
    assert_eq!(cfg.cache_ttl(), Some(Duration::from_secs(120)));
}

#[test]
fn test_cache_disabled() {
    let yaml = r#"
app:
  name: risk
  env: development

cache:
  enabled: false
  ttl: 2m
"#;
    let cfg = from_yaml(yaml).unwrap();
    assert_eq!(cfg.cache_ttl(), None);
}

#[test]
fn test_cache_defaults_when_absent() {
    let cfg = from_yaml(&minimal_valid_yaml()).unwrap();
    assert_eq!(cfg.cache_ttl(), Some(DEFAULT_CACHE_TTL));
}

#[test]
fn test_load_oauth_fields() {
    let yaml = r#"
app:
  name: risk
  env: development

oauth:
  enabled: true
  redirect_uri: http://localhost:4000/oauth/callback
"#;
    let cfg = from_yaml(yaml).unwrap();

    let oauth = cfg.oauth().unwrap();
    assert_eq!(oauth.authorize_url(), DEFAULT_AUTHORIZE_URL);
    assert_eq!(
        oauth.redirect_uri.as_deref(),
        Some("http://localhost:4000/oauth/callback")
    );
    // Secrets are never read from YAML
    assert!(oauth.client_id.is_empty());
}

#[test]
fn test_disabled_oauth_is_hidden() {
    let yaml = r#"
app:
  name: risk
  env: development

oauth:
  enabled: false
"#;
    let cfg = from_yaml(yaml).unwrap();
    assert!(cfg.oauth().is_none());
}

#[test]
fn test_environment_from_str() {
    assert_eq!("LIVE".parse::<Environment>().unwrap(), Environment::Live);
    assert_eq!(" demo ".parse::<Environment>().unwrap(), Environment::Demo);
    assert!("paper".parse::<Environment>().is_err());
}

// ==================== Environment override tests ====================

#[test]
fn test_load_overrides_from_env() {
    let yaml = r#"
app:
  name: risk
  env: development

oauth:
  enabled: true
"#;
    let mut cfg = from_yaml(yaml).unwrap();

    // Set env vars (unsafe because modifying env is not thread-safe)
    unsafe {
        env::set_var("TRADOVATE_ACCESS_TOKEN", "token_abc");
        env::set_var("TRADOVATE_CID", "cid_123");
        env::set_var("TRADOVATE_SEC", "sec_456");
        env::set_var("TRADOVATE_REDIRECT_URI", "https://example.test/cb");
    }

    cfg.load_overrides_from_env().unwrap();

    assert_eq!(cfg.tradovate.access_token, "token_abc");
    let oauth = cfg.oauth().unwrap();
    assert_eq!(oauth.client_id, "cid_123");
    assert_eq!(oauth.client_secret, "sec_456");
    assert_eq!(oauth.redirect_uri.as_deref(), Some("https://example.test/cb"));
    assert!(oauth.has_credentials());

    // Cleanup
    unsafe {
        env::remove_var("TRADOVATE_ACCESS_TOKEN");
        env::remove_var("TRADOVATE_CID");
        env::remove_var("TRADOVATE_SEC");
        env::remove_var("TRADOVATE_REDIRECT_URI");
    }
}

// ==================== Validation tests ====================

#[test]
fn test_validate_empty_app_name() {
    let yaml = r#"
app:
  name: ""
  env: development
"#;
    let cfg = from_yaml(yaml).unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("app.name is required"));
}

#[test]
fn test_validate_bad_base_url() {
    let yaml = r#"
app:
  name: risk
  env: development

tradovate:
  base_url: ftp://example.test
"#;
    let cfg = from_yaml(yaml).unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("tradovate.base_url"));
}

#[test]
fn test_validate_zero_port() {
    let yaml = r#"
app:
  name: risk
  env: development

server:
  port: 0
"#;
    let cfg = from_yaml(yaml).unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_validate_oauth_credentials_required_in_production() {
    let yaml = r#"
app:
  name: risk
  env: production

oauth:
  enabled: true
"#;
    let cfg = from_yaml(yaml).unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("TRADOVATE_CID"));
}

#[test]
fn test_validate_oauth_credentials_skipped_in_development() {
    let yaml = r#"
app:
  name: risk
  env: development

oauth:
  enabled: true
"#;
    let cfg = from_yaml(yaml).unwrap();
    assert!(cfg.validate().is_ok());
}

// ==================== File loading tests ====================

#[test]
fn test_load_from_file_development() {
    let yaml = minimal_valid_yaml();

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    let cfg = Config::load(file.path().to_str().unwrap()).unwrap();

    assert_eq!(cfg.app.name, "tradovate-risk");
    assert!(cfg.app.is_development());
    assert!(cfg.oauth().is_none());
}

#[test]
fn test_load_file_not_found() {
    let result = Config::load("nonexistent_config.yaml");
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("failed to read config file"));
}

#[test]
fn test_load_file_invalid_yaml() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"app: [unclosed").unwrap();

    let result = Config::load(file.path().to_str().unwrap());
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}
