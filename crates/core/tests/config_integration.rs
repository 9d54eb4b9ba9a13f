//! depprobe.toml 통합 설정 테스트
//!
//! - depprobe.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use depprobe_core::config::DepprobeConfig;
use depprobe_core::error::{ConfigError, DepprobeError};

const EXAMPLE: &str = include_str!("../../../depprobe.toml.example");

fn with_env<R>(key: &str, value: &str, f: impl FnOnce() -> R) -> R {
    let original = std::env::var(key).ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var(key, value);
    }

    let result = f();

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var(key, val),
            None => std::env::remove_var(key),
        }
    }
    result
}

// =============================================================================
// depprobe.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_and_validates() {
    let config = DepprobeConfig::parse(EXAMPLE).expect("example config should parse");
    config
        .validate()
        .expect("example config should pass validation");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "pretty");
    assert_eq!(config.api.url, "http://localhost:8080/api/v1");
    assert_eq!(config.resolver.protocol, "auto");
    assert_eq!(config.policy.policy_file, ".snyk");
}

#[test]
fn example_config_matches_code_defaults() {
    let example = DepprobeConfig::parse(EXAMPLE).expect("should parse");
    let defaults = DepprobeConfig::default();

    assert_eq!(example.general.log_level, defaults.general.log_level);
    assert_eq!(example.general.log_format, defaults.general.log_format);
    assert_eq!(example.api.url, defaults.api.url);
    assert_eq!(example.api.rest_url, defaults.api.rest_url);
    assert_eq!(example.api.timeout_secs, defaults.api.timeout_secs);
    assert_eq!(example.resolver.protocol, defaults.resolver.protocol);
    assert_eq!(example.resolver.feature_flag, defaults.resolver.feature_flag);
    assert_eq!(
        example.resolver.graph_max_attempts,
        defaults.resolver.graph_max_attempts
    );
    assert_eq!(
        example.resolver.graph_poll_delay_ms,
        defaults.resolver.graph_poll_delay_ms
    );
    assert_eq!(
        example.resolver.graph_auth_headers,
        defaults.resolver.graph_auth_headers
    );
    assert_eq!(
        example.resolver.depgraph_api_version,
        defaults.resolver.depgraph_api_version
    );
    assert_eq!(
        example.resolver.issues_api_version,
        defaults.resolver.issues_api_version
    );
    assert_eq!(example.policy.ignore_policy, defaults.policy.ignore_policy);
    assert_eq!(example.policy.policy_file, defaults.policy.policy_file);
}

// =============================================================================
// 부분 설정 테스트
// =============================================================================

#[test]
fn partial_config_api_only() {
    let toml = r#"
[api]
token = "abc"
org = "acme"
"#;
    let config = DepprobeConfig::parse(toml).expect("should parse");
    assert_eq!(config.api.token, "abc");
    assert_eq!(config.api.org, "acme");
    assert_eq!(config.api.timeout_secs, 60);
    assert_eq!(config.resolver.graph_max_attempts, 50);
    assert_eq!(config.general.log_level, "info");
}

#[test]
fn partial_config_resolver_only() {
    let toml = r#"
[resolver]
protocol = "graph"
graph_max_attempts = 5
"#;
    let config = DepprobeConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");
    assert_eq!(config.resolver.protocol, "graph");
    assert_eq!(config.resolver.graph_max_attempts, 5);
    assert_eq!(config.resolver.graph_poll_delay_ms, 1000);
    assert_eq!(config.api.url, "http://localhost:8080/api/v1");
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let toml = r#"
[general]
log_level = "info"
"#;
    let result = with_env("DEPPROBE_GENERAL_LOG_LEVEL", "error", || {
        let mut config = DepprobeConfig::parse(toml).expect("should parse");
        config.apply_env_overrides();
        config.general.log_level
    });
    assert_eq!(result, "error");
}

#[test]
#[serial_test::serial]
fn env_override_api_token() {
    let result = with_env("DEPPROBE_API_TOKEN", "secret", || {
        let mut config = DepprobeConfig::default();
        config.apply_env_overrides();
        config.api.token
    });
    assert_eq!(result, "secret");
}

#[test]
#[serial_test::serial]
fn env_override_numeric_field() {
    let result = with_env("DEPPROBE_RESOLVER_GRAPH_MAX_ATTEMPTS", "7", || {
        let mut config = DepprobeConfig::default();
        config.apply_env_overrides();
        config.resolver.graph_max_attempts
    });
    assert_eq!(result, 7);
}

#[test]
#[serial_test::serial]
fn env_override_invalid_number_keeps_value() {
    let result = with_env("DEPPROBE_API_TIMEOUT_SECS", "soon", || {
        let mut config = DepprobeConfig::default();
        config.apply_env_overrides();
        config.api.timeout_secs
    });
    assert_eq!(result, 60);
}

#[test]
#[serial_test::serial]
fn env_override_bool_field() {
    let result = with_env("DEPPROBE_POLICY_IGNORE_POLICY", "true", || {
        let mut config = DepprobeConfig::default();
        config.apply_env_overrides();
        config.policy.ignore_policy
    });
    assert!(result);
}

// =============================================================================
// 에러 테스트
// =============================================================================

#[test]
fn empty_string_parses_with_defaults() {
    let config = DepprobeConfig::parse("").expect("empty should parse");
    config.validate().expect("defaults should validate");
    assert_eq!(config.resolver.feature_flag, "newUnmanagedTest");
}

#[test]
fn malformed_toml_returns_parse_error() {
    let result = DepprobeConfig::parse("[invalid toml");
    assert!(matches!(
        result.unwrap_err(),
        DepprobeError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[test]
fn wrong_type_for_numeric_field() {
    let toml = r#"
[resolver]
graph_max_attempts = "fifty"
"#;
    assert!(matches!(
        DepprobeConfig::parse(toml).unwrap_err(),
        DepprobeError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[test]
fn invalid_protocol_fails_validation() {
    let toml = r#"
[resolver]
protocol = "carrier-pigeon"
"#;
    let config = DepprobeConfig::parse(toml).expect("should parse");
    assert!(matches!(
        config.validate().unwrap_err(),
        DepprobeError::Config(ConfigError::InvalidValue { .. })
    ));
}

#[tokio::test]
async fn from_file_nonexistent_returns_file_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let result = DepprobeConfig::from_file(dir.path().join("missing.toml")).await;
    assert!(matches!(
        result.unwrap_err(),
        DepprobeError::Config(ConfigError::FileNotFound { .. })
    ));
}

#[tokio::test]
#[serial_test::serial]
async fn load_or_default_without_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = DepprobeConfig::load_or_default(dir.path().join("depprobe.toml"))
        .await
        .expect("missing file should fall back to defaults");
    assert_eq!(config.api.timeout_secs, 60);
}

#[tokio::test]
#[serial_test::serial]
async fn load_reads_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("depprobe.toml");
    std::fs::write(&path, "[api]\norg = \"from-file\"\n").unwrap();

    let config = DepprobeConfig::load(&path).await.expect("should load");
    assert_eq!(config.api.org, "from-file");
}

#[test]
fn serialize_and_reparse_roundtrip() {
    let original = DepprobeConfig::default();
    let toml_str = toml::to_string_pretty(&original).expect("should serialize");
    let parsed = DepprobeConfig::parse(&toml_str).expect("should reparse");
    parsed.validate().expect("reparsed should validate");

    assert_eq!(original.api.rest_url, parsed.api.rest_url);
    assert_eq!(
        original.resolver.depgraph_api_version,
        parsed.resolver.depgraph_api_version
    );
    assert_eq!(original.policy.policy_file, parsed.policy.policy_file);
}
