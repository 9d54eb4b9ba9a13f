//! 설정 관리 — depprobe.toml 파싱 및 런타임 설정
//!
//! [`DepprobeConfig`]는 CLI와 리졸버가 읽는 최상위 설정 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`DEPPROBE_API_TOKEN=...` 형식)
//! 3. 설정 파일 (`depprobe.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), depprobe_core::error::DepprobeError> {
//! use depprobe_core::config::DepprobeConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = DepprobeConfig::load("depprobe.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = DepprobeConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, DepprobeError};

/// depprobe 통합 설정
///
/// `depprobe.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepprobeConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 원격 API 접속 설정
    #[serde(default)]
    pub api: ApiConfig,
    /// 해석/폴링 설정
    #[serde(default)]
    pub resolver: ResolverSection,
    /// 무시 정책 설정
    #[serde(default)]
    pub policy: PolicySection,
}

impl DepprobeConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DepprobeError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값에 환경변수 오버라이드만 적용해 반환합니다.
    ///
    /// CLI는 설정 파일 없이도 동작해야 하므로 이 경로를 사용합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, DepprobeError> {
        match Self::load(&path).await {
            Err(DepprobeError::Config(ConfigError::FileNotFound { path })) => {
                tracing::debug!(path = %path, "config file not found, using defaults");
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, DepprobeError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DepprobeError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                DepprobeError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, DepprobeError> {
        toml::from_str(toml_str).map_err(|e| {
            DepprobeError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `DEPPROBE_{SECTION}_{FIELD}`
    /// 예: `DEPPROBE_API_TOKEN=...`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "DEPPROBE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "DEPPROBE_GENERAL_LOG_FORMAT");

        // API
        override_string(&mut self.api.url, "DEPPROBE_API_URL");
        override_string(&mut self.api.rest_url, "DEPPROBE_API_REST_URL");
        override_string(&mut self.api.token, "DEPPROBE_API_TOKEN");
        override_string(&mut self.api.oauth_token, "DEPPROBE_API_OAUTH_TOKEN");
        override_string(&mut self.api.org, "DEPPROBE_API_ORG");
        override_u64(&mut self.api.timeout_secs, "DEPPROBE_API_TIMEOUT_SECS");

        // Resolver
        override_string(&mut self.resolver.protocol, "DEPPROBE_RESOLVER_PROTOCOL");
        override_string(
            &mut self.resolver.feature_flag,
            "DEPPROBE_RESOLVER_FEATURE_FLAG",
        );
        override_u32(
            &mut self.resolver.graph_max_attempts,
            "DEPPROBE_RESOLVER_GRAPH_MAX_ATTEMPTS",
        );
        override_u64(
            &mut self.resolver.graph_poll_delay_ms,
            "DEPPROBE_RESOLVER_GRAPH_POLL_DELAY_MS",
        );
        override_bool(
            &mut self.resolver.graph_auth_headers,
            "DEPPROBE_RESOLVER_GRAPH_AUTH_HEADERS",
        );

        // Policy
        override_bool(&mut self.policy.ignore_policy, "DEPPROBE_POLICY_IGNORE_POLICY");
        override_string(&mut self.policy.policy_file, "DEPPROBE_POLICY_POLICY_FILE");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), DepprobeError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // URL 검증 (스킴만 확인)
        for (field, url) in [("api.url", &self.api.url), ("api.rest_url", &self.api.rest_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: format!("'{url}' must start with http:// or https://"),
                }
                .into());
            }
        }

        if self.api.timeout_secs == 0 || self.api.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_secs".to_owned(),
                reason: format!("must be 1-{MAX_TIMEOUT_SECS}"),
            }
            .into());
        }

        let valid_protocols = ["auto", "legacy", "graph"];
        if !valid_protocols.contains(&self.resolver.protocol.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "resolver.protocol".to_owned(),
                reason: format!("must be one of: {}", valid_protocols.join(", ")),
            }
            .into());
        }

        if self.resolver.graph_max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "resolver.graph_max_attempts".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.policy.policy_file.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "policy.policy_file".to_owned(),
                reason: "policy file name must not be empty".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// API 요청 타임아웃 상한 (초)
const MAX_TIMEOUT_SECS: u64 = 3600;

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 원격 API 접속 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// 토큰 폴링 프로토콜 API 기본 URL
    pub url: String,
    /// 그래프 리소스 프로토콜 REST 기본 URL
    pub rest_url: String,
    /// API 토큰 (`authorization: token ...`)
    pub token: String,
    /// OAuth 토큰 (설정 시 `authorization: bearer ...`가 우선)
    pub oauth_token: String,
    /// 기본 조직 ID (쿼리 `org`)
    pub org: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/api/v1".to_owned(),
            rest_url: "http://localhost:8079/rest".to_owned(),
            token: String::new(),
            oauth_token: String::new(),
            org: String::new(),
            timeout_secs: 60,
        }
    }
}

/// 해석/폴링 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSection {
    /// 프로토콜 선택 (auto, legacy, graph)
    pub protocol: String,
    /// `auto` 모드에서 조회할 원격 기능 플래그 이름
    pub feature_flag: String,
    /// 그래프 조회 최대 시도 횟수
    pub graph_max_attempts: u32,
    /// 그래프 조회 시도 간 지연 (밀리초)
    pub graph_poll_delay_ms: u64,
    /// 그래프 리소스 요청에 인증/CI 헤더를 붙일지 여부
    pub graph_auth_headers: bool,
    /// depgraphs 엔드포인트 API 버전
    pub depgraph_api_version: String,
    /// issues 엔드포인트 API 버전
    pub issues_api_version: String,
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self {
            protocol: "auto".to_owned(),
            feature_flag: "newUnmanagedTest".to_owned(),
            graph_max_attempts: 50,
            graph_poll_delay_ms: 1000,
            graph_auth_headers: false,
            depgraph_api_version: "2022-05-23~experimental".to_owned(),
            issues_api_version: "2022-06-29~experimental".to_owned(),
        }
    }
}

/// 무시 정책 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySection {
    /// 정책 파일을 전혀 적용하지 않음
    pub ignore_policy: bool,
    /// 스캔 경로 아래에서 찾을 정책 파일 이름
    pub policy_file: String,
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            ignore_policy: false,
            policy_file: ".snyk".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
