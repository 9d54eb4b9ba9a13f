//! 리졸버 설정
//!
//! [`ResolverConfig`]는 core의 [`DepprobeConfig`](depprobe_core::config::DepprobeConfig)
//! 여러 섹션(api, resolver, policy)을 하나로 평탄화하고, 문자열 값을 타입으로 변환합니다.
//!
//! # 사용 예시
//!
//! ```
//! use depprobe_resolver::ResolverConfigBuilder;
//! use depprobe_core::types::ProtocolMode;
//!
//! let config = ResolverConfigBuilder::new()
//!     .protocol(ProtocolMode::Graph)
//!     .graph_max_attempts(10)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.graph_max_attempts, 10);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use depprobe_core::config::DepprobeConfig;
use depprobe_core::types::ProtocolMode;

use crate::error::ResolverError;

/// 정책 파일 최대 크기 (10 MB)
const DEFAULT_MAX_POLICY_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// 그래프 조회 최대 시도 횟수 상한
const MAX_GRAPH_ATTEMPTS_LIMIT: u32 = 1000;

/// 그래프 조회 지연 상한 (밀리초)
const MAX_GRAPH_POLL_DELAY_MS: u64 = 60_000;

/// 리졸버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// 토큰 폴링 프로토콜 API 기본 URL
    pub api_url: String,
    /// 그래프 리소스 프로토콜 REST 기본 URL
    pub rest_url: String,
    /// API 토큰
    pub token: String,
    /// OAuth 토큰 (비어있지 않으면 API 토큰보다 우선)
    pub oauth_token: String,
    /// 기본 조직 ID
    pub org: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 프로토콜 선택 모드
    pub protocol: ProtocolMode,
    /// `Auto` 모드에서 조회할 기능 플래그 이름
    pub feature_flag: String,
    /// 그래프 조회 최대 시도 횟수
    pub graph_max_attempts: u32,
    /// 그래프 조회 시도 간 지연 (밀리초)
    pub graph_poll_delay_ms: u64,
    /// 그래프 리소스 요청에 인증/CI 헤더 포함 여부
    pub graph_auth_headers: bool,
    /// depgraphs 엔드포인트 버전
    pub depgraph_api_version: String,
    /// issues 엔드포인트 버전
    pub issues_api_version: String,
    /// 정책 파일을 적용하지 않음
    pub ignore_policy: bool,
    /// 스캔 경로에서 찾을 정책 파일 이름
    pub policy_file: String,
    /// 정책 파일 최대 크기 (바이트)
    pub max_policy_file_size: u64,
    /// HTTP User-Agent
    pub user_agent: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::from_core(&DepprobeConfig::default())
    }
}

impl ResolverConfig {
    /// core 설정에서 리졸버 설정을 생성합니다.
    ///
    /// 알 수 없는 프로토콜 문자열은 `Auto`로 대체됩니다.
    pub fn from_core(core: &DepprobeConfig) -> Self {
        let protocol = ProtocolMode::from_str_loose(&core.resolver.protocol).unwrap_or_default();

        Self {
            api_url: core.api.url.trim_end_matches('/').to_owned(),
            rest_url: core.api.rest_url.trim_end_matches('/').to_owned(),
            token: core.api.token.clone(),
            oauth_token: core.api.oauth_token.clone(),
            org: core.api.org.clone(),
            timeout_secs: core.api.timeout_secs,
            protocol,
            feature_flag: core.resolver.feature_flag.clone(),
            graph_max_attempts: core.resolver.graph_max_attempts,
            graph_poll_delay_ms: core.resolver.graph_poll_delay_ms,
            graph_auth_headers: core.resolver.graph_auth_headers,
            depgraph_api_version: core.resolver.depgraph_api_version.clone(),
            issues_api_version: core.resolver.issues_api_version.clone(),
            ignore_policy: core.policy.ignore_policy,
            policy_file: core.policy.policy_file.clone(),
            max_policy_file_size: DEFAULT_MAX_POLICY_FILE_SIZE,
            user_agent: format!("depprobe/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// 요청 타임아웃
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// 그래프 조회 시도 간 지연
    pub fn graph_poll_delay(&self) -> Duration {
        Duration::from_millis(self.graph_poll_delay_ms)
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `api_url`, `rest_url`: 비어있으면 안 됨
    /// - `timeout_secs`: 0보다 커야 함
    /// - `graph_max_attempts`: 1-1000
    /// - `graph_poll_delay_ms`: 0-60000
    /// - `feature_flag`: `Auto` 모드에서 비어있으면 안 됨
    pub fn validate(&self) -> Result<(), ResolverError> {
        if self.api_url.is_empty() {
            return Err(ResolverError::Config {
                field: "api_url".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.rest_url.is_empty() {
            return Err(ResolverError::Config {
                field: "rest_url".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.timeout_secs == 0 {
            return Err(ResolverError::Config {
                field: "timeout_secs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.graph_max_attempts == 0 || self.graph_max_attempts > MAX_GRAPH_ATTEMPTS_LIMIT {
            return Err(ResolverError::Config {
                field: "graph_max_attempts".to_owned(),
                reason: format!("must be 1-{MAX_GRAPH_ATTEMPTS_LIMIT}"),
            });
        }

        if self.graph_poll_delay_ms > MAX_GRAPH_POLL_DELAY_MS {
            return Err(ResolverError::Config {
                field: "graph_poll_delay_ms".to_owned(),
                reason: format!("must be 0-{MAX_GRAPH_POLL_DELAY_MS}"),
            });
        }

        if self.protocol == ProtocolMode::Auto && self.feature_flag.is_empty() {
            return Err(ResolverError::Config {
                field: "feature_flag".to_owned(),
                reason: "must not be empty in auto protocol mode".to_owned(),
            });
        }

        if self.max_policy_file_size == 0 {
            return Err(ResolverError::Config {
                field: "max_policy_file_size".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(())
    }
}

/// 리졸버 설정 빌더
#[derive(Default)]
pub struct ResolverConfigBuilder {
    config: ResolverConfig,
}

impl ResolverConfigBuilder {
    /// 기본값으로 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// API 기본 URL을 설정합니다.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// REST 기본 URL을 설정합니다.
    pub fn rest_url(mut self, url: impl Into<String>) -> Self {
        self.config.rest_url = url.into();
        self
    }

    /// API 토큰을 설정합니다.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = token.into();
        self
    }

    /// OAuth 토큰을 설정합니다.
    pub fn oauth_token(mut self, token: impl Into<String>) -> Self {
        self.config.oauth_token = token.into();
        self
    }

    /// 기본 조직 ID를 설정합니다.
    pub fn org(mut self, org: impl Into<String>) -> Self {
        self.config.org = org.into();
        self
    }

    /// 요청 타임아웃을 설정합니다.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// 프로토콜 선택 모드를 설정합니다.
    pub fn protocol(mut self, protocol: ProtocolMode) -> Self {
        self.config.protocol = protocol;
        self
    }

    /// 기능 플래그 이름을 설정합니다.
    pub fn feature_flag(mut self, flag: impl Into<String>) -> Self {
        self.config.feature_flag = flag.into();
        self
    }

    /// 그래프 조회 최대 시도 횟수를 설정합니다.
    pub fn graph_max_attempts(mut self, attempts: u32) -> Self {
        self.config.graph_max_attempts = attempts;
        self
    }

    /// 그래프 조회 지연을 설정합니다.
    pub fn graph_poll_delay_ms(mut self, delay_ms: u64) -> Self {
        self.config.graph_poll_delay_ms = delay_ms;
        self
    }

    /// 그래프 리소스 요청의 인증/CI 헤더 포함 여부를 설정합니다.
    pub fn graph_auth_headers(mut self, enabled: bool) -> Self {
        self.config.graph_auth_headers = enabled;
        self
    }

    /// 정책 무시 여부를 설정합니다.
    pub fn ignore_policy(mut self, ignore: bool) -> Self {
        self.config.ignore_policy = ignore;
        self
    }

    /// 정책 파일 이름을 설정합니다.
    pub fn policy_file(mut self, name: impl Into<String>) -> Self {
        self.config.policy_file = name.into();
        self
    }

    /// 설정을 빌드합니다.
    pub fn build(self) -> Result<ResolverConfig, ResolverError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
