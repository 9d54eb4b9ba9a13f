//! HTTP 전송 추상화
//!
//! [`Transport`] trait은 원격 API 호출을 추상화하여, 운영 코드는 [`HttpTransport`]를,
//! 테스트는 `MockTransport`를 사용할 수 있게 합니다.
//!
//! # 아키텍처
//!
//! ```text
//! ┌──────────────┐   ┌────────────────┐
//! │ LegacyPoller │   │ GraphResolver  │
//! └──────┬───────┘   └───────┬────────┘
//!        └─────────┬─────────┘
//!                  ▼
//!           ┌─────────────┐
//!           │  Transport  │ (trait)
//!           └─────────────┘
//!              │        │
//!              ▼        ▼
//!          ┌───────┐ ┌──────┐
//!          │reqwest│ │ Mock │
//!          └───────┘ └──────┘
//! ```
//!
//! # 에러 변환
//!
//! - **2xx 이외 응답**: `ResolverError::Http` (본문의 `message` 또는 상태 사유)
//! - **연결 실패/타임아웃**: `ResolverError::Network`
//! - **본문 JSON 파싱 실패**: `ResolverError::Decode`

use std::future::Future;

use tracing::debug;

use crate::config::ResolverConfig;
use crate::error::ResolverError;

/// 그래프 리소스 요청의 Content-Type
pub const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";

/// CI 환경으로 간주하는 환경변수 키
const CI_ENV_KEYS: &[&str] = &[
    "DEPPROBE_CI",
    "CI",
    "CONTINUOUS_INTEGRATION",
    "BUILD_ID",
    "BUILD_NUMBER",
    "TEAMCITY_VERSION",
    "TRAVIS",
    "CIRCLECI",
    "JENKINS_URL",
    "HUDSON_URL",
    "bamboo.buildKey",
    "PHPCI",
    "GOCD_SERVER_HOST",
    "BUILDKITE",
    "TF_BUILD",
    "SYSTEM_TEAMFOUNDATIONSERVERURI",
];

/// HTTP 메서드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// 전송 계층에 넘기는 요청
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    /// GET 요청을 생성합니다.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// POST 요청을 생성합니다.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    /// 헤더 목록을 추가합니다.
    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// 쿼리 파라미터 목록을 추가합니다.
    pub fn query(mut self, query: Vec<(String, String)>) -> Self {
        self.query.extend(query);
        self
    }

    /// JSON 본문을 설정합니다.
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// 이름으로 헤더 값을 찾습니다 (대소문자 무시).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// 이름으로 쿼리 값을 찾습니다.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// 원격 API 전송 trait
///
/// 성공 응답 본문을 JSON 값으로 반환합니다. 빈 본문은 `Value::Null`입니다.
pub trait Transport: Send + Sync {
    /// 요청을 보내고 응답 본문을 반환합니다.
    ///
    /// # Errors
    ///
    /// - `ResolverError::Http`: 2xx 이외 응답
    /// - `ResolverError::Network`: 연결 실패 또는 타임아웃
    /// - `ResolverError::Decode`: 응답 본문이 JSON이 아님
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<serde_json::Value, ResolverError>> + Send;
}

/// `reqwest` 기반 운영 전송 구현
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// 설정의 타임아웃과 User-Agent로 클라이언트를 생성합니다.
    pub fn new(config: &ResolverConfig) -> Result<Self, ResolverError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ResolverError::Network(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<serde_json::Value, ResolverError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = self.client.request(method, &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        // json()은 Content-Type이 이미 있으면 덮어쓰지 않음
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(method = %request.method, url = %request.url, "sending request");

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ResolverError::Network(format!("request to {} timed out", request.url))
            } else {
                ResolverError::Network(format!("request to {} failed: {e}", request.url))
            }
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            ResolverError::Network(format!("failed to read response from {}: {e}", request.url))
        })?;

        if !status.is_success() {
            return Err(ResolverError::Http {
                status: status.as_u16(),
                message: error_message_from_body(status.as_u16(), &bytes),
            });
        }

        if bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|e| ResolverError::Decode {
            context: request.url.clone(),
            reason: e.to_string(),
        })
    }
}

/// 실패 응답 본문에서 사용자 메시지를 추출합니다.
///
/// 본문의 `message` 문자열이 없으면 상태 사유를 사용합니다.
pub fn error_message_from_body(status: u16, body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
        .unwrap_or_else(|| {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .map(str::to_owned)
                .unwrap_or_else(|| format!("request failed with status {status}"))
        })
}

// --- 헤더 ---

/// 현재 프로세스가 CI 환경에서 실행 중인지 확인합니다.
pub fn is_ci() -> bool {
    is_ci_with(|key| std::env::var_os(key).is_some())
}

fn is_ci_with(is_set: impl Fn(&str) -> bool) -> bool {
    CI_ENV_KEYS.iter().copied().any(is_set)
}

/// `authorization` 헤더 값 (OAuth 토큰 우선)
pub fn auth_header(config: &ResolverConfig) -> Option<String> {
    if !config.oauth_token.is_empty() {
        Some(format!("bearer {}", config.oauth_token))
    } else if !config.token.is_empty() {
        Some(format!("token {}", config.token))
    } else {
        None
    }
}

/// 토큰 폴링 프로토콜 헤더 (`x-is-ci`, `authorization`)
pub fn legacy_headers(config: &ResolverConfig) -> Vec<(String, String)> {
    legacy_headers_with(config, is_ci())
}

fn legacy_headers_with(config: &ResolverConfig, ci: bool) -> Vec<(String, String)> {
    let mut headers = vec![("x-is-ci".to_owned(), ci.to_string())];
    match auth_header(config) {
        Some(value) => headers.push(("authorization".to_owned(), value)),
        None => debug!("no api token configured, sending unauthenticated request"),
    }
    headers
}

/// 그래프 리소스 프로토콜 헤더
///
/// 인증/CI 헤더는 `graph_auth_headers`가 켜진 경우에만 붙습니다.
pub fn graph_headers(config: &ResolverConfig) -> Vec<(String, String)> {
    let mut headers = vec![(
        "Content-Type".to_owned(),
        JSON_API_CONTENT_TYPE.to_owned(),
    )];
    if config.graph_auth_headers {
        headers.extend(legacy_headers(config));
    }
    headers
}

// --- Mock ---

/// 테스트용 전송 구현
///
/// 미리 정해진 응답을 순서대로 반환하고, 받은 요청을 기록합니다.
#[cfg(test)]
#[derive(Default)]
pub struct MockTransport {
    responses: std::sync::Mutex<std::collections::VecDeque<Result<serde_json::Value, ResolverError>>>,
    requests: std::sync::Mutex<Vec<HttpRequest>>,
}

#[cfg(test)]
impl MockTransport {
    /// 빈 응답 큐로 mock을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 성공 응답을 큐에 추가합니다.
    pub fn with_response(self, value: serde_json::Value) -> Self {
        self.responses.lock().unwrap().push_back(Ok(value));
        self
    }

    /// 실패 응답을 큐에 추가합니다.
    pub fn with_error(self, error: ResolverError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// 받은 요청 목록
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// 받은 요청 수
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[cfg(test)]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<serde_json::Value, ResolverError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ResolverError::Network("no scripted response".to_owned())))
    }
}
