//! 토큰 폴링 프로토콜
//!
//! 1. `POST {api}/test-dependencies`로 스캔 결과를 제출해 토큰과 폴링 지시자를 받습니다.
//! 2. `GET {api}/test-dependencies/{token}`을 `result`가 올 때까지 반복합니다.
//!    선언된 실패 상태는 즉시 에러가 되고, 시도 횟수가 `maxAttempts`를 넘으면 중단합니다.

use std::time::Duration;

use tracing::{debug, info};

use depprobe_core::types::Ecosystem;

use crate::config::ResolverConfig;
use crate::error::ResolverError;
use crate::polling::{delay_next_step, handle_processing_status};
use crate::transport::{HttpRequest, Transport, legacy_headers};
use crate::types::{Analytics, RawTestResult, RunOptions, ScanResult, TestDependenciesResult};
use crate::wire::{PollingTask, ResolveAndTestFactsResponse, TestDependenciesRequest, decode};

/// 제출 응답에서 얻은 폴링 핸들
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollingToken {
    pub token: String,
    pub polling_task: PollingTask,
}

/// 실행 옵션에서 공통 쿼리 문자열을 만듭니다.
///
/// `org`는 옵션 값이 없으면 설정의 기본 조직을 사용하고, 둘 다 비어있으면 생략합니다.
pub fn assemble_query_string(
    options: &RunOptions,
    config: &ResolverConfig,
) -> Vec<(String, String)> {
    let mut query = Vec::new();

    let org = options
        .org
        .as_deref()
        .filter(|o| !o.is_empty())
        .or_else(|| Some(config.org.as_str()).filter(|o| !o.is_empty()));
    if let Some(org) = org {
        query.push(("org".to_owned(), org.to_owned()));
    }

    if let Some(threshold) = options.severity_threshold {
        query.push(("severityThreshold".to_owned(), threshold.as_str().to_owned()));
    }

    if options.ignore_policy {
        query.push(("ignorePolicy".to_owned(), "true".to_owned()));
    }

    query
}

/// 토큰 폴링 클라이언트
pub struct LegacyPoller<'a, T: Transport> {
    transport: &'a T,
    config: &'a ResolverConfig,
}

impl<'a, T: Transport> LegacyPoller<'a, T> {
    pub fn new(transport: &'a T, config: &'a ResolverConfig) -> Self {
        Self { transport, config }
    }

    /// 스캔 결과를 제출하고 폴링 토큰을 받습니다.
    pub async fn request_test_polling_token(
        &self,
        options: &RunOptions,
        is_async: bool,
        scan_result: &ScanResult,
    ) -> Result<PollingToken, ResolverError> {
        let body = serde_json::to_value(TestDependenciesRequest {
            is_async,
            scan_result,
        })
        .map_err(|e| ResolverError::Decode {
            context: "test-dependencies request".to_owned(),
            reason: e.to_string(),
        })?;

        let request = HttpRequest::post(format!("{}/test-dependencies", self.config.api_url))
            .headers(legacy_headers(self.config))
            .query(assemble_query_string(options, self.config))
            .json(body);

        let response: ResolveAndTestFactsResponse =
            decode(self.transport.send(request).await?, "test-dependencies submission")?;

        let token = response.token.filter(|t| !t.is_empty()).ok_or_else(|| {
            ResolverError::InconsistentResult("submission response carried no token".to_owned())
        })?;
        let polling_task = response.polling_task.ok_or_else(|| {
            ResolverError::InconsistentResult(
                "submission response carried no polling task".to_owned(),
            )
        })?;

        debug!(
            token = %token,
            poll_interval_ms = polling_task.poll_interval,
            max_attempts = polling_task.max_attempts,
            "received polling token"
        );

        Ok(PollingToken {
            token,
            polling_task,
        })
    }

    /// 결과가 준비될 때까지 토큰을 폴링합니다.
    pub async fn poll_until_done(
        &self,
        token: &str,
        ecosystem: Ecosystem,
        options: &RunOptions,
        poll_interval: Duration,
        max_attempts: u32,
    ) -> Result<TestDependenciesResult, ResolverError> {
        let url = format!("{}/test-dependencies/{token}", self.config.api_url);
        let mut query = assemble_query_string(options, self.config);
        query.push(("type".to_owned(), ecosystem.to_string()));

        let mut attempts = 0;
        loop {
            let request = HttpRequest::get(url.as_str())
                .headers(legacy_headers(self.config))
                .query(query.clone());

            let response: ResolveAndTestFactsResponse =
                decode(self.transport.send(request).await?, "test-dependencies poll")?;

            handle_processing_status(response.status.as_deref())?;

            if let Some(result) = response.result {
                debug!(token, attempts, "polling finished");
                return Ok(result);
            }

            delay_next_step(&mut attempts, max_attempts, poll_interval).await?;
        }
    }

    /// 제출부터 결과 수신까지 수행합니다.
    pub async fn resolve(
        &self,
        ecosystem: Ecosystem,
        scan_result: &ScanResult,
        options: &RunOptions,
    ) -> Result<RawTestResult, ResolverError> {
        let handle = self
            .request_test_polling_token(options, true, scan_result)
            .await?;

        if let Some(analytics) = &scan_result.analytics {
            record_plugin_analytics(analytics, &handle.token);
        }

        let result = self
            .poll_until_done(
                &handle.token,
                ecosystem,
                options,
                Duration::from_millis(handle.polling_task.poll_interval),
                handle.polling_task.max_attempts,
            )
            .await?;

        Ok(RawTestResult::from(result))
    }
}

fn record_plugin_analytics(analytics: &[Analytics], token: &str) {
    for entry in analytics {
        info!(token, name = %entry.name, data = %entry.data, "plugin analytics");
    }
}
