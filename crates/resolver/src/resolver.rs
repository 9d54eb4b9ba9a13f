//! 오케스트레이터 — 프로토콜 선택, 배치 순회, 에러 분류
//!
//! [`FactResolver`]는 스캔 경로와 스캔 결과를 순서대로 처리합니다.
//! 한 항목의 실패는 에러 목록에 기록되고 나머지 항목 처리는 계속됩니다.
//!
//! # 사용 예시
//! ```ignore
//! use depprobe_resolver::{FactResolver, ResolverConfig};
//!
//! let resolver = FactResolver::http(ResolverConfig::default())?;
//! let (results, errors) = resolver
//!     .resolve_and_test_facts(Ecosystem::Cpp, &batch, &RunOptions::default())
//!     .await;
//! ```

use std::fmt;

use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use depprobe_core::types::{Ecosystem, ProtocolMode};

use crate::config::ResolverConfig;
use crate::error::ResolverError;
use crate::graph::GraphResolver;
use crate::legacy::LegacyPoller;
use crate::merge::merge_test_result;
use crate::policy::find_and_load_policy;
use crate::transport::{HttpRequest, HttpTransport, Transport, legacy_headers};
use crate::types::{RawTestResult, RunOptions, ScanBatch, ScanResult, TestResult};
use crate::wire::{FeatureFlagResponse, decode};

/// 사용자 메시지로 그대로 노출하는 상태 코드 범위
const USER_FACING_STATUS: std::ops::RangeInclusive<u16> = 400..=500;

/// 스캔 결과 하나를 해석할 백엔드 프로토콜
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolStrategy {
    /// 토큰 폴링 프로토콜
    Legacy,
    /// 그래프 리소스 프로토콜
    GraphResource,
}

impl fmt::Display for ProtocolStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::GraphResource => write!(f, "graph"),
        }
    }
}

/// 실패 항목의 사용자 메시지를 만듭니다.
///
/// 상태 코드가 400..=500이면 백엔드 메시지를 그대로, 아니면 경로 기반 일반 메시지를 씁니다.
pub fn describe_failure(path: &str, error: &ResolverError) -> String {
    match error.status_code() {
        Some(status) if USER_FACING_STATUS.contains(&status) => error.user_message(),
        _ if path.is_empty() => "Could not test dependencies .".to_owned(),
        _ => format!("Could not test dependencies in {path}"),
    }
}

/// 스캔 결과 해석기
pub struct FactResolver<T: Transport> {
    config: ResolverConfig,
    transport: T,
}

impl FactResolver<HttpTransport> {
    /// reqwest 기반 전송으로 해석기를 생성합니다.
    pub fn http(config: ResolverConfig) -> Result<Self, ResolverError> {
        let transport = HttpTransport::new(&config)?;
        FactResolverBuilder::new()
            .config(config)
            .transport(transport)
            .build()
    }
}

impl<T: Transport> FactResolver<T> {
    /// 현재 설정
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// 사용 중인 전송 구현
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 생태계와 설정으로 프로토콜을 선택합니다.
    ///
    /// `Auto` 모드는 비관리 생태계에서만 원격 기능 플래그를 조회하며,
    /// 조회 실패 시 토큰 폴링 프로토콜로 대체합니다.
    pub async fn select_strategy(
        &self,
        ecosystem: Ecosystem,
        options: &RunOptions,
    ) -> ProtocolStrategy {
        match self.config.protocol {
            ProtocolMode::Legacy => ProtocolStrategy::Legacy,
            ProtocolMode::Graph => ProtocolStrategy::GraphResource,
            ProtocolMode::Auto if !ecosystem.is_unmanaged() => ProtocolStrategy::Legacy,
            ProtocolMode::Auto => match self.feature_flag_enabled(options).await {
                Ok(true) => ProtocolStrategy::GraphResource,
                Ok(false) => ProtocolStrategy::Legacy,
                Err(e) => {
                    warn!(
                        flag = %self.config.feature_flag,
                        error = %e,
                        "feature flag lookup failed, falling back to legacy protocol"
                    );
                    ProtocolStrategy::Legacy
                }
            },
        }
    }

    async fn feature_flag_enabled(&self, options: &RunOptions) -> Result<bool, ResolverError> {
        let url = format!(
            "{}/cli-config/feature-flags/{}",
            self.config.api_url, self.config.feature_flag
        );

        let org = options
            .org
            .as_deref()
            .filter(|o| !o.is_empty())
            .or_else(|| Some(self.config.org.as_str()).filter(|o| !o.is_empty()));
        let query = org
            .map(|o| vec![("org".to_owned(), o.to_owned())])
            .unwrap_or_default();

        let request = HttpRequest::get(url)
            .headers(legacy_headers(&self.config))
            .query(query);
        let response: FeatureFlagResponse =
            decode(self.transport.send(request).await?, "feature flag")?;

        if let Some(message) = &response.user_message {
            debug!(flag = %self.config.feature_flag, message = %message, "feature flag message");
        }
        Ok(response.ok)
    }

    /// 전체 배치를 해석하고 시험합니다.
    ///
    /// 경로 순서, 그리고 경로 안의 스캔 결과 순서대로 하나씩 처리합니다.
    /// 성공한 결과와 실패 메시지를 각각 순서대로 반환합니다.
    pub async fn resolve_and_test_facts(
        &self,
        ecosystem: Ecosystem,
        batch: &ScanBatch,
        options: &RunOptions,
    ) -> (Vec<TestResult>, Vec<String>) {
        let span = info_span!("resolve", run_id = %Uuid::new_v4(), ecosystem = %ecosystem);
        self.run_batch(ecosystem, batch, options)
            .instrument(span)
            .await
    }

    async fn run_batch(
        &self,
        ecosystem: Ecosystem,
        batch: &ScanBatch,
        options: &RunOptions,
    ) -> (Vec<TestResult>, Vec<String>) {
        let mut results = Vec::new();
        let mut errors = Vec::new();

        let strategy = self.select_strategy(ecosystem, options).await;
        info!(strategy = %strategy, paths = batch.len(), "resolving scan batch");

        for (path, scan_results) in batch {
            info!("Resolving and Testing fileSignatures in {path}");

            for scan_result in scan_results {
                match self
                    .test_scan_result(strategy, ecosystem, path, scan_result, options)
                    .await
                {
                    Ok(result) => {
                        debug!(
                            path = %path,
                            issues = result.issues.len(),
                            vulnerabilities = result.vulnerabilities.len(),
                            "scan result tested"
                        );
                        results.push(result);
                    }
                    Err(e) => {
                        warn!(path = %path, error = %e, "failed to test scan result");
                        errors.push(describe_failure(path, &e));
                    }
                }
            }
        }

        info!(
            results = results.len(),
            errors = errors.len(),
            "scan batch complete"
        );
        (results, errors)
    }

    async fn test_scan_result(
        &self,
        strategy: ProtocolStrategy,
        ecosystem: Ecosystem,
        path: &str,
        scan_result: &ScanResult,
        options: &RunOptions,
    ) -> Result<TestResult, ResolverError> {
        let raw = self.resolve_raw(strategy, ecosystem, scan_result, options).await?;
        let policy = find_and_load_policy(path, ecosystem, options, &self.config).await?;
        merge_test_result(path, raw, policy.as_ref())
    }

    async fn resolve_raw(
        &self,
        strategy: ProtocolStrategy,
        ecosystem: Ecosystem,
        scan_result: &ScanResult,
        options: &RunOptions,
    ) -> Result<RawTestResult, ResolverError> {
        match strategy {
            ProtocolStrategy::Legacy => {
                LegacyPoller::new(&self.transport, &self.config)
                    .resolve(ecosystem, scan_result, options)
                    .await
            }
            ProtocolStrategy::GraphResource => {
                GraphResolver::new(&self.transport, &self.config)
                    .resolve(scan_result)
                    .await
            }
        }
    }
}

/// 해석기 빌더
pub struct FactResolverBuilder<T: Transport> {
    config: ResolverConfig,
    transport: Option<T>,
}

impl<T: Transport> FactResolverBuilder<T> {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: ResolverConfig::default(),
            transport: None,
        }
    }

    /// 리졸버 설정을 지정합니다.
    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// 전송 구현을 지정합니다.
    pub fn transport(mut self, transport: T) -> Self {
        self.transport = Some(transport);
        self
    }

    /// 해석기를 빌드합니다.
    pub fn build(self) -> Result<FactResolver<T>, ResolverError> {
        self.config.validate()?;

        let transport = self.transport.ok_or_else(|| ResolverError::Config {
            field: "transport".to_owned(),
            reason: "transport must be provided".to_owned(),
        })?;

        Ok(FactResolver {
            config: self.config,
            transport,
        })
    }
}

impl<T: Transport> Default for FactResolverBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
