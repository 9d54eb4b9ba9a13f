//! 그래프 리소스 프로토콜
//!
//! ```text
//! hashes --POST depgraphs--> id --GET depgraphs/{id} (bounded retry)--> attributes
//!                                                                           |
//!                                                     convert_dep_graph_attributes
//!                                                                           |
//!                                        RawTestResult <--decompose-- POST issues
//! ```
//!
//! `/test-dependencies`는 사용하지 않습니다.

use tracing::{debug, warn};

use crate::config::ResolverConfig;
use crate::error::ResolverError;
use crate::transport::{HttpRequest, Transport, graph_headers};
use crate::translate::{
    convert_dep_graph, convert_dep_graph_attributes, convert_file_signatures, convert_issues,
    convert_issues_data, convert_scan_result_to_hashes,
};
use crate::types::{FileHashes, RawTestResult, ScanResult};
use crate::wire::{
    Attributes, CreateDepGraphResponse, GetDepGraphResponse, GetIssuesResponse,
    IssuesRequestAttributes, decode,
};

/// 그래프 리소스 클라이언트
pub struct GraphResolver<'a, T: Transport> {
    transport: &'a T,
    config: &'a ResolverConfig,
}

impl<'a, T: Transport> GraphResolver<'a, T> {
    pub fn new(transport: &'a T, config: &'a ResolverConfig) -> Self {
        Self { transport, config }
    }

    fn depgraphs_url(&self) -> String {
        format!("{}/unmanaged_ecosystem/depgraphs", self.config.rest_url)
    }

    fn version_query(version: &str) -> Vec<(String, String)> {
        vec![("version".to_owned(), version.to_owned())]
    }

    fn hashes_body(hashes: &FileHashes) -> Result<serde_json::Value, ResolverError> {
        serde_json::to_value(hashes).map_err(|e| ResolverError::Decode {
            context: "file hashes request".to_owned(),
            reason: e.to_string(),
        })
    }

    /// 해시 목록으로 그래프 리소스를 생성하고 리소스 ID를 반환합니다.
    ///
    /// 응답에 ID가 없으면 `InconsistentResult`입니다.
    pub async fn create_dep_graph(&self, hashes: &FileHashes) -> Result<String, ResolverError> {
        let request = HttpRequest::post(self.depgraphs_url())
            .headers(graph_headers(self.config))
            .query(Self::version_query(&self.config.depgraph_api_version))
            .json(Self::hashes_body(hashes)?);

        let response: CreateDepGraphResponse =
            decode(self.transport.send(request).await?, "create depgraph")?;

        response
            .data
            .and_then(|d| d.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ResolverError::InconsistentResult("create depgraph response carried no id".to_owned())
            })
    }

    /// 그래프 리소스를 한 번 조회합니다.
    pub async fn get_dep_graph(
        &self,
        hashes: &FileHashes,
        id: &str,
    ) -> Result<GetDepGraphResponse, ResolverError> {
        let request = HttpRequest::get(format!("{}/{id}", self.depgraphs_url()))
            .headers(graph_headers(self.config))
            .query(Self::version_query(&self.config.depgraph_api_version))
            .json(Self::hashes_body(hashes)?);

        decode(self.transport.send(request).await?, "get depgraph")
    }

    /// 그래프가 해석될 때까지 제한된 횟수만큼 조회합니다.
    ///
    /// 실패할 때마다 시도 횟수가 증가하고 `graph_max_attempts`에 도달하면
    /// `GraphResolutionFailed`를 반환합니다. 속성이 없는 응답도 미완료로 취급합니다.
    pub async fn resolve_dep_graph(
        &self,
        hashes: &FileHashes,
        id: &str,
    ) -> Result<Attributes, ResolverError> {
        let max_attempts = self.config.graph_max_attempts;
        let delay = self.config.graph_poll_delay();

        for attempt in 0..max_attempts {
            if attempt > 0 {
                tokio::time::sleep(delay).await;
            }

            match self.get_dep_graph(hashes, id).await {
                Ok(response) => {
                    if let Some(attributes) = response.data.and_then(|d| d.attributes) {
                        debug!(id, attempts = attempt + 1, "dependency graph resolved");
                        return Ok(attributes);
                    }
                    debug!(id, attempt = attempt + 1, "dependency graph not ready");
                }
                Err(e) => {
                    warn!(
                        id,
                        attempt = attempt + 1,
                        max_attempts,
                        error = %e,
                        "dependency graph fetch failed"
                    );
                }
            }
        }

        Err(ResolverError::GraphResolutionFailed {
            attempts: max_attempts,
        })
    }

    /// 해석된 그래프에 대한 이슈 분석을 요청합니다.
    pub async fn get_issues(
        &self,
        attributes: &IssuesRequestAttributes,
    ) -> Result<GetIssuesResponse, ResolverError> {
        let body = serde_json::to_value(attributes).map_err(|e| ResolverError::Decode {
            context: "issues request".to_owned(),
            reason: e.to_string(),
        })?;

        let request = HttpRequest::post(format!(
            "{}/unmanaged_ecosystem/issues",
            self.config.rest_url
        ))
        .headers(graph_headers(self.config))
        .query(Self::version_query(&self.config.issues_api_version))
        .json(body);

        decode(self.transport.send(request).await?, "get issues")
    }

    /// 스캔 결과 하나를 그래프 리소스 프로토콜로 해석합니다.
    pub async fn resolve(&self, scan_result: &ScanResult) -> Result<RawTestResult, ResolverError> {
        let hashes = FileHashes {
            hashes: convert_scan_result_to_hashes(scan_result)?,
        };

        let id = self.create_dep_graph(&hashes).await?;
        debug!(id = %id, files = hashes.hashes.len(), "dependency graph resource created");

        let attributes = self.resolve_dep_graph(&hashes, &id).await?;
        let request = convert_dep_graph_attributes(attributes);
        let response = self.get_issues(&request).await?;

        let result = response.data.result;
        Ok(RawTestResult {
            issues: convert_issues(result.issues),
            issues_data: convert_issues_data(result.issues_data),
            dep_graph_data: result.dep_graph.map(convert_dep_graph).unwrap_or_default(),
            deps_file_paths: result.deps_file_paths,
            file_signatures_details: result.file_signatures_details.map(convert_file_signatures),
            remediation: None,
        })
    }
}
