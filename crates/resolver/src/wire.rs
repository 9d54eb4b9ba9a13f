//! 백엔드 wire 형태 — snake_case OpenAPI 리소스와 토큰 폴링 봉투
//!
//! 모든 스칼라 필드는 `Option`이고, 컬렉션과 플래그는 누락되거나 `null`이면
//! 기본값이 됩니다. 필드 누락은 디코딩 에러가 아닙니다.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use depprobe_core::types::Severity;

use crate::error::ResolverError;
use crate::types::{
    ComponentDetails, DepGraphData, DepsFilePaths, Pkg, PkgManager, ScanResult,
    TestDependenciesResult, UpgradePath, VulnerableRange,
};

/// JSON 값을 wire 타입으로 디코딩합니다.
pub fn decode<T: DeserializeOwned>(value: serde_json::Value, context: &str) -> Result<T, ResolverError> {
    serde_json::from_value(value).map_err(|e| ResolverError::Decode {
        context: context.to_owned(),
        reason: e.to_string(),
    })
}

// --- 의존성 그래프 (snake_case) ---

/// wire 의존성 그래프 (snake_case)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepGraphDataOpenApi {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub pkg_manager: PkgManager,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub pkgs: Vec<Pkg>,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub graph: GraphOpenApi,
}

/// wire 그래프 본체
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphOpenApi {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_node_id: Option<String>,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub nodes: Vec<NodeOpenApi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_details: Option<ComponentDetails>,
}

/// wire 그래프 노드
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeOpenApi {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pkg_id: Option<String>,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub deps: Vec<DepOpenApi>,
}

/// 노드 간 간선 (대상 노드 ID)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepOpenApi {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

// --- depgraphs 리소스 ---

/// JSON:API 버전 표기
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonApi {
    #[serde(default)]
    pub version: Option<String>,
}

/// 리소스 자기 링크
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Links {
    #[serde(default, rename = "self")]
    pub self_link: Option<String>,
}

/// depgraphs 생성 응답의 리소스 위치
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// depgraphs 생성 응답
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateDepGraphResponse {
    #[serde(default)]
    pub data: Option<LocationResponse>,
    #[serde(default)]
    pub jsonapi: Option<JsonApi>,
    #[serde(default)]
    pub links: Option<Links>,
}

/// 해석된 그래프 리소스의 속성
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Attributes {
    #[serde(default)]
    pub start_time: Option<i64>,
    #[serde(default)]
    pub dep_graph_data: Option<DepGraphDataOpenApi>,
    #[serde(default)]
    pub component_details: Option<ComponentDetails>,
}

/// 해석된 그래프 리소스
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepGraphResource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub attributes: Option<Attributes>,
}

/// depgraphs 조회 응답
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetDepGraphResponse {
    #[serde(default)]
    pub data: Option<DepGraphResource>,
    #[serde(default)]
    pub jsonapi: Option<JsonApi>,
    #[serde(default)]
    pub links: Option<Links>,
}

/// issues 요청 본문
///
/// 최상위 키는 snake_case, `dep_graph` 내부는 표준 camelCase 그래프입니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssuesRequestAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    pub dep_graph: DepGraphData,
    pub component_details: ComponentDetails,
}

// --- issues 리소스 ---

/// issues 조회 응답
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetIssuesResponse {
    #[serde(default)]
    pub jsonapi: Option<JsonApi>,
    #[serde(default)]
    pub links: Option<Links>,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub data: IssuesResponseData,
}

/// issues 응답의 `data` 블록
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssuesResponseData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub result: IssuesResponseResult,
}

/// issues 응답 본체 (이슈, 메타데이터, 그래프, 파일 서명)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssuesResponseResult {
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub issues: Vec<IssueOpenApi>,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub issues_data: IssuesDataOpenApi,
    #[serde(default)]
    pub dep_graph: Option<DepGraphDataOpenApi>,
    #[serde(default)]
    pub deps_file_paths: Option<DepsFilePaths>,
    #[serde(default)]
    pub file_signatures_details: Option<FileSignaturesDetailsOpenApi>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// wire 이슈 (패키지와 취약점 연결)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IssueOpenApi {
    #[serde(default)]
    pub pkg_name: Option<String>,
    #[serde(default)]
    pub pkg_version: Option<String>,
    #[serde(default)]
    pub issue_id: Option<String>,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub fix_info: FixInfoOpenApi,
}

/// wire 수정 정보
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FixInfoOpenApi {
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub upgrade_paths: Vec<UpgradePath>,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub is_patchable: bool,
    #[serde(default)]
    pub nearest_fixed_in_version: Option<String>,
}

/// 이슈 ID별 wire 메타데이터
pub type IssuesDataOpenApi = BTreeMap<String, IssueDataOpenApi>;

/// wire 이슈 메타데이터
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IssueDataOpenApi {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub module_name: Option<String>,
    #[serde(default)]
    pub below: Option<String>,
    #[serde(default)]
    pub semver: Option<SemverOpenApi>,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub patches: Vec<PatchOpenApi>,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub is_new: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub fixed_in: Vec<String>,
    #[serde(default)]
    pub legal_instructions: Option<String>,
    #[serde(default)]
    pub reachability: Option<String>,
    #[serde(default)]
    pub package_manager: Option<String>,
    #[serde(default)]
    pub from: Option<Vec<String>>,
    #[serde(default)]
    pub name: Option<String>,
}

/// 취약 버전 범위
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SemverOpenApi {
    #[serde(default)]
    pub vulnerable: Option<VulnerableRange>,
    #[serde(default)]
    pub vulnerable_hashes: Option<Vec<String>>,
    #[serde(default)]
    pub vulnerable_by_distro: Option<BTreeMap<String, Vec<String>>>,
}

/// 패치 정보
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PatchOpenApi {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub urls: Vec<String>,
    #[serde(default)]
    pub modification_time: Option<String>,
}

/// 패키지 키별 wire 파일 서명
pub type FileSignaturesDetailsOpenApi = BTreeMap<String, FileSignatureDetailOpenApi>;

/// 파일 서명 상세
///
/// 일부 백엔드 버전은 `version`을 `varsion`으로 보냅니다.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FileSignatureDetailOpenApi {
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub confidence: f64,
    #[serde(default)]
    pub artifact: Option<String>,
    #[serde(default, alias = "varsion")]
    pub version: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub file_paths: Vec<String>,
}

// --- 토큰 폴링 봉투 (camelCase) ---

/// `POST /test-dependencies` 본문
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDependenciesRequest<'a> {
    pub is_async: bool,
    pub scan_result: &'a ScanResult,
}

/// 폴링 지시자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingTask {
    /// 폴링 간격 (밀리초)
    pub poll_interval: u64,
    /// 최대 폴링 횟수
    pub max_attempts: u32,
}

/// 제출/폴링 응답
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveAndTestFactsResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub polling_task: Option<PollingTask>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub result: Option<TestDependenciesResult>,
}

/// 기능 플래그 조회 응답
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlagResponse {
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub ok: bool,
    #[serde(default)]
    pub user_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_tolerates_missing_fields() {
        let resp: GetIssuesResponse = decode(json!({}), "issues").unwrap();
        assert!(resp.data.result.issues.is_empty());
        assert!(resp.data.result.dep_graph.is_none());
    }

    #[test]
    fn decode_reports_context_on_type_mismatch() {
        let err = decode::<CreateDepGraphResponse>(json!({"data": 5}), "create depgraph")
            .unwrap_err();
        match err {
            ResolverError::Decode { context, .. } => assert_eq!(context, "create depgraph"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn issues_response_tolerates_null_fields() {
        let resp: GetIssuesResponse = decode(
            json!({"data": {"result": {
                "issues": [{"pkg_name": "zlib", "issue_id": "CVE-1",
                            "fix_info": {"upgrade_paths": null, "is_patchable": null}}],
                "issues_data": {"CVE-1": {"title": "Overflow", "patches": null,
                                          "is_new": null, "fixed_in": null}},
                "file_signatures_details": {"zlib@1.2.11": {"confidence": null, "file_paths": null}},
                "dep_graph": {"pkgs": null, "graph": {"nodes": [{"node_id": "root-node", "deps": null}]}}
            }}}),
            "get issues",
        )
        .unwrap();
        let result = resp.data.result;
        assert!(!result.issues[0].fix_info.is_patchable);
        assert!(result.issues_data["CVE-1"].patches.is_empty());
        assert!(result.issues_data["CVE-1"].fixed_in.is_empty());
        let details = result.file_signatures_details.unwrap();
        assert_eq!(details["zlib@1.2.11"].confidence, 0.0);
        assert!(details["zlib@1.2.11"].file_paths.is_empty());
        assert!(result.dep_graph.unwrap().graph.nodes[0].deps.is_empty());
    }

    #[test]
    fn null_result_object_decodes_as_empty() {
        let resp: GetIssuesResponse = decode(json!({"data": null}), "get issues").unwrap();
        assert!(resp.data.result.issues.is_empty());
    }

    #[test]
    fn file_signature_accepts_misspelled_version() {
        let detail: FileSignatureDetailOpenApi = serde_json::from_value(json!({
            "confidence": 0.9,
            "varsion": "1.0",
            "file_paths": ["lib/a.c"]
        }))
        .unwrap();
        assert_eq!(detail.version.as_deref(), Some("1.0"));
        assert_eq!(detail.file_paths, vec!["lib/a.c"]);
    }

    #[test]
    fn polling_response_parses_camel_case() {
        let resp: ResolveAndTestFactsResponse = serde_json::from_value(json!({
            "token": "abc",
            "pollingTask": {"pollInterval": 500, "maxAttempts": 3},
            "status": "PENDING"
        }))
        .unwrap();
        assert_eq!(resp.token.as_deref(), Some("abc"));
        assert_eq!(
            resp.polling_task,
            Some(PollingTask {
                poll_interval: 500,
                max_attempts: 3
            })
        );
        assert!(resp.result.is_none());
    }

    #[test]
    fn issues_request_serializes_mixed_casing() {
        let body = IssuesRequestAttributes {
            start_time: Some(1),
            dep_graph: DepGraphData::default(),
            component_details: ComponentDetails::new(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("start_time").is_some());
        assert!(value["dep_graph"].get("pkgManager").is_some());
        assert!(value.get("component_details").is_some());
    }
}
