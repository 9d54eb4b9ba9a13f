//! 표준 도메인 타입
//!
//! 리졸버 내부와 출력 포매터가 공유하는 camelCase 표준 형태입니다.
//! 백엔드 wire 형태(snake_case)는 [`crate::wire`]에 있고,
//! 두 형태 사이의 변환은 [`crate::translate`]가 담당합니다.
//!
//! 모든 맵은 `BTreeMap`을 사용하므로 직렬화 순서가 결정적입니다.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

use depprobe_core::types::Severity;

/// 누락 키와 명시적 `null`을 모두 기본값으로 디코딩합니다.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// --- 입력: 스캔 결과 ---

/// 스캔 결과 문서 (`{"scanResults": [...]}`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginResponse {
    /// 스캔 결과 목록
    #[serde(default, deserialize_with = "null_as_default")]
    pub scan_results: Vec<ScanResult>,
}

/// 스캔 수집기가 생성한 입력 단위
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub identity: Identity,
    #[serde(default, deserialize_with = "null_as_default")]
    pub facts: Vec<Facts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub findings: Option<Vec<Finding>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ScanTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<Vec<Analytics>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_reference: Option<String>,
}

/// 스캔 식별 정보
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// 스캔 유형 (예: `cpp`)
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<BTreeMap<String, String>>,
}

/// 유형이 지정된 사실 블록 (예: 파일 해시 목록)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facts {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: serde_json::Value,
}

/// 스캔 수집기가 이미 판정한 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: serde_json::Value,
}

/// 플러그인 분석 지표
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: serde_json::Value,
}

/// 스캔 대상
///
/// 필수 필드가 있는 변형부터 시도합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScanTarget {
    Container(ContainerTarget),
    Unknown(UnknownTarget),
    Git(GitTarget),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerTarget {
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownTarget {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

// --- 파일 해시 ---

/// 해시 인코딩 하나 (`format`은 알고리즘 태그)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashFormat {
    pub format: u32,
    pub data: String,
}

/// 스캔된 파일 하나의 지문
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHash {
    pub path: String,
    pub size: u64,
    pub hashes_ffm: Vec<HashFormat>,
}

/// 그래프 리소스 요청 본문
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHashes {
    pub hashes: Vec<FileHash>,
}

// --- 의존성 그래프 ---

/// 루트 노드의 관례적 ID
pub const ROOT_NODE_ID: &str = "root-node";

/// 표준 의존성 그래프
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepGraphData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pkg_manager: PkgManager,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pkgs: Vec<Pkg>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub graph: Graph,
}

impl DepGraphData {
    /// ID로 노드를 찾습니다.
    pub fn find_node(&self, node_id: &str) -> Option<&Node> {
        self.graph
            .nodes
            .iter()
            .find(|n| n.node_id.as_deref() == Some(node_id))
    }
}

/// 패키지 관리자 (wire/표준 공통)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkgManager {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// 패키지 (wire/표준 공통)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pkg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub info: PkgInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkgInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purl: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_node_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_details: Option<ComponentDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pkg_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub deps: Vec<Dep>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

/// 비관리 컴포넌트 식별 메타데이터
pub type ComponentDetails = BTreeMap<String, Details>;

/// 컴포넌트 하나의 설명
///
/// 입력은 `filePaths`와 `file_paths`를 모두 받습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
    #[serde(default, alias = "file_paths", deserialize_with = "null_as_default")]
    pub file_paths: Vec<String>,
}

// --- 이슈 ---

/// 해석된 패키지 하나와 취약점 하나의 연결
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(default, deserialize_with = "null_as_default")]
    pub pkg_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pkg_version: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub issue_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fix_info: FixInfo,
}

impl Issue {
    /// 패키지 좌표 (`name@version`, 버전이 없으면 `name`)
    pub fn coordinate(&self) -> String {
        match &self.pkg_version {
            Some(version) => format!("{}@{}", self.pkg_name, version),
            None => self.pkg_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub upgrade_paths: Vec<UpgradePath>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_patchable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nearest_fixed_in_version: Option<String>,
}

/// 업그레이드 경로 (wire/표준 공통, 항목은 camelCase)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradePath {
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: Vec<UpgradePathItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradePathItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_dropped: Option<bool>,
}

/// 이슈 ID별 메타데이터
pub type IssuesData = BTreeMap<String, IssueData>;

/// 이슈 메타데이터
///
/// 병합 단계에서 `from`, `name`, `packageManager`가 채워져
/// 취약점(vulnerability) 레코드가 됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub below: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semver: Option<Semver>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub patches: Vec<Patch>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_new: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fixed_in: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reachability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// 취약 버전 범위 (문자열 하나 또는 목록)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VulnerableRange {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Semver {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vulnerable: Option<VulnerableRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vulnerable_hashes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vulnerable_by_distro: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_time: Option<String>,
}

/// 파일 집합이 패키지로 귀속된 신뢰도
pub type FileSignaturesDetails = BTreeMap<String, FileSignatureDetail>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSignatureDetail {
    #[serde(default, deserialize_with = "null_as_default")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_paths: Vec<String>,
}

/// 패키지 키별 파일 경로
pub type DepsFilePaths = BTreeMap<String, Vec<String>>;

// --- 결과 ---

/// 토큰 폴링 프로토콜이 반환하는 결과 (이미 camelCase)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDependenciesResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub issues: Vec<Issue>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub issues_data: IssuesData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dep_graph_data: Option<DepGraphData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deps_file_paths: Option<DepsFilePaths>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_signatures_details: Option<FileSignaturesDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<serde_json::Value>,
}

impl From<TestDependenciesResult> for RawTestResult {
    fn from(result: TestDependenciesResult) -> Self {
        Self {
            issues: result.issues,
            issues_data: result.issues_data,
            dep_graph_data: result.dep_graph_data.unwrap_or_default(),
            deps_file_paths: result.deps_file_paths,
            file_signatures_details: result.file_signatures_details,
            remediation: result.remediation,
        }
    }
}

/// 프로토콜과 무관한 병합 전 결과
///
/// 두 프로토콜 전략 모두 이 형태로 수렴한 뒤 공통 병합 단계로 넘어갑니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTestResult {
    pub issues: Vec<Issue>,
    pub issues_data: IssuesData,
    pub dep_graph_data: DepGraphData,
    pub deps_file_paths: Option<DepsFilePaths>,
    pub file_signatures_details: Option<FileSignaturesDetails>,
    pub remediation: Option<serde_json::Value>,
}

/// 경로 하나의 최종 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub issues: Vec<Issue>,
    pub issues_data: IssuesData,
    pub dep_graph_data: DepGraphData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deps_file_paths: Option<DepsFilePaths>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_signatures_details: Option<FileSignaturesDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<serde_json::Value>,
    pub vulnerabilities: Vec<IssueData>,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_count: Option<usize>,
    pub package_manager: String,
}

/// 경로별 스캔 결과 묶음 (삽입 순서 유지)
pub type ScanBatch = Vec<(String, Vec<ScanResult>)>;

/// 실행 옵션
///
/// 토큰 폴링 쿼리 문자열과 정책 탐색에 쓰입니다.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// 조직 ID (없으면 설정의 기본 조직)
    pub org: Option<String>,
    /// 보고 최소 심각도
    pub severity_threshold: Option<Severity>,
    /// 정책 파일 무시
    pub ignore_policy: bool,
    /// 정책 파일 경로 직접 지정
    pub policy_path: Option<PathBuf>,
}
