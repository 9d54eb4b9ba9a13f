//! 결과 병합 — 정책 필터, 패키지 좌표 주석, 직접 의존성 수 계산
//!
//! 취약점(vulnerabilities) 목록은 정책 필터 **이전**의 이슈 메타데이터로 만듭니다.
//! 정책으로 제외된 이슈도 좌표 조회와 취약점 목록에 남습니다.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use depprobe_core::types::UNMANAGED_PACKAGE_MANAGER;

use crate::error::ResolverError;
use crate::policy::{SuppressionPolicy, filter_ignored_issues_at};
use crate::types::{
    DepGraphData, Issue, IssueData, IssuesData, ROOT_NODE_ID, RawTestResult, TestResult,
};

/// 루트 노드의 직접 의존성 수 (루트 노드가 없으면 `None`)
pub fn dependency_count(graph: &DepGraphData) -> Option<usize> {
    graph.find_node(ROOT_NODE_ID).map(|node| node.deps.len())
}

/// 이슈 메타데이터 각각에 패키지 좌표를 붙여 취약점 목록을 만듭니다.
///
/// # Errors
///
/// 메타데이터 키에 해당하는 이슈가 없으면 `InconsistentResult`입니다.
pub fn annotate_vulnerabilities(
    issues: &[Issue],
    issues_data: &IssuesData,
) -> Result<Vec<IssueData>, ResolverError> {
    let lookup: HashMap<&str, &Issue> = issues
        .iter()
        .map(|issue| (issue.issue_id.as_str(), issue))
        .collect();

    issues_data
        .iter()
        .map(|(issue_id, data)| {
            let issue = lookup.get(issue_id.as_str()).ok_or_else(|| {
                ResolverError::InconsistentResult(format!(
                    "issue data '{issue_id}' has no matching issue"
                ))
            })?;
            let coordinate = issue.coordinate();
            let id = if data.id.is_empty() {
                issue_id.clone()
            } else {
                data.id.clone()
            };
            Ok(IssueData {
                id,
                from: Some(vec![coordinate.clone()]),
                name: Some(coordinate),
                package_manager: Some(UNMANAGED_PACKAGE_MANAGER.to_owned()),
                ..data.clone()
            })
        })
        .collect()
}

/// 원시 결과와 정책으로 최종 결과를 조립합니다.
pub fn merge_test_result(
    path: &str,
    raw: RawTestResult,
    policy: Option<&SuppressionPolicy>,
) -> Result<TestResult, ResolverError> {
    merge_test_result_at(path, raw, policy, Utc::now())
}

/// `now`를 지정하는 [`merge_test_result`] 변형
pub fn merge_test_result_at(
    path: &str,
    raw: RawTestResult,
    policy: Option<&SuppressionPolicy>,
    now: DateTime<Utc>,
) -> Result<TestResult, ResolverError> {
    let (issues, issues_data) =
        filter_ignored_issues_at(&raw.issues, &raw.issues_data, policy, now);
    let vulnerabilities = annotate_vulnerabilities(&raw.issues, &raw.issues_data)?;
    let dependency_count = dependency_count(&raw.dep_graph_data);

    Ok(TestResult {
        issues,
        issues_data,
        dep_graph_data: raw.dep_graph_data,
        deps_file_paths: raw.deps_file_paths,
        file_signatures_details: raw.file_signatures_details,
        remediation: raw.remediation,
        vulnerabilities,
        path: path.to_owned(),
        dependency_count,
        package_manager: UNMANAGED_PACKAGE_MANAGER.to_owned(),
    })
}
