//! 무시 정책 — `.snyk` YAML 로딩과 이슈 필터링
//!
//! 정책 파일 형식:
//!
//! ```yaml
//! version: v1.25.0
//! ignore:
//!   CVE-2022-0001:
//!     - '*':
//!         reason: not reachable
//!         expires: 2030-01-01T00:00:00.000Z
//! ```
//!
//! 모든 리소스(`*`)에 대한 규칙만 이슈를 제거합니다.
//! `expires`가 없거나 해석할 수 없으면 만료되지 않은 것으로 봅니다.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use depprobe_core::types::Ecosystem;

use crate::config::ResolverConfig;
use crate::error::ResolverError;
use crate::types::{Issue, IssuesData, RunOptions};

/// 모든 리소스를 뜻하는 규칙 키
const ALL_RESOURCES: &str = "*";

/// 무시 규칙 하나
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl IgnoreRule {
    /// `now` 기준으로 규칙이 만료되었는지 확인합니다.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires
            .as_deref()
            .and_then(parse_expiry)
            .is_some_and(|expires| expires < now)
    }
}

fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// 로드된 무시 정책
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuppressionPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// 이슈 ID → (리소스 경로 → 규칙) 목록
    #[serde(default)]
    pub ignore: BTreeMap<String, Vec<BTreeMap<String, IgnoreRule>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<serde_yaml::Value>,
}

impl SuppressionPolicy {
    /// YAML 문자열에서 정책을 파싱합니다. 빈 문서는 빈 정책입니다.
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// 이슈 ID에 대한 모든 리소스 규칙을 찾습니다.
    fn all_resources_rule(&self, issue_id: &str) -> Option<&IgnoreRule> {
        self.ignore
            .get(issue_id)?
            .iter()
            .find_map(|entry| entry.get(ALL_RESOURCES))
    }

    /// `now` 기준으로 이슈가 무시되는지 확인합니다.
    pub fn is_ignored(&self, issue_id: &str, now: DateTime<Utc>) -> bool {
        self.all_resources_rule(issue_id)
            .is_some_and(|rule| !rule.is_expired(now))
    }
}

/// 정책에 따라 이슈와 이슈 메타데이터를 걸러냅니다.
///
/// 원본은 건드리지 않고 걸러진 사본을 반환합니다.
pub fn filter_ignored_issues(
    issues: &[Issue],
    issues_data: &IssuesData,
    policy: Option<&SuppressionPolicy>,
) -> (Vec<Issue>, IssuesData) {
    filter_ignored_issues_at(issues, issues_data, policy, Utc::now())
}

/// `now`를 지정하는 [`filter_ignored_issues`] 변형
pub fn filter_ignored_issues_at(
    issues: &[Issue],
    issues_data: &IssuesData,
    policy: Option<&SuppressionPolicy>,
    now: DateTime<Utc>,
) -> (Vec<Issue>, IssuesData) {
    let Some(policy) = policy else {
        return (issues.to_vec(), issues_data.clone());
    };

    let mut filtered_data = issues_data.clone();
    let filtered_issues = issues
        .iter()
        .filter(|issue| {
            if policy.is_ignored(&issue.issue_id, now) {
                debug!(issue_id = %issue.issue_id, "issue ignored by policy");
                filtered_data.remove(&issue.issue_id);
                false
            } else {
                true
            }
        })
        .cloned()
        .collect();

    (filtered_issues, filtered_data)
}

/// 스캔 경로에서 정책 파일을 찾아 로드합니다.
///
/// 정책 무시가 설정되었거나 파일이 없으면 `None`을 반환합니다.
pub async fn find_and_load_policy(
    path: &str,
    ecosystem: Ecosystem,
    options: &RunOptions,
    config: &ResolverConfig,
) -> Result<Option<SuppressionPolicy>, ResolverError> {
    if options.ignore_policy || config.ignore_policy {
        debug!(path, "policy ignored by option");
        return Ok(None);
    }

    let policy_path = match &options.policy_path {
        Some(p) => p.clone(),
        None => {
            let base = if path.is_empty() { "." } else { path };
            Path::new(base).join(&config.policy_file)
        }
    };

    let policy = load_policy_from_file(&policy_path, config.max_policy_file_size).await?;
    if policy.is_some() {
        info!(
            path = %policy_path.display(),
            ecosystem = %ecosystem,
            "loaded suppression policy"
        );
    }
    Ok(policy)
}

/// 정책 파일을 로드합니다. 파일이 없으면 `None`입니다.
pub async fn load_policy_from_file(
    path: &Path,
    max_size: u64,
) -> Result<Option<SuppressionPolicy>, ResolverError> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no policy file found");
            return Ok(None);
        }
        Err(e) => {
            return Err(ResolverError::PolicyLoad {
                path: path.display().to_string(),
                reason: format!("failed to read metadata: {e}"),
            });
        }
    };

    if metadata.len() > max_size {
        return Err(ResolverError::PolicyLoad {
            path: path.display().to_string(),
            reason: format!("file too large: {} bytes (max: {max_size})", metadata.len()),
        });
    }

    let content =
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ResolverError::PolicyLoad {
                path: path.display().to_string(),
                reason: format!("failed to read file: {e}"),
            })?;

    SuppressionPolicy::parse(&content)
        .map(Some)
        .map_err(|e| ResolverError::PolicyLoad {
            path: path.display().to_string(),
            reason: format!("failed to parse YAML: {e}"),
        })
}
