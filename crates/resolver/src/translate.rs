//! 스키마 변환 — wire(snake_case) 형태와 표준(camelCase) 형태 사이의 필드 매핑
//!
//! 매핑은 구조체 리터럴로 작성된 `From` 구현이므로, wire 스키마에 필드가 추가되면
//! 매핑하지 않은 필드가 컴파일 에러로 드러납니다.
//!
//! 변환은 모두 전역(total)입니다. 누락 필드는 `None`으로 전파되고,
//! 배열 순서는 유지되며 중복 제거를 하지 않습니다.
//! 입력 스캔 결과를 해시 목록으로 바꾸는 [`convert_scan_result_to_hashes`]만
//! 형식이 맞지 않는 입력을 에러로 보고합니다.

use std::collections::HashSet;

use crate::error::ResolverError;
use crate::types::{
    DepGraphData, Dep, FileHash, FileSignatureDetail, FileSignaturesDetails, FixInfo, Graph,
    Issue, IssueData, IssuesData, Node, Patch, ScanResult, Semver,
};
use crate::wire::{
    Attributes, DepGraphDataOpenApi, DepOpenApi, FileSignatureDetailOpenApi,
    FileSignaturesDetailsOpenApi, FixInfoOpenApi, GraphOpenApi, IssueDataOpenApi, IssueOpenApi,
    IssuesDataOpenApi, IssuesRequestAttributes, NodeOpenApi, PatchOpenApi, SemverOpenApi,
};

// --- 의존성 그래프 (양방향) ---

impl From<DepOpenApi> for Dep {
    fn from(dep: DepOpenApi) -> Self {
        Self {
            node_id: dep.node_id,
        }
    }
}

impl From<&Dep> for DepOpenApi {
    fn from(dep: &Dep) -> Self {
        Self {
            node_id: dep.node_id.clone(),
        }
    }
}

impl From<NodeOpenApi> for Node {
    fn from(node: NodeOpenApi) -> Self {
        Self {
            node_id: node.node_id,
            pkg_id: node.pkg_id,
            deps: node.deps.into_iter().map(Dep::from).collect(),
        }
    }
}

impl From<&Node> for NodeOpenApi {
    fn from(node: &Node) -> Self {
        Self {
            node_id: node.node_id.clone(),
            pkg_id: node.pkg_id.clone(),
            deps: node.deps.iter().map(DepOpenApi::from).collect(),
        }
    }
}

impl From<GraphOpenApi> for Graph {
    fn from(graph: GraphOpenApi) -> Self {
        Self {
            root_node_id: graph.root_node_id,
            nodes: graph.nodes.into_iter().map(Node::from).collect(),
            component_details: graph.component_details,
        }
    }
}

impl From<&Graph> for GraphOpenApi {
    fn from(graph: &Graph) -> Self {
        Self {
            root_node_id: graph.root_node_id.clone(),
            nodes: graph.nodes.iter().map(NodeOpenApi::from).collect(),
            component_details: graph.component_details.clone(),
        }
    }
}

impl From<DepGraphDataOpenApi> for DepGraphData {
    fn from(data: DepGraphDataOpenApi) -> Self {
        Self {
            schema_version: data.schema_version,
            pkg_manager: data.pkg_manager,
            pkgs: data.pkgs,
            graph: Graph::from(data.graph),
        }
    }
}

impl From<&DepGraphData> for DepGraphDataOpenApi {
    fn from(data: &DepGraphData) -> Self {
        Self {
            schema_version: data.schema_version.clone(),
            pkg_manager: data.pkg_manager.clone(),
            pkgs: data.pkgs.clone(),
            graph: GraphOpenApi::from(&data.graph),
        }
    }
}

/// wire 의존성 그래프를 표준 형태로 변환합니다.
pub fn convert_dep_graph(data: DepGraphDataOpenApi) -> DepGraphData {
    DepGraphData::from(data)
}

/// 해석된 그래프 리소스 속성을 issues 요청 본문으로 변환합니다.
pub fn convert_dep_graph_attributes(attributes: Attributes) -> IssuesRequestAttributes {
    IssuesRequestAttributes {
        start_time: attributes.start_time,
        dep_graph: attributes
            .dep_graph_data
            .map(DepGraphData::from)
            .unwrap_or_default(),
        component_details: attributes.component_details.unwrap_or_default(),
    }
}

// --- 이슈 ---

impl From<FixInfoOpenApi> for FixInfo {
    fn from(fix: FixInfoOpenApi) -> Self {
        Self {
            upgrade_paths: fix.upgrade_paths,
            is_patchable: fix.is_patchable,
            nearest_fixed_in_version: fix.nearest_fixed_in_version,
        }
    }
}

impl From<IssueOpenApi> for Issue {
    fn from(issue: IssueOpenApi) -> Self {
        Self {
            pkg_name: issue.pkg_name.unwrap_or_default(),
            pkg_version: issue.pkg_version,
            issue_id: issue.issue_id.unwrap_or_default(),
            fix_info: FixInfo::from(issue.fix_info),
        }
    }
}

/// wire 이슈 목록을 표준 형태로 변환합니다 (순서 유지).
pub fn convert_issues(issues: Vec<IssueOpenApi>) -> Vec<Issue> {
    issues.into_iter().map(Issue::from).collect()
}

impl From<PatchOpenApi> for Patch {
    fn from(patch: PatchOpenApi) -> Self {
        Self {
            version: patch.version,
            id: patch.id,
            urls: patch.urls,
            modification_time: patch.modification_time,
        }
    }
}

impl From<SemverOpenApi> for Semver {
    fn from(semver: SemverOpenApi) -> Self {
        Self {
            vulnerable: semver.vulnerable,
            vulnerable_hashes: semver.vulnerable_hashes,
            vulnerable_by_distro: semver.vulnerable_by_distro,
        }
    }
}

impl From<IssueDataOpenApi> for IssueData {
    fn from(data: IssueDataOpenApi) -> Self {
        Self {
            id: data.id.unwrap_or_default(),
            package_name: data.package_name,
            version: data.version,
            module_name: data.module_name,
            below: data.below,
            semver: data.semver.map(Semver::from),
            patches: data.patches.into_iter().map(Patch::from).collect(),
            is_new: data.is_new,
            description: data.description,
            title: data.title,
            severity: data.severity,
            fixed_in: data.fixed_in,
            legal_instructions: data.legal_instructions,
            reachability: data.reachability,
            package_manager: data.package_manager,
            from: data.from,
            name: data.name,
        }
    }
}

/// wire 이슈 메타데이터 맵을 표준 형태로 변환합니다 (키 유지).
///
/// `id`가 비어 있으면 맵 키로 채웁니다.
pub fn convert_issues_data(data: IssuesDataOpenApi) -> IssuesData {
    data.into_iter()
        .map(|(key, value)| {
            let mut converted = IssueData::from(value);
            if converted.id.is_empty() {
                converted.id.clone_from(&key);
            }
            (key, converted)
        })
        .collect()
}

impl From<FileSignatureDetailOpenApi> for FileSignatureDetail {
    fn from(detail: FileSignatureDetailOpenApi) -> Self {
        Self {
            confidence: detail.confidence,
            file_paths: detail.file_paths,
        }
    }
}

/// wire 파일 서명 맵을 표준 형태로 변환합니다.
///
/// 표준 형태는 신뢰도와 파일 경로만 유지합니다.
pub fn convert_file_signatures(details: FileSignaturesDetailsOpenApi) -> FileSignaturesDetails {
    details
        .into_iter()
        .map(|(key, value)| (key, FileSignatureDetail::from(value)))
        .collect()
}

// --- 스캔 결과 → 해시 목록 ---

/// 스캔 결과의 첫 번째 사실 블록을 파일 해시 목록으로 변환합니다.
///
/// # Errors
///
/// - 사실 블록이 없음
/// - 블록 데이터가 해시 목록 형식이 아님
/// - 같은 경로가 두 번 등장함
pub fn convert_scan_result_to_hashes(
    scan_result: &ScanResult,
) -> Result<Vec<FileHash>, ResolverError> {
    let facts = scan_result.facts.first().ok_or_else(|| {
        ResolverError::InvalidScanResult("scan result contains no facts".to_owned())
    })?;

    let hashes: Vec<FileHash> = serde_json::from_value(facts.data.clone()).map_err(|e| {
        ResolverError::InvalidScanResult(format!(
            "facts of type '{}' are not a file hash list: {e}",
            facts.kind
        ))
    })?;

    let mut seen = HashSet::with_capacity(hashes.len());
    for hash in &hashes {
        if !seen.insert(hash.path.as_str()) {
            return Err(ResolverError::InvalidScanResult(format!(
                "duplicate file path in hash set: {}",
                hash.path
            )));
        }
    }

    Ok(hashes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Details, Facts, Identity, PkgManager};
    use serde_json::json;

    fn sample_wire_graph() -> DepGraphDataOpenApi {
        serde_json::from_value(json!({
            "schema_version": "1.2.0",
            "pkg_manager": {"name": "cpp"},
            "pkgs": [
                {"id": "root@0.0.0", "info": {"name": "root", "version": "0.0.0"}},
                {"id": "zlib@1.2.11", "info": {"name": "zlib", "version": "1.2.11"}},
                {"id": "openssl@1.1.1", "info": {"name": "openssl", "version": "1.1.1"}}
            ],
            "graph": {
                "root_node_id": "root-node",
                "nodes": [
                    {"node_id": "root-node", "pkg_id": "root@0.0.0",
                     "deps": [{"node_id": "zlib@1.2.11"}, {"node_id": "openssl@1.1.1"}]},
                    {"node_id": "zlib@1.2.11", "pkg_id": "zlib@1.2.11", "deps": []},
                    {"node_id": "openssl@1.1.1", "pkg_id": "openssl@1.1.1",
                     "deps": [{"node_id": "zlib@1.2.11"}]}
                ],
                "component_details": {
                    "zlib@1.2.11": {"artifact": "zlib", "version": "1.2.11",
                                    "file_paths": ["deps/zlib/inflate.c"]}
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn dep_graph_roundtrip_is_lossless() {
        let wire = sample_wire_graph();
        let canonical = convert_dep_graph(wire.clone());
        let back = DepGraphDataOpenApi::from(&canonical);
        assert_eq!(back, wire);
    }

    #[test]
    fn dep_graph_fields_are_renamed() {
        let canonical = convert_dep_graph(sample_wire_graph());
        let value = serde_json::to_value(&canonical).unwrap();
        assert_eq!(value["schemaVersion"], "1.2.0");
        assert_eq!(value["pkgManager"]["name"], "cpp");
        assert_eq!(value["graph"]["rootNodeId"], "root-node");
        assert_eq!(value["graph"]["nodes"][0]["nodeId"], "root-node");
        assert_eq!(value["graph"]["nodes"][0]["pkgId"], "root@0.0.0");
        assert_eq!(value["graph"]["nodes"][0]["deps"][1]["nodeId"], "openssl@1.1.1");
        assert_eq!(
            value["graph"]["componentDetails"]["zlib@1.2.11"]["filePaths"][0],
            "deps/zlib/inflate.c"
        );
    }

    #[test]
    fn every_dep_reference_resolves_after_translation() {
        let canonical = convert_dep_graph(sample_wire_graph());
        let ids: HashSet<_> = canonical
            .graph
            .nodes
            .iter()
            .filter_map(|n| n.node_id.as_deref())
            .collect();
        for node in &canonical.graph.nodes {
            for dep in &node.deps {
                let dep_id = dep.node_id.as_deref().unwrap();
                assert!(ids.contains(dep_id), "dangling dep {dep_id}");
            }
        }
        assert_eq!(canonical.graph.nodes.len(), 3);
    }

    #[test]
    fn node_and_dep_order_is_preserved() {
        let canonical = convert_dep_graph(sample_wire_graph());
        let order: Vec<_> = canonical
            .graph
            .nodes
            .iter()
            .map(|n| n.node_id.clone().unwrap())
            .collect();
        assert_eq!(order, vec!["root-node", "zlib@1.2.11", "openssl@1.1.1"]);
    }

    #[test]
    fn empty_wire_graph_translates_to_empty_canonical() {
        let canonical = convert_dep_graph(DepGraphDataOpenApi::default());
        assert_eq!(canonical.schema_version, None);
        assert_eq!(canonical.pkg_manager, PkgManager::default());
        assert!(canonical.graph.nodes.is_empty());
    }

    #[test]
    fn attributes_convert_to_issues_request() {
        let mut details = crate::types::ComponentDetails::new();
        details.insert(
            "zlib".to_owned(),
            Details {
                artifact: Some("zlib".to_owned()),
                file_paths: vec!["a.c".to_owned(), "b.c".to_owned()],
                ..Details::default()
            },
        );
        let attrs = Attributes {
            start_time: Some(1_656_000_000),
            dep_graph_data: Some(sample_wire_graph()),
            component_details: Some(details.clone()),
        };

        let request = convert_dep_graph_attributes(attrs);
        assert_eq!(request.start_time, Some(1_656_000_000));
        assert_eq!(request.dep_graph.graph.root_node_id.as_deref(), Some("root-node"));
        assert_eq!(request.component_details, details);
    }

    #[test]
    fn attributes_without_graph_yield_empty_request() {
        let request = convert_dep_graph_attributes(Attributes::default());
        assert_eq!(request.start_time, None);
        assert!(request.dep_graph.graph.nodes.is_empty());
        assert!(request.component_details.is_empty());
    }

    #[test]
    fn issues_keep_order_and_missing_fields() {
        let wire: Vec<IssueOpenApi> = serde_json::from_value(json!([
            {"pkg_name": "zlib", "pkg_version": "1.2.11", "issue_id": "CVE-1",
             "fix_info": {"upgrade_paths": [], "is_patchable": true,
                          "nearest_fixed_in_version": "1.2.12"}},
            {"pkg_name": "openssl", "issue_id": "CVE-2"}
        ]))
        .unwrap();

        let issues = convert_issues(wire);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].issue_id, "CVE-1");
        assert!(issues[0].fix_info.is_patchable);
        assert_eq!(
            issues[0].fix_info.nearest_fixed_in_version.as_deref(),
            Some("1.2.12")
        );
        assert_eq!(issues[1].pkg_version, None);
        assert!(!issues[1].fix_info.is_patchable);
    }

    #[test]
    fn issues_data_maps_every_field() {
        let wire: IssuesDataOpenApi = serde_json::from_value(json!({
            "CVE-1": {
                "id": "CVE-1", "package_name": "zlib", "version": "1.2.11",
                "module_name": "zlib", "below": "1.2.12",
                "semver": {"vulnerable": ["<1.2.12"], "vulnerable_hashes": ["abc"]},
                "patches": [{"version": "1.2.11", "id": "p1", "urls": ["u"],
                             "modification_time": "2022-01-01"}],
                "is_new": true, "description": "d", "title": "Overflow",
                "severity": "high", "fixed_in": ["1.2.12"],
                "legal_instructions": "l", "reachability": "reachable",
                "package_manager": "cpp", "from": ["x"], "name": "zlib"
            }
        }))
        .unwrap();

        let data = convert_issues_data(wire);
        let entry = &data["CVE-1"];
        assert_eq!(entry.package_name.as_deref(), Some("zlib"));
        assert_eq!(entry.module_name.as_deref(), Some("zlib"));
        assert_eq!(entry.patches[0].modification_time.as_deref(), Some("2022-01-01"));
        assert_eq!(
            entry.semver.as_ref().and_then(|s| s.vulnerable_hashes.clone()),
            Some(vec!["abc".to_owned()])
        );
        assert!(entry.is_new);
        assert_eq!(entry.severity, Some(depprobe_core::types::Severity::High));
        assert_eq!(entry.fixed_in, vec!["1.2.12"]);
        assert_eq!(entry.reachability.as_deref(), Some("reachable"));
        assert_eq!(entry.from, Some(vec!["x".to_owned()]));

        let value = serde_json::to_value(entry).unwrap();
        assert_eq!(value["packageName"], "zlib");
        assert_eq!(value["legalInstructions"], "l");
        assert_eq!(value["semver"]["vulnerableHashes"][0], "abc");
    }

    #[test]
    fn issues_data_without_id_uses_key() {
        let wire: IssuesDataOpenApi =
            serde_json::from_value(json!({"CVE-1": {"title": "Overflow"}})).unwrap();
        let data = convert_issues_data(wire);
        assert_eq!(data["CVE-1"].id, "CVE-1");
        assert_eq!(data["CVE-1"].title.as_deref(), Some("Overflow"));
    }

    #[test]
    fn file_signatures_keep_confidence_and_paths() {
        let wire: FileSignaturesDetailsOpenApi = serde_json::from_value(json!({
            "zlib@1.2.11": {"confidence": 0.75, "artifact": "zlib",
                            "file_paths": ["a.c", "b.c"]}
        }))
        .unwrap();
        let details = convert_file_signatures(wire);
        let entry = &details["zlib@1.2.11"];
        assert!((entry.confidence - 0.75).abs() < f64::EPSILON);
        assert_eq!(entry.file_paths, vec!["a.c", "b.c"]);
    }

    fn scan_result_with(data: serde_json::Value) -> ScanResult {
        ScanResult {
            identity: Identity {
                kind: "cpp".to_owned(),
                ..Identity::default()
            },
            facts: vec![Facts {
                kind: "fileSignatures".to_owned(),
                data,
            }],
            findings: None,
            name: None,
            policy: None,
            target: None,
            analytics: None,
            target_reference: None,
        }
    }

    #[test]
    fn scan_result_converts_to_hashes() {
        let scan = scan_result_with(json!([
            {"path": "src/a.c", "size": 120, "hashes_ffm": [{"format": 1, "data": "aa"}]},
            {"path": "src/b.c", "size": 64,
             "hashes_ffm": [{"format": 1, "data": "bb"}, {"format": 2, "data": "cc"}]}
        ]));
        let hashes = convert_scan_result_to_hashes(&scan).unwrap();
        assert_eq!(hashes.len(), 2);
        assert_eq!(hashes[1].path, "src/b.c");
        assert_eq!(hashes[1].hashes_ffm[1].format, 2);
    }

    #[test]
    fn scan_result_without_facts_is_invalid() {
        let mut scan = scan_result_with(json!([]));
        scan.facts.clear();
        assert!(matches!(
            convert_scan_result_to_hashes(&scan),
            Err(ResolverError::InvalidScanResult(_))
        ));
    }

    #[test]
    fn scan_result_with_malformed_facts_is_invalid() {
        let scan = scan_result_with(json!({"not": "a list"}));
        assert!(matches!(
            convert_scan_result_to_hashes(&scan),
            Err(ResolverError::InvalidScanResult(_))
        ));
    }

    #[test]
    fn duplicate_hash_path_is_invalid() {
        let scan = scan_result_with(json!([
            {"path": "src/a.c", "size": 1, "hashes_ffm": []},
            {"path": "src/a.c", "size": 2, "hashes_ffm": []}
        ]));
        let err = convert_scan_result_to_hashes(&scan).unwrap_err();
        assert!(err.to_string().contains("src/a.c"));
    }

    mod proptests {
        use super::*;
        use crate::types::{Pkg, PkgInfo, ROOT_NODE_ID};
        use proptest::collection::{btree_map, vec};
        use proptest::option;
        use proptest::prelude::*;

        fn node_id(index: usize) -> String {
            if index == 0 {
                ROOT_NODE_ID.to_owned()
            } else {
                format!("pkg-{index}@1.0.{index}")
            }
        }

        fn details_strategy() -> impl Strategy<Value = Details> {
            (
                option::of("[a-z]{1,8}"),
                option::of("[0-9]\\.[0-9]{1,2}"),
                option::of("[a-z]{1,8}"),
                vec("[a-z/]{1,12}\\.c", 0..3),
            )
                .prop_map(|(artifact, version, author, file_paths)| Details {
                    artifact,
                    version,
                    author,
                    file_paths,
                    ..Details::default()
                })
        }

        /// 임의 그래프: 빈 `deps`, 공유 대상, 자기 참조, 선택 필드 누락을 포함합니다.
        fn wire_graph_strategy() -> impl Strategy<Value = DepGraphDataOpenApi> {
            (1usize..8)
                .prop_flat_map(|count| {
                    (
                        vec((any::<bool>(), vec(0..count, 0..4)), count),
                        option::of("[0-9]\\.[0-9]\\.[0-9]"),
                        option::of("[a-z]{2,6}"),
                        any::<bool>(),
                        option::of(btree_map("[a-z]{1,6}@[0-9]\\.[0-9]", details_strategy(), 0..3)),
                    )
                })
                .prop_map(|(nodes, schema_version, manager, with_root, component_details)| {
                    let pkgs = (0..nodes.len())
                        .map(|i| Pkg {
                            id: Some(node_id(i)),
                            info: PkgInfo {
                                name: Some(format!("pkg-{i}")),
                                version: Some(format!("1.0.{i}")),
                                purl: None,
                            },
                        })
                        .collect();
                    let nodes = nodes
                        .into_iter()
                        .enumerate()
                        .map(|(i, (has_pkg, deps))| NodeOpenApi {
                            node_id: Some(node_id(i)),
                            pkg_id: has_pkg.then(|| node_id(i)),
                            deps: deps
                                .into_iter()
                                .map(|d| DepOpenApi {
                                    node_id: Some(node_id(d)),
                                })
                                .collect(),
                        })
                        .collect();
                    DepGraphDataOpenApi {
                        schema_version,
                        pkg_manager: PkgManager { name: manager },
                        pkgs,
                        graph: GraphOpenApi {
                            root_node_id: with_root.then(|| ROOT_NODE_ID.to_owned()),
                            nodes,
                            component_details,
                        },
                    }
                })
        }

        proptest! {
            #[test]
            fn roundtrip_is_lossless_for_any_graph(wire in wire_graph_strategy()) {
                let canonical = convert_dep_graph(wire.clone());
                prop_assert_eq!(DepGraphDataOpenApi::from(&canonical), wire);
            }

            #[test]
            fn canonical_json_roundtrip_keeps_graph(wire in wire_graph_strategy()) {
                let canonical = convert_dep_graph(wire);
                let value = serde_json::to_value(&canonical).unwrap();
                let decoded: DepGraphData = serde_json::from_value(value).unwrap();
                prop_assert_eq!(decoded, canonical);
            }

            #[test]
            fn every_dep_reference_survives_for_any_graph(wire in wire_graph_strategy()) {
                let canonical = convert_dep_graph(wire.clone());
                prop_assert_eq!(canonical.graph.nodes.len(), wire.graph.nodes.len());
                for (before, after) in wire.graph.nodes.iter().zip(&canonical.graph.nodes) {
                    let before_deps: Vec<_> = before.deps.iter().map(|d| d.node_id.clone()).collect();
                    let after_deps: Vec<_> = after.deps.iter().map(|d| d.node_id.clone()).collect();
                    prop_assert_eq!(before_deps, after_deps);
                    for dep in &after.deps {
                        let dep_id = dep.node_id.as_deref().unwrap_or_default();
                        prop_assert!(canonical.find_node(dep_id).is_some(), "dangling dep {}", dep_id);
                    }
                }
            }
        }
    }
}
