#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`ResolverError`)
//! - [`config`]: Resolver configuration (`ResolverConfig`, builder)
//! - [`types`]: Canonical domain model (`ScanResult`, `DepGraphData`, `Issue`, `TestResult`)
//! - [`wire`]: Wire-version payloads of the graph-resource API (snake_case shapes)
//! - [`translate`]: Wire <-> canonical mapping
//! - [`transport`]: HTTP seam (`Transport` trait, `HttpTransport`, header helpers)
//! - [`polling`]: Processing-status check and bounded delay shared by pollers
//! - [`legacy`]: Token-polling protocol (`LegacyPoller`)
//! - [`graph`]: Graph-resource protocol (`GraphResolver`)
//! - [`policy`]: Suppression policy loading and issue filtering
//! - [`merge`]: Final result assembly (`merge_test_result`)
//! - [`resolver`]: Orchestrator (`FactResolver`, `FactResolverBuilder`)
//!
//! # Architecture
//!
//! ```text
//! ScanBatch --> FactResolver --select_strategy--+--> LegacyPoller  --+
//!                                               |                    |
//!                                               +--> GraphResolver --+--> RawTestResult
//!                                                                              |
//!                                                 find_and_load_policy --> merge_test_result
//!                                                                              |
//!                                                              (Vec<TestResult>, Vec<String>)
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod legacy;
pub mod merge;
pub mod policy;
pub mod polling;
pub mod resolver;
pub mod translate;
pub mod transport;
pub mod types;
pub mod wire;

// --- Public API Re-exports ---

// Orchestrator
pub use resolver::{FactResolver, FactResolverBuilder, ProtocolStrategy, describe_failure};

// Configuration
pub use config::{ResolverConfig, ResolverConfigBuilder};

// Error
pub use error::ResolverError;

// Transport
pub use transport::{HttpRequest, HttpTransport, Method, Transport};

// Protocols
pub use graph::GraphResolver;
pub use legacy::LegacyPoller;

// Merge & policy
pub use merge::merge_test_result;
pub use policy::{SuppressionPolicy, filter_ignored_issues, find_and_load_policy};

// Types
pub use types::{
    DepGraphData, Issue, IssueData, IssuesData, RunOptions, ScanBatch, ScanResult, TestResult,
};
