//! depprobe 공통 크레이트
//!
//! 원격 취약점 테스트 파이프라인의 모든 크레이트가 공유하는
//! 에러 타입, 설정, 도메인 열거형을 정의합니다.
//!
//! - [`error`]: 최상위 에러 (`DepprobeError`)와 도메인별 에러
//! - [`config`]: `depprobe.toml` 파싱, 환경변수 오버라이드, 검증
//! - [`types`]: 생태계(`Ecosystem`), 심각도(`Severity`), 프로토콜 모드

pub mod config;
pub mod error;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, DepprobeError, ResolveError};

// 설정
pub use config::DepprobeConfig;

// 도메인 타입
pub use types::{Ecosystem, ProtocolMode, Severity, UNMANAGED_PACKAGE_MANAGER};
