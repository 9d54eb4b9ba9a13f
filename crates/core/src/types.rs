//! 도메인 타입 — 크레이트 전역에서 사용되는 공통 열거형
//!
//! 생태계, 심각도, 프로토콜 선택 모드처럼 설정과 리졸버가
//! 함께 참조하는 값을 정의합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 비관리(네이티브) 생태계 결과에 붙는 고정 패키지 관리자 이름
pub const UNMANAGED_PACKAGE_MANAGER: &str = "Unmanaged (C/C++)";

/// 스캔 대상 생태계
///
/// 백엔드 프로토콜과 패키지 관리자 라벨을 결정합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// C/C++ 비관리 바이너리 (파일 해시 기반)
    Cpp,
    /// 컨테이너 이미지
    Docker,
    /// 소스 코드
    Code,
}

impl Ecosystem {
    /// 문자열에서 생태계를 파싱합니다 (대소문자 구분 없음).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cpp" | "c++" | "unmanaged" => Some(Self::Cpp),
            "docker" | "container" => Some(Self::Docker),
            "code" | "sast" => Some(Self::Code),
            _ => None,
        }
    }

    /// 비관리 생태계 여부 (그래프 리소스 프로토콜 후보)
    pub fn is_unmanaged(&self) -> bool {
        matches!(self, Self::Cpp)
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpp => write!(f, "cpp"),
            Self::Docker => write!(f, "docker"),
            Self::Code => write!(f, "code"),
        }
    }
}

/// 취약점 심각도
///
/// 순서 비교가 가능합니다 (Low < Medium < High < Critical).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// 낮은 심각도
    #[default]
    Low,
    /// 중간 심각도
    Medium,
    /// 높은 심각도
    High,
    /// 치명적 — 즉시 대응 필요
    Critical,
}

impl Severity {
    /// 문자열에서 심각도를 파싱합니다.
    ///
    /// 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" | "crit" => Some(Self::Critical),
            _ => None,
        }
    }

    /// 소문자 이름을 반환합니다 (쿼리 문자열, SARIF 속성용).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

/// 해석 프로토콜 선택 모드
///
/// `Auto`는 원격 기능 플래그를 조회해 결정합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolMode {
    /// 기능 플래그로 결정
    #[default]
    Auto,
    /// 토큰 기반 폴링 프로토콜 고정
    Legacy,
    /// 그래프 리소스 프로토콜 고정
    Graph,
}

impl ProtocolMode {
    /// 문자열에서 프로토콜 모드를 파싱합니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "legacy" | "polling" => Some(Self::Legacy),
            "graph" | "graph-resource" | "rest" => Some(Self::Graph),
            _ => None,
        }
    }
}

impl fmt::Display for ProtocolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Legacy => write!(f, "legacy"),
            Self::Graph => write!(f, "graph"),
        }
    }
}
