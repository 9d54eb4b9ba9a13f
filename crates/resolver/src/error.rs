//! 리졸버 에러 타입
//!
//! [`ResolverError`]는 해석 파이프라인에서 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<ResolverError> for DepprobeError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 자연스럽게 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **전송**: `Http`, `Network`, `Decode`
//! - **폴링/해석**: `ProcessingFailed`, `PollingExhausted`, `GraphResolutionFailed`
//! - **데이터**: `InvalidScanResult`, `InconsistentResult`
//! - **정책/설정**: `PolicyLoad`, `Config`
//!
//! # 상태 코드 분류
//!
//! [`ResolverError::status_code`]가 400-500 범위를 반환하면 배치 루프는
//! 메시지를 그대로 사용자에게 노출하고, 그 외에는 경로 단위의 일반 메시지로 대체합니다.

use depprobe_core::error::{ConfigError, DepprobeError, ResolveError};

/// 선언된 처리 실패에 부여되는 상태 코드
const PROCESSING_FAILED_STATUS: u16 = 500;

/// 리졸버 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// 백엔드가 2xx가 아닌 상태로 응답
    #[error("http error {status}: {message}")]
    Http {
        /// HTTP 상태 코드
        status: u16,
        /// 응답 본문의 `message` 또는 상태 사유
        message: String,
    },

    /// 네트워크 실패 또는 타임아웃
    #[error("network error: {0}")]
    Network(String),

    /// 응답 본문 디코딩 실패
    #[error("decode error: {context}: {reason}")]
    Decode {
        /// 디코딩 대상 (엔드포인트 또는 타입)
        context: String,
        /// 실패 사유
        reason: String,
    },

    /// 백엔드가 폴링 중 종료 실패 상태를 선언
    #[error(
        "failed to process the project (status {status}), run the command again with debug logging and contact support"
    )]
    ProcessingFailed {
        /// 백엔드가 보고한 상태 문자열
        status: String,
    },

    /// 토큰 폴링 시도 횟수 초과
    #[error("exceeded polling max attempts ({max_attempts})")]
    PollingExhausted {
        /// 허용된 최대 시도 횟수
        max_attempts: u32,
    },

    /// 의존성 그래프 조회 시도 횟수 초과
    #[error("failed to resolve dependency graph after {attempts} attempts")]
    GraphResolutionFailed {
        /// 수행한 시도 횟수
        attempts: u32,
    },

    /// 스캔 결과가 해시 목록으로 변환될 수 없음
    #[error("invalid scan result: {0}")]
    InvalidScanResult(String),

    /// 응답 내부 데이터가 서로 맞지 않음
    #[error("inconsistent result: {0}")]
    InconsistentResult(String),

    /// 무시 정책 파일 로딩 실패
    #[error("failed to load policy from {path}: {reason}")]
    PolicyLoad {
        /// 정책 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl ResolverError {
    /// 사용자 노출 분류에 쓰이는 상태 코드를 반환합니다.
    ///
    /// HTTP 에러는 응답 상태를, 선언된 처리 실패는 500을 반환합니다.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::ProcessingFailed { .. } => Some(PROCESSING_FAILED_STATUS),
            _ => None,
        }
    }

    /// 사용자에게 그대로 보여줄 메시지를 반환합니다.
    ///
    /// HTTP 에러는 백엔드 메시지만, 그 외에는 `Display` 출력을 사용합니다.
    pub fn user_message(&self) -> String {
        match self {
            Self::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<ResolverError> for DepprobeError {
    fn from(err: ResolverError) -> Self {
        match err {
            ResolverError::Http { status, message } => {
                DepprobeError::Resolve(ResolveError::Backend { status, message })
            }
            ResolverError::ProcessingFailed { status } => {
                DepprobeError::Resolve(ResolveError::Backend {
                    status: PROCESSING_FAILED_STATUS,
                    message: format!("processing failed with status {status}"),
                })
            }
            ResolverError::Network(msg) => DepprobeError::Resolve(ResolveError::Transport(msg)),
            ResolverError::Decode { context, reason } => DepprobeError::Resolve(
                ResolveError::InvalidData(format!("decode error: {context}: {reason}")),
            ),
            ResolverError::PollingExhausted { max_attempts } => DepprobeError::Resolve(
                ResolveError::Exhausted(format!("polling exceeded {max_attempts} attempts")),
            ),
            ResolverError::GraphResolutionFailed { attempts } => {
                DepprobeError::Resolve(ResolveError::Exhausted(format!(
                    "dependency graph unresolved after {attempts} attempts"
                )))
            }
            ResolverError::InvalidScanResult(msg) | ResolverError::InconsistentResult(msg) => {
                DepprobeError::Resolve(ResolveError::InvalidData(msg))
            }
            ResolverError::PolicyLoad { path, reason } => {
                DepprobeError::Resolve(ResolveError::Policy(format!("{path}: {reason}")))
            }
            ResolverError::Config { field, reason } => {
                DepprobeError::Config(ConfigError::InvalidValue { field, reason })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_exposes_status_and_raw_message() {
        let err = ResolverError::Http {
            status: 404,
            message: "Token not found".to_owned(),
        };
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.user_message(), "Token not found");
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn processing_failed_maps_to_500() {
        let err = ResolverError::ProcessingFailed {
            status: "ERROR".to_owned(),
        };
        assert_eq!(err.status_code(), Some(500));
        assert!(err.user_message().contains("failed to process the project"));
    }

    #[test]
    fn exhaustion_errors_have_no_status() {
        assert_eq!(
            ResolverError::PollingExhausted { max_attempts: 3 }.status_code(),
            None
        );
        assert_eq!(
            ResolverError::GraphResolutionFailed { attempts: 50 }.status_code(),
            None
        );
        assert_eq!(ResolverError::Network("reset".to_owned()).status_code(), None);
    }

    #[test]
    fn converts_to_depprobe_error() {
        let err: DepprobeError = ResolverError::Http {
            status: 401,
            message: "unauthorized".to_owned(),
        }
        .into();
        assert!(matches!(
            err,
            DepprobeError::Resolve(ResolveError::Backend { status: 401, .. })
        ));

        let err: DepprobeError = ResolverError::Config {
            field: "api_url".to_owned(),
            reason: "empty".to_owned(),
        }
        .into();
        assert!(matches!(err, DepprobeError::Config(_)));

        let err: DepprobeError = ResolverError::GraphResolutionFailed { attempts: 50 }.into();
        assert!(matches!(err, DepprobeError::Resolve(ResolveError::Exhausted(_))));
    }

    #[test]
    fn policy_load_error_display() {
        let err = ResolverError::PolicyLoad {
            path: "/tmp/.snyk".to_owned(),
            reason: "invalid yaml".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/.snyk"));
        assert!(msg.contains("invalid yaml"));
    }
}
