//! 에러 타입 — 도메인별 에러 정의

/// depprobe 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum DepprobeError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 원격 해석/테스트 에러
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 원격 해석/테스트 에러
///
/// 리졸버 크레이트의 상세 에러가 상위 레이어로 전파될 때 사용하는 요약 형태입니다.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// 백엔드가 HTTP 상태 코드로 거절
    #[error("backend returned status {status}: {message}")]
    Backend { status: u16, message: String },

    /// 네트워크/전송 실패
    #[error("transport failed: {0}")]
    Transport(String),

    /// 폴링 또는 그래프 해석 시도 횟수 초과
    #[error("attempts exhausted: {0}")]
    Exhausted(String),

    /// 응답 또는 입력 데이터가 올바르지 않음
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// 정책 파일 로딩 실패
    #[error("policy error: {0}")]
    Policy(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_to_top_level() {
        let err: DepprobeError = ConfigError::InvalidValue {
            field: "api.url".to_owned(),
            reason: "must not be empty".to_owned(),
        }
        .into();
        assert!(matches!(err, DepprobeError::Config(_)));
        assert!(err.to_string().contains("api.url"));
    }

    #[test]
    fn resolve_error_display() {
        let err = ResolveError::Backend {
            status: 404,
            message: "token not found".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("token not found"));
    }

    #[test]
    fn io_error_converts_to_top_level() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: DepprobeError = io_err.into();
        assert!(matches!(err, DepprobeError::Io(_)));
    }
}
