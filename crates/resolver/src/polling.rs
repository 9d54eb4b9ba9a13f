//! 폴링 공통 헬퍼 — 처리 상태 판정과 시도 횟수 제한 지연

use std::time::Duration;

use tracing::debug;

use crate::error::ResolverError;

/// 백엔드가 선언하는 종료 실패 상태
const FAILED_STATUSES: &[&str] = &["CANCELLED", "ERROR"];

/// 폴링 응답의 처리 상태를 검사합니다.
///
/// 종료 실패 상태이면 즉시 `ProcessingFailed`를 반환합니다.
pub fn handle_processing_status(status: Option<&str>) -> Result<(), ResolverError> {
    match status {
        Some(s) if FAILED_STATUSES.contains(&s) => Err(ResolverError::ProcessingFailed {
            status: s.to_owned(),
        }),
        _ => Ok(()),
    }
}

/// 시도 횟수를 증가시키고, 한도를 넘으면 에러, 아니면 `interval`만큼 대기합니다.
pub async fn delay_next_step(
    attempts: &mut u32,
    max_attempts: u32,
    interval: Duration,
) -> Result<(), ResolverError> {
    *attempts = attempts.saturating_add(1);
    if *attempts > max_attempts {
        return Err(ResolverError::PollingExhausted { max_attempts });
    }
    debug!(
        attempt = *attempts,
        max_attempts,
        delay_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        "waiting before next poll"
    );
    tokio::time::sleep(interval).await;
    Ok(())
}
