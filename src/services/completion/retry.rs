//! 지수 백오프 재시도 조합기.
//!
//! `attempt`는 한 번의 시도만 수행하는 함수이고, 재시도 여부는
//! `is_retryable` 술어가, 대기 시간은 `RetryPolicy`가 정합니다.
//! 네트워크와 무관하게 단독으로 테스트할 수 있습니다.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 첫 시도 이후 추가로 시도할 횟수
    pub max_retries: usize,
    /// 첫 재시도 전 대기 시간. 재시도마다 두 배
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_factor(2.0)
            .with_max_times(self.max_retries)
    }
}

/// `attempt`를 최대 `1 + max_retries`번 실행합니다.
///
/// `is_retryable`이 false를 돌려주는 에러는 곧바로 반환되고,
/// 재시도 예산을 다 쓰면 마지막 에러가 반환됩니다.
pub async fn retry_with_backoff<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    is_retryable: P,
    attempt: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    attempt
        .retry(policy.backoff())
        .when(|e: &E| is_retryable(e))
        .notify(|e: &E, delay: Duration| {
            tracing::warn!(
                backoff_ms = delay.as_millis() as u64,
                "Request failed, retrying after backoff: {}",
                e
            );
        })
        .await
}
