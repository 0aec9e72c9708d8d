//! Race an async operation against a timer.

use std::future::Future;
use std::time::Duration;

use crate::error::TimeoutError;

/// Await `operation`, or give up with [`TimeoutError`] after `timeout`.
///
/// The operation is dropped (cancelled) when the timer wins.
pub async fn with_timeout<F>(timeout: Duration, operation: F) -> Result<F::Output, TimeoutError>
where
    F: Future,
{
    tokio::time::timeout(timeout, operation)
        .await
        .map_err(|_| TimeoutError(timeout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn resolves_with_value_when_fast() {
        let result = with_timeout(Duration::from_secs(5), async { 42 }).await;
        assert_eq!(result, Ok(42));
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_to_timeout_marker_when_slow() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            "late"
        };
        let result = with_timeout(Duration::from_secs(1), slow).await;
        assert_eq!(result, Err(TimeoutError(Duration::from_secs(1))));
        assert_eq!(
            result.unwrap_err().to_string(),
            "operation timed out after 1s"
        );
    }
}
