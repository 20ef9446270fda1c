//! Timeout utilities for page operations
//!
//! Every blocking browser call goes through [`with_page_timeout`] so a hung
//! navigation or a page that never settles fails only the item at hand.

use std::future::Future;
use std::time::Duration;

use super::{BrowseError, BrowseResult};

/// Wrap an async page operation with an explicit timeout
///
/// # Returns
/// * `Ok(T)` - Operation completed successfully
/// * `Err(BrowseError::TimedOut)` - The timeout elapsed first
/// * `Err(_)` - The operation itself failed
pub async fn with_page_timeout<F, T>(
    operation: F,
    timeout: Duration,
    operation_name: &'static str,
) -> BrowseResult<T>
where
    F: Future<Output = BrowseResult<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(BrowseError::TimedOut {
            operation: operation_name,
            after: timeout,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn elapsed_timeout_is_typed() {
        let result: BrowseResult<()> = with_page_timeout(
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
            Duration::from_millis(10),
            "navigation",
        )
        .await;

        match result {
            Err(BrowseError::TimedOut { operation, after }) => {
                assert_eq!(operation, "navigation");
                assert_eq!(after, Duration::from_millis(10));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn completed_operation_passes_through() {
        let value = with_page_timeout(async { Ok(7) }, Duration::from_secs(1), "evaluate")
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}
