//! Correlation ids for grouping audit entries
//!
//! Entries written inside a [`with_correlation_id`] scope share the scoped id.
//! Outside any scope each entry gets a fresh UUID.

use std::future::Future;

use uuid::Uuid;

tokio::task_local! {
    static CORRELATION_ID: String;
}

/// The correlation id of the current task scope, or a fresh UUID v4
pub fn current_correlation_id() -> String {
    CORRELATION_ID
        .try_with(Clone::clone)
        .unwrap_or_else(|_| Uuid::new_v4().to_string())
}

/// Run `fut` with `correlation_id` attached to every entry it logs
pub async fn with_correlation_id<F>(correlation_id: impl Into<String>, fut: F) -> F::Output
where
    F: Future,
{
    CORRELATION_ID.scope(correlation_id.into(), fut).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fresh_id_outside_scope() {
        let first = current_correlation_id();
        let second = current_correlation_id();
        assert_ne!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[tokio::test]
    async fn test_scoped_id_is_shared() {
        let (a, b) = with_correlation_id("req-1", async {
            (current_correlation_id(), current_correlation_id())
        })
        .await;
        assert_eq!(a, "req-1");
        assert_eq!(b, "req-1");
    }

    #[tokio::test]
    async fn test_nested_scope_overrides() {
        let inner = with_correlation_id("outer", async {
            let inner = with_correlation_id("inner", async { current_correlation_id() }).await;
            assert_eq!(current_correlation_id(), "outer");
            inner
        })
        .await;
        assert_eq!(inner, "inner");
    }
}
