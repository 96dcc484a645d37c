//! Explicit store handle passed to every service.

use std::future::Future;
use std::time::Duration;

use document_store::{DocumentStore, StoreError};

/// Default deadline for a single store operation.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Store handle plus the deadline applied to each store call.
///
/// Services receive a context instead of reaching for process-wide
/// collection handles, so tests can hand each service its own store.
#[derive(Debug, Clone)]
pub struct StoreContext<S> {
    store: S,
    timeout: Duration,
}

impl<S: DocumentStore> StoreContext<S> {
    /// Creates a context with the default timeout.
    pub fn new(store: S) -> Self {
        Self::with_timeout(store, DEFAULT_STORE_TIMEOUT)
    }

    /// Creates a context with a custom timeout.
    pub fn with_timeout(store: S, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the per-operation timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs one store operation under the deadline.
    ///
    /// An elapsed deadline is reported as [`StoreError::Timeout`]; the
    /// underlying operation may still complete on the store side.
    pub async fn run<T, F>(&self, operation: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, operation).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "store operation timed out");
                metrics::counter!("store_timeouts_total").increment(1);
                Err(StoreError::Timeout(self.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use document_store::{CatalogStore, InMemoryDocumentStore};

    #[tokio::test]
    async fn run_passes_through_results() {
        let ctx = StoreContext::new(InMemoryDocumentStore::new());
        let products = ctx.run(ctx.store().list_products()).await.unwrap();
        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn run_times_out_slow_operations() {
        let store = InMemoryDocumentStore::new();
        store.set_delay(Duration::from_millis(200)).await;
        let ctx = StoreContext::with_timeout(store, Duration::from_millis(10));

        let result = ctx.run(ctx.store().list_products()).await;
        assert!(matches!(result, Err(StoreError::Timeout(_))));
    }
}
