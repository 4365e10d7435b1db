// Concurrency limiter for outbound vendor calls.
//
// One limiter per connector process. Every vendor request (listing, export,
// permission lookup, stream open) acquires a slot before it is sent and keeps
// it until the body is read. Streamed downloads release it once opened. Calls
// from all accounts contend for the same pool.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Counting limiter over in-flight vendor calls.
///
/// Cloning is cheap and shares the underlying pool.
#[derive(Clone, Debug)]
pub struct ConcurrencyLimiter {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyLimiter {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Run `operation` once a slot is free. The slot is released when the
    /// operation completes, whether it succeeded or not.
    pub async fn run<F, T>(&self, operation: F) -> T
    where
        F: Future<Output = T>,
    {
        // The semaphore is never closed, so acquire cannot fail.
        let _permit = self.permits.acquire().await.ok();
        operation.await
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots not currently held by a running operation.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}
