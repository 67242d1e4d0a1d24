// src/extractor/gate.rs

use std::{future::Future, sync::Arc};
use tokio::sync::Semaphore;

/// 限制同时在途的网络请求数。
///
/// 许可只在单次请求期间持有，遍历递归本身不占用许可，因此深层树不会死锁。
#[derive(Clone)]
pub struct RequestGate {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl RequestGate {
    pub fn new(max_in_flight: usize) -> Self {
        let capacity = max_in_flight.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub async fn run<F>(&self, request: F) -> F::Output
    where
        F: Future,
    {
        // 信号量从不关闭，acquire 失败时直接放行
        let _permit = self.permits.acquire().await.ok();
        request.await
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_flight(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }
}
