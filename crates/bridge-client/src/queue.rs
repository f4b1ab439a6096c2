//! Outbound message queue
//!
//! FIFO over opaque serialized payloads. The queue never rejects; depth
//! monitoring is the caller's job via the value returned from [`OutboundQueue::push`].

use std::collections::VecDeque;
use tokio::sync::Mutex;

/// Depth above which callers should log a warning
pub const QUEUE_WARN_DEPTH: usize = 100;

/// Thread-safe FIFO of pending serialized messages
#[derive(Default)]
pub struct OutboundQueue {
    inner: Mutex<VecDeque<String>>,
}

impl OutboundQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, returning the resulting depth
    pub async fn push(&self, message: String) -> usize {
        let mut inner = self.inner.lock().await;
        inner.push_back(message);
        inner.len()
    }

    /// Remove and return up to `max_batch` oldest messages, FIFO
    pub async fn drain(&self, max_batch: usize) -> Vec<String> {
        let mut inner = self.inner.lock().await;
        let count = max_batch.min(inner.len());
        inner.drain(..count).collect()
    }

    /// Put an unsent batch suffix back at the head, preserving order
    ///
    /// Used when a send fails mid-batch: the failed message and everything
    /// drained after it go back in front of whatever arrived meanwhile.
    pub async fn requeue_front(&self, batch: Vec<String>) {
        let mut inner = self.inner.lock().await;
        for message in batch.into_iter().rev() {
            inner.push_front(message);
        }
    }

    /// Discard all pending messages, returning how many were dropped
    pub async fn clear(&self) -> usize {
        let mut inner = self.inner.lock().await;
        let count = inner.len();
        inner.clear();
        count
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = OutboundQueue::new();
        queue.push("a".into()).await;
        queue.push("b".into()).await;
        queue.push("c".into()).await;

        assert_eq!(queue.drain(10).await, vec!["a", "b", "c"]);
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn test_drain_respects_batch_size() {
        let queue = OutboundQueue::new();
        for i in 0..5 {
            queue.push(format!("m{}", i)).await;
        }

        assert_eq!(queue.drain(2).await, vec!["m0", "m1"]);
        assert_eq!(queue.len().await, 3);
        assert_eq!(queue.drain(10).await, vec!["m2", "m3", "m4"]);
    }

    #[tokio::test]
    async fn test_push_reports_depth() {
        let queue = OutboundQueue::new();
        assert_eq!(queue.push("a".into()).await, 1);
        assert_eq!(queue.push("b".into()).await, 2);
    }

    #[tokio::test]
    async fn test_requeue_front_preserves_order() {
        let queue = OutboundQueue::new();
        queue.push("d".into()).await;

        // a failed batch suffix goes back in front of "d"
        queue.requeue_front(vec!["b".into(), "c".into()]).await;

        assert_eq!(queue.drain(10).await, vec!["b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_clear() {
        let queue = OutboundQueue::new();
        queue.push("a".into()).await;
        queue.push("b".into()).await;

        assert_eq!(queue.clear().await, 2);
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_producers_lose_nothing() {
        use std::sync::Arc;

        let queue = Arc::new(OutboundQueue::new());
        let mut handles = Vec::new();
        for producer in 0..4 {
            let queue = queue.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..50 {
                    queue.push(format!("p{}-{}", producer, i)).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(queue.len().await, 200);
    }
}
