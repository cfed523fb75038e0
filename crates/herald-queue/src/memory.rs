//! In-process queue transport.
//!
//! Same LPUSH/BRPOP semantics as the Redis backend, kept in a map of
//! deques. Useful for local runs and tests.

use crate::error::QueueResult;
use crate::transport::{QueueItem, QueueTransport};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use tokio::sync::Notify;
use tokio::time::{self, Duration, Instant};

/// In-memory queue transport.
#[derive(Default)]
pub struct MemoryQueue {
    lists: Mutex<HashMap<String, VecDeque<Vec<u8>>>>,
    pushed: Notify,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items currently in `queue`, head first.
    pub fn snapshot(&self, queue: &str) -> Vec<Vec<u8>> {
        self.lists
            .lock()
            .get(queue)
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn take_tail(&self, queue: &str) -> Option<QueueItem> {
        let mut lists = self.lists.lock();
        let payload = lists.get_mut(queue)?.pop_back()?;
        Some(QueueItem {
            source_queue: queue.to_string(),
            payload,
        })
    }
}

#[async_trait]
impl QueueTransport for MemoryQueue {
    async fn pop_blocking(&self, queue: &str, timeout: Duration) -> QueueResult<Option<QueueItem>> {
        let deadline = Instant::now() + timeout;

        loop {
            let notified = self.pushed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(item) = self.take_tail(queue) {
                return Ok(Some(item));
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = time::sleep_until(deadline) => {
                    return Ok(self.take_tail(queue));
                }
            }
        }
    }

    async fn pop_now(&self, queue: &str) -> QueueResult<Option<QueueItem>> {
        Ok(self.take_tail(queue))
    }

    async fn push(&self, queue: &str, payload: &[u8]) -> QueueResult<u64> {
        let length = {
            let mut lists = self.lists.lock();
            let list = lists.entry(queue.to_string()).or_default();
            list.push_front(payload.to_vec());
            list.len() as u64
        };
        self.pushed.notify_waiters();
        Ok(length)
    }

    async fn length(&self, queue: &str) -> QueueResult<u64> {
        Ok(self
            .lists
            .lock()
            .get(queue)
            .map(|list| list.len() as u64)
            .unwrap_or(0))
    }

    async fn ping(&self) -> QueueResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = MemoryQueue::new();
        assert_eq!(queue.push("q", b"first").await.unwrap(), 1);
        assert_eq!(queue.push("q", b"second").await.unwrap(), 2);
        assert_eq!(queue.snapshot("q"), vec![b"second".to_vec(), b"first".to_vec()]);

        let item = queue.pop_now("q").await.unwrap().unwrap();
        assert_eq!(item.payload, b"first".to_vec());
        assert_eq!(item.source_queue, "q");

        let item = queue.pop_blocking("q", Duration::from_secs(1)).await.unwrap().unwrap();
        assert_eq!(item.payload, b"second".to_vec());
        assert_eq!(queue.length("q").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_queues_are_independent() {
        let queue = MemoryQueue::new();
        queue.push("a", b"1").await.unwrap();
        assert_eq!(queue.length("b").await.unwrap(), 0);
        assert!(queue.pop_now("b").await.unwrap().is_none());
        assert_eq!(queue.length("a").await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pop_times_out() {
        let queue = MemoryQueue::new();
        let started = Instant::now();
        let item = queue.pop_blocking("q", Duration::from_secs(30)).await.unwrap();
        assert!(item.is_none());
        assert!(started.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pop_wakes_on_push() {
        let queue = Arc::new(MemoryQueue::new());
        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.pop_blocking("q", Duration::from_secs(30)).await })
        };

        time::sleep(Duration::from_secs(5)).await;
        queue.push("q", b"late").await.unwrap();

        let item = waiter.await.unwrap().unwrap().unwrap();
        assert_eq!(item.payload, b"late".to_vec());
    }

    #[tokio::test]
    async fn test_each_item_delivered_once() {
        let queue = Arc::new(MemoryQueue::new());
        for i in 0..20u8 {
            queue.push("q", &[i]).await.unwrap();
        }

        let mut handles = Vec::new();
        for _ in 0..4 {
            let queue = queue.clone();
            handles.push(tokio::spawn(async move {
                let mut seen = Vec::new();
                while let Some(item) = queue.pop_now("q").await.unwrap() {
                    seen.push(item.payload[0]);
                }
                seen
            }));
        }

        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.await.unwrap());
        }
        all.sort_unstable();
        assert_eq!(all, (0..20u8).collect::<Vec<_>>());
    }
}
