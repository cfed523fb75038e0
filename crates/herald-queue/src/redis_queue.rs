//! Redis list transport.
//!
//! Producers `LPUSH` to the head and consumers `BRPOP` from the tail, which
//! gives FIFO order and hands every item to exactly one consumer.

use crate::config::QueueConfig;
use crate::error::{QueueError, QueueResult};
use crate::transport::{QueueItem, QueueTransport};
use async_trait::async_trait;
use parking_lot::Mutex;
use redis::aio::MultiplexedConnection;
use redis::{Client, RedisResult};
use std::time::Duration;
use tracing::{debug, info};

/// Redis-backed queue transport.
pub struct RedisQueue {
    client: Client,
    conn: Mutex<MultiplexedConnection>,
}

impl RedisQueue {
    /// Open a client, connect and probe the server.
    pub async fn connect(config: &QueueConfig) -> QueueResult<Self> {
        let client = Client::open(config.redis_url.as_str())
            .map_err(|e| QueueError::Config(format!("invalid redis url: {}", e)))?;
        let conn = client.get_multiplexed_async_connection().await?;

        let queue = Self {
            client,
            conn: Mutex::new(conn),
        };
        queue.ping().await?;

        info!(url = %config.redacted_url(), "Connected to Redis");
        Ok(queue)
    }

    fn connection(&self) -> MultiplexedConnection {
        self.conn.lock().clone()
    }
}

#[async_trait]
impl QueueTransport for RedisQueue {
    async fn pop_blocking(&self, queue: &str, timeout: Duration) -> QueueResult<Option<QueueItem>> {
        // BRPOP treats 0 as "block forever"
        if timeout.is_zero() {
            return self.pop_now(queue).await;
        }

        let mut conn = self.connection();
        let result: RedisResult<redis::Value> = redis::cmd("BRPOP")
            .arg(queue)
            .arg(timeout.as_secs_f64())
            .query_async(&mut conn)
            .await;

        let item = parse_brpop_reply(result?)?;
        if let Some(item) = &item {
            debug!(
                queue = %item.source_queue,
                payload_len = item.payload.len(),
                "Popped item"
            );
        }
        Ok(item)
    }

    async fn pop_now(&self, queue: &str) -> QueueResult<Option<QueueItem>> {
        let mut conn = self.connection();
        let payload: Option<Vec<u8>> = redis::cmd("RPOP")
            .arg(queue)
            .query_async(&mut conn)
            .await?;

        Ok(payload.map(|payload| QueueItem {
            source_queue: queue.to_string(),
            payload,
        }))
    }

    async fn push(&self, queue: &str, payload: &[u8]) -> QueueResult<u64> {
        let mut conn = self.connection();
        let length: u64 = redis::cmd("LPUSH")
            .arg(queue)
            .arg(payload)
            .query_async(&mut conn)
            .await?;
        Ok(length)
    }

    async fn length(&self, queue: &str) -> QueueResult<u64> {
        let mut conn = self.connection();
        let length: u64 = redis::cmd("LLEN").arg(queue).query_async(&mut conn).await?;
        Ok(length)
    }

    async fn ping(&self) -> QueueResult<()> {
        let mut conn = self.connection();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn reconnect(&self) -> QueueResult<()> {
        info!("Reconnecting to Redis...");
        let conn = self.client.get_multiplexed_async_connection().await?;
        *self.conn.lock() = conn;
        self.ping().await
    }
}

/// Parse a `BRPOP` reply: nil on timeout, otherwise `[key, value]`.
fn parse_brpop_reply(value: redis::Value) -> QueueResult<Option<QueueItem>> {
    let entries = match value {
        redis::Value::Nil => return Ok(None),
        redis::Value::Array(entries) => entries,
        other => {
            return Err(QueueError::Protocol(format!(
                "Unexpected BRPOP response type: {:?}",
                other
            )))
        }
    };

    if entries.len() != 2 {
        return Err(QueueError::Protocol(format!(
            "Expected [key, value] from BRPOP, got {} elements",
            entries.len()
        )));
    }

    let mut entries = entries.into_iter();
    let key = entries.next().map(bytes_of);
    let payload = entries.next().map(bytes_of);

    match (key, payload) {
        (Some(Some(key)), Some(Some(payload))) => Ok(Some(QueueItem {
            source_queue: String::from_utf8_lossy(&key).into_owned(),
            payload,
        })),
        _ => Err(QueueError::Protocol(
            "Expected bulk strings in BRPOP response".to_string(),
        )),
    }
}

fn bytes_of(value: redis::Value) -> Option<Vec<u8>> {
    match value {
        redis::Value::BulkString(bytes) => Some(bytes),
        redis::Value::SimpleString(s) => Some(s.into_bytes()),
        _ => None,
    }
}
