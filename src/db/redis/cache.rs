use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Vector for a canonical query text under a given embedding model
    QueryEmbedding { model: String, text: String },
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::QueryEmbedding { model, text } => write!(f, "qemb:{}:{}", model, text),
        }
    }
}

/// Creates a Redis client for caching
///
/// The client is cheap to clone; each operation opens a multiplexed connection.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Cache handler for storing and retrieving data from Redis
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    writer: JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Signals the writer task to flush pending writes and waits until it has
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");

        if let Err(e) = self.writer.await {
            tracing::warn!(error = %e, "Cache writer task ended abnormally");
        }
    }
}

impl Cache {
    /// Creates a new Cache instance with a background write task
    ///
    /// Writes go through a channel so a slow Redis never delays a response.
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        let writer = tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx, shutdown_rx).await;
        });

        let cache = Self {
            redis_client,
            write_tx,
        };

        (
            cache,
            CacheWriterHandle {
                shutdown_tx,
                writer,
            },
        )
    }

    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                message = write_rx.recv() => {
                    let Some(msg) = message else {
                        // Every Cache handle has been dropped
                        break;
                    };
                    if let Err(e) = Self::write_to_redis(&client, msg).await {
                        tracing::warn!(error = %e, "Failed to write to Redis cache");
                    }
                }
                _ = shutdown_rx.recv() => {
                    write_rx.close();
                    let mut flushed = 0usize;
                    while let Some(msg) = write_rx.recv().await {
                        if let Err(e) = Self::write_to_redis(&client, msg).await {
                            tracing::warn!(error = %e, "Failed to flush cache write during shutdown");
                        } else {
                            flushed += 1;
                        }
                    }
                    tracing::info!(flushed, "Cache writer flushed pending writes");
                    break;
                }
            }
        }

        tracing::info!("Cache writer task stopped");
    }

    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }

    /// Retrieves and deserializes a value, `None` on a cache miss
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Queues a value for writing without waiting for Redis
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: key.to_string(),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::warn!(error = %e, "Failed to send cache write message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Splits one RESP command array off the front of `buf`
    ///
    /// Returns the command name and the number of bytes consumed, or `None`
    /// while the frame is incomplete.
    fn parse_command(buf: &[u8]) -> Option<(String, usize)> {
        fn line(buf: &[u8], pos: usize) -> Option<(&str, usize)> {
            let end = buf[pos..].windows(2).position(|w| w == b"\r\n")? + pos;
            Some((std::str::from_utf8(&buf[pos..end]).ok()?, end + 2))
        }

        let (header, mut pos) = line(buf, 0)?;
        let count: usize = header.strip_prefix('*')?.parse().ok()?;
        let mut name = String::new();

        for i in 0..count {
            let (len, next) = line(buf, pos)?;
            let len: usize = len.strip_prefix('$')?.parse().ok()?;
            if buf.len() < next + len + 2 {
                return None;
            }
            if i == 0 {
                name = String::from_utf8_lossy(&buf[next..next + len]).to_uppercase();
            }
            pos = next + len + 2;
        }

        Some((name, pos))
    }

    /// Answers every command with `+OK` after a delay, counting SETEX calls
    async fn serve_slow_redis(mut socket: TcpStream, delay: Duration, setex: Arc<AtomicUsize>) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            while let Some((name, used)) = parse_command(&buf) {
                buf.drain(..used);
                tokio::time::sleep(delay).await;
                if name == "SETEX" {
                    setex.fetch_add(1, Ordering::SeqCst);
                }
                if socket.write_all(b"+OK\r\n").await.is_err() {
                    return;
                }
            }

            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }
    }

    async fn start_slow_redis(delay: Duration) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let setex = Arc::new(AtomicUsize::new(0));

        let counter = setex.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(serve_slow_redis(socket, delay, counter.clone()));
            }
        });

        (format!("redis://{}", addr), setex)
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_queued_writes() {
        let (url, setex) = start_slow_redis(Duration::from_millis(100)).await;
        let client = create_redis_client(&url).unwrap();
        let (cache, handle) = Cache::new(client);

        for i in 0..5 {
            let key = CacheKey::QueryEmbedding {
                model: "test".to_string(),
                text: format!("query {}", i),
            };
            cache.set_in_background(&key, &[i as f32], 60);
        }

        handle.shutdown().await;
        assert_eq!(setex.load(Ordering::SeqCst), 5);
    }

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    #[test]
    fn test_cache_key_display_query_embedding() {
        let key = CacheKey::QueryEmbedding {
            model: "all-MiniLM-L6-v2".to_string(),
            text: "happy feeling movie in genres: action comedy".to_string(),
        };
        assert_eq!(
            key.to_string(),
            "qemb:all-MiniLM-L6-v2:happy feeling movie in genres: action comedy"
        );
    }

    #[test]
    fn test_cache_key_distinguishes_models() {
        let a = CacheKey::QueryEmbedding {
            model: "a".to_string(),
            text: "calm".to_string(),
        };
        let b = CacheKey::QueryEmbedding {
            model: "b".to_string(),
            text: "calm".to_string(),
        };
        assert_ne!(a.to_string(), b.to_string());
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_set_in_background_writes_to_cache() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, _handle) = Cache::new(client.clone());

        let key = CacheKey::QueryEmbedding {
            model: "test".to_string(),
            text: "async write".to_string(),
        };
        let value = vec![0.25_f32, -0.5, 1.0];

        cache.set_in_background(&key, &value, 60);
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let retrieved: Option<Vec<f32>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(key.to_string()).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_cache_writer_flushes_on_shutdown() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, handle) = Cache::new(client.clone());

        let key = CacheKey::QueryEmbedding {
            model: "test".to_string(),
            text: "shutdown".to_string(),
        };
        let value = vec![1.0_f32];

        cache.set_in_background(&key, &value, 60);
        handle.shutdown().await;

        let retrieved: Option<Vec<f32>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(key.to_string()).await.unwrap();
    }
}
