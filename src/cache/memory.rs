use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::Instant;

use super::{CacheError, CacheStore};

type Storage = Arc<RwLock<HashMap<String, CacheEntry>>>;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    // 每次写入递增，过期任务只删除与自己代数相同的条目
    generation: u64,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// 基于内存的 TTL 缓存
///
/// 每次 `set_with_expiry` 都会启动一个独立的过期任务。任务到期后只有在条目
/// 仍是同一次写入时才会删除它，因此被刷新过的键不会被旧任务误删。
/// 克隆出的实例共享同一份存储。
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    storage: Storage,
    generation: Arc<AtomicU64>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn expire_if_current(storage: &Storage, key: &str, generation: u64) {
        let mut storage = storage.write();

        match storage.get(key) {
            // 已被删除
            None => {}
            // 已被重新写入
            Some(entry) if entry.generation != generation => {}
            Some(_) => {
                tracing::info!("cache - expiring key {}", key);
                storage.remove(key);
            }
        }
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let storage = self.storage.read();
        storage
            .get(key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        if key.is_empty() {
            tracing::warn!("cache - refusing to set a blank key");
            return Err(CacheError::InvalidKey);
        }

        // 超出时钟范围的 TTL 视为永不过期
        let expires_at = Instant::now().checked_add(ttl);

        let generation = {
            let mut storage = self.storage.write();
            let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
            storage.insert(
                key.to_string(),
                CacheEntry {
                    value: value.to_string(),
                    generation,
                    expires_at,
                },
            );
            generation
        };

        let Some(deadline) = expires_at else {
            return Ok(());
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let storage = Arc::clone(&self.storage);
                let key = key.to_string();
                handle.spawn(async move {
                    tokio::time::sleep_until(deadline).await;
                    Self::expire_if_current(&storage, &key, generation);
                });
            }
            // 没有运行时则不启动过期任务，读取时仍按 expires_at 判断
            Err(_) => {
                tracing::warn!("cache - no runtime available, key {} expires lazily", key);
            }
        }

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.storage.write().remove(key);
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let storage = self.storage.read();
        Ok(storage
            .get(key)
            .is_some_and(|entry| entry.is_live(Instant::now())))
    }

    fn flush(&self) -> Result<(), CacheError> {
        self.storage.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_set_without_runtime() {
        let cache = MemoryCache::new();

        cache.set_with_expiry("k", "v", secs(60)).unwrap();
        assert_eq!(cache.get("k").as_deref(), Some("v"));
        assert!(cache.exists("k").unwrap());

        cache.set_with_expiry("short", "v", Duration::from_millis(10)).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(cache.get("short"), None);
        assert!(!cache.exists("short").unwrap());
    }

    #[tokio::test]
    async fn test_set_then_get_and_exists() {
        let cache = MemoryCache::new();
        cache.set_with_expiry("some_key", "some_value", secs(1)).unwrap();

        assert_eq!(cache.get("some_key").as_deref(), Some("some_value"));
        assert!(cache.exists("some_key").unwrap());
    }

    #[tokio::test]
    async fn test_blank_key_is_rejected() {
        let cache = MemoryCache::new();

        let result = cache.set_with_expiry("", "some_value", secs(1));
        assert!(matches!(result, Err(CacheError::InvalidKey)));
        assert!(!cache.exists("").unwrap());
        assert_eq!(cache.get(""), None);
    }

    #[tokio::test]
    async fn test_blank_value_is_allowed() {
        let cache = MemoryCache::new();
        cache.set_with_expiry("some_key", "", secs(1)).unwrap();

        assert_eq!(cache.get("some_key").as_deref(), Some(""));
        assert!(cache.exists("some_key").unwrap());
    }

    #[tokio::test]
    async fn test_missing_key() {
        let cache = MemoryCache::new();

        assert_eq!(cache.get("missing-key"), None);
        assert!(!cache.exists("missing-key").unwrap());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let cache = MemoryCache::new();
        cache.set_with_expiry("some_key", "some_value", secs(5)).unwrap();

        cache.delete("some_key").unwrap();
        assert_eq!(cache.get("some_key"), None);

        cache.delete("some_key").unwrap();
        cache.delete("missing-key").unwrap();
    }

    #[tokio::test]
    async fn test_flush_removes_everything() {
        let cache = MemoryCache::new();
        cache.set_with_expiry("a", "1", secs(5)).unwrap();
        cache.set_with_expiry("b", "2", secs(5)).unwrap();

        cache.flush().unwrap();

        assert!(!cache.exists("a").unwrap());
        assert!(!cache.exists("b").unwrap());
    }

    #[tokio::test]
    async fn test_keys_expire() {
        let cache = MemoryCache::new();
        cache.set_with_expiry("some_key", "some_value", secs(1)).unwrap();

        let mut expired = false;
        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(500)).await;
            if cache.get("some_key").is_none() {
                expired = true;
                break;
            }
        }

        assert!(expired, "key should expire within 2 seconds");
        assert!(!cache.exists("some_key").unwrap());
    }

    #[tokio::test]
    async fn test_expired_entry_is_reaped_from_storage() {
        let cache = MemoryCache::new();
        cache.set_with_expiry("some_key", "some_value", Duration::from_millis(100)).unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(cache.storage.read().get("some_key").is_none());
    }

    #[tokio::test]
    async fn test_refreshed_key_survives_earlier_expiry() {
        let cache = MemoryCache::new();
        cache.set_with_expiry("some_key", "some_value_1", secs(1)).unwrap();
        // 用更长的过期时间覆盖
        cache.set_with_expiry("some_key", "some_value_2", secs(4)).unwrap();

        tokio::time::sleep(secs(2)).await;

        assert_eq!(cache.get("some_key").as_deref(), Some("some_value_2"));
    }

    #[tokio::test]
    async fn test_stale_timer_after_delete_and_reset() {
        let cache = MemoryCache::new();
        cache.set_with_expiry("some_key", "old", Duration::from_millis(200)).unwrap();
        cache.delete("some_key").unwrap();
        cache.set_with_expiry("some_key", "new", secs(5)).unwrap();

        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(cache.get("some_key").as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let cache = MemoryCache::new();
        let other = cache.clone();
        cache.set_with_expiry("shared", "value", secs(5)).unwrap();

        assert_eq!(other.get("shared").as_deref(), Some("value"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers() {
        let cache = MemoryCache::new();

        let handles = (0..64)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache
                        .set_with_expiry(&format!("key-{}", i), &i.to_string(), secs(5))
                        .unwrap();
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.await.unwrap();
        }

        for i in 0..64 {
            assert_eq!(cache.get(&format!("key-{}", i)), Some(i.to_string()));
        }
    }
}
