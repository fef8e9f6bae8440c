use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;
use tracing::debug;

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::declare_object_cache_plugin;

declare_object_cache_plugin!("moka", MokaCacheWrapper);

/// 进程内缓存，TTL 在构建时统一设置
pub struct MokaCacheWrapper {
    inner: Cache<String, String>,
}

impl MokaCacheWrapper {
    pub fn new() -> Result<Self, String> {
        let config = AppConfig::get();
        Self::with_settings(config.cache.memory.max_capacity, config.cache.default_ttl)
    }

    pub fn with_settings(max_capacity: u64, ttl_secs: u64) -> Result<Self, String> {
        if ttl_secs == 0 {
            return Err("cache.default_ttl must be greater than 0".to_string());
        }
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        debug!(
            "MokaCacheWrapper initialized with max capacity: {}, TTL: {}s",
            max_capacity, ttl_secs
        );
        Ok(Self { inner })
    }
}

#[async_trait]
impl ObjectCache for MokaCacheWrapper {
    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        match self.inner.get(key).await {
            Some(value) => CacheResult::Found(value),
            None => {
                debug!("Key not found in cache: {}", key);
                CacheResult::NotFound
            }
        }
    }

    async fn insert_raw(&self, key: String, value: String, _ttl: u64) {
        // 单条 TTL 被忽略
        self.inner.insert(key, value).await;
    }

    async fn remove(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    async fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_get_remove() {
        let cache: Box<dyn ObjectCache> = Box::new(MokaCacheWrapper::with_settings(100, 60).unwrap());

        assert_eq!(cache.get_raw("user:1").await, CacheResult::NotFound);
        cache
            .insert_raw("user:1".to_string(), "{\"id\":1}".to_string(), 0)
            .await;
        assert_eq!(
            cache.get_raw("user:1").await,
            CacheResult::Found("{\"id\":1}".to_string())
        );

        cache.remove("user:1").await;
        assert_eq!(cache.get_raw("user:1").await, CacheResult::NotFound);
    }

    #[tokio::test]
    async fn test_json_helpers_drop_corrupt_entries() {
        let cache: Box<dyn ObjectCache> = Box::new(MokaCacheWrapper::with_settings(100, 60).unwrap());

        cache.insert_json("nums".to_string(), &vec![1, 2, 3], 0).await;
        assert_eq!(
            cache.get_json::<Vec<i32>>("nums").await,
            CacheResult::Found(vec![1, 2, 3])
        );

        cache
            .insert_raw("broken".to_string(), "not json".to_string(), 0)
            .await;
        assert_eq!(
            cache.get_json::<Vec<i32>>("broken").await,
            CacheResult::ExistsButNoValue
        );
        assert_eq!(cache.get_raw("broken").await, CacheResult::NotFound);
    }

    #[test]
    fn test_zero_ttl_rejected() {
        assert!(MokaCacheWrapper::with_settings(10, 0).is_err());
    }
}
