// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::memory_store::MemoryStore;
use super::redis_client::RedisClient;
use super::{CacheError, Clock, PrimaryStore, SystemClock};
use crate::config::settings::CacheSettings;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// 两级缓存
///
/// 先访问主存储，主存储出错或超时则回退到进程内存储。
/// 主存储命中直接返回；主存储未命中时再查进程内存储，
/// 以便取回主存储故障期间写入本地的条目。
pub struct TwoTierCache {
    primary: RwLock<Option<Arc<dyn PrimaryStore>>>,
    local: MemoryStore,
    default_ttl_secs: u64,
    primary_timeout: Duration,
}

impl TwoTierCache {
    /// 创建缓存
    ///
    /// # 参数
    ///
    /// * `primary` - 可选的主存储
    /// * `settings` - 缓存配置
    /// * `clock` - 进程内存储使用的时钟
    pub fn new(
        primary: Option<Arc<dyn PrimaryStore>>,
        settings: &CacheSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            primary: RwLock::new(primary),
            local: MemoryStore::new(clock),
            default_ttl_secs: settings.default_ttl_secs,
            primary_timeout: settings.primary_timeout(),
        }
    }

    /// 只使用进程内存储
    pub fn local_only(settings: &CacheSettings) -> Self {
        Self::new(None, settings, Arc::new(SystemClock))
    }

    /// 按配置创建缓存，配置了Redis时作为主存储
    ///
    /// Redis URL无效时记录警告并只使用进程内存储
    pub fn from_settings(settings: &CacheSettings) -> Self {
        let primary: Option<Arc<dyn PrimaryStore>> = match settings.redis_url.as_deref() {
            Some(url) => match RedisClient::new(url) {
                Ok(client) => {
                    info!("Cache primary store: Redis");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    warn!("Invalid Redis URL, using process-local cache only: {}", e);
                    None
                }
            },
            None => None,
        };
        Self::new(primary, settings, Arc::new(SystemClock))
    }

    pub fn default_ttl_secs(&self) -> u64 {
        self.default_ttl_secs
    }

    async fn primary(&self) -> Option<Arc<dyn PrimaryStore>> {
        self.primary.read().await.clone()
    }

    async fn bounded<T>(
        &self,
        op: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        tokio::time::timeout(self.primary_timeout, op)
            .await
            .map_err(|_| CacheError::Timeout)?
    }

    /// 读取缓存值
    ///
    /// # 参数
    ///
    /// * `key` - 缓存键，通常由 `key_for` 生成
    ///
    /// # 返回值
    ///
    /// 未命中或已过期时返回 `None`，从不返回错误
    pub async fn get(&self, key: &str) -> Option<String> {
        if let Some(primary) = self.primary().await {
            match self.bounded(primary.get(key)).await {
                Ok(Some(value)) => {
                    debug!("Cache hit (primary): {}", key);
                    return Some(value);
                }
                Ok(None) => {}
                Err(e) => debug!("Primary cache get failed, using local store: {}", e),
            }
        }
        let value = self.local.get(key);
        if value.is_some() {
            debug!("Cache hit (local): {}", key);
        }
        value
    }

    /// 写入缓存值
    ///
    /// # 参数
    ///
    /// * `key` - 缓存键
    /// * `value` - 值
    /// * `ttl_secs` - 过期时间（秒），`None` 时使用默认值
    pub async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) {
        let ttl = ttl_secs.unwrap_or(self.default_ttl_secs);
        if let Some(primary) = self.primary().await {
            match self.bounded(primary.set_ex(key, value, ttl)).await {
                Ok(()) => return,
                Err(e) => warn!("Primary cache set failed, using local store: {}", e),
            }
        }
        self.local.set(key, value, ttl);
    }

    /// 读取并反序列化，反序列化失败视为未命中
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// 序列化后写入
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_secs: Option<u64>) {
        match serde_json::to_string(value).map_err(CacheError::from) {
            Ok(raw) => self.set(key, &raw, ttl_secs).await,
            Err(e) => warn!("Failed to serialize cache entry {}: {}", key, e),
        }
    }

    /// 释放主存储，之后所有操作只使用进程内存储
    pub async fn close(&self) {
        let primary = self.primary.write().await.take();
        if let Some(primary) = primary {
            primary.close().await;
            debug!("Cache primary store closed");
        }
    }
}

#[cfg(test)]
#[path = "two_tier_cache_test.rs"]
mod tests;
