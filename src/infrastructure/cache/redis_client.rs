// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::{CacheError, PrimaryStore};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Redis键的命名空间前缀
pub const KEY_PREFIX: &str = "sitescout:cache:";

/// Redis客户端
///
/// 提供对Redis数据库的异步操作接口。连接在第一次使用时建立并复用，
/// 任何命令失败后都会丢弃，下一次调用重新连接
pub struct RedisClient {
    /// Redis客户端
    client: redis::Client,
    connection: Mutex<Option<MultiplexedConnection>>,
}

impl RedisClient {
    /// 创建新的Redis客户端实例
    ///
    /// # 参数
    ///
    /// * `redis_url` - Redis连接URL
    ///
    /// # 返回值
    ///
    /// * `Ok(RedisClient)` - Redis客户端实例
    /// * `Err(CacheError)` - URL无效
    pub fn new(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self {
            client,
            connection: Mutex::new(None),
        })
    }

    fn namespaced(key: &str) -> String {
        format!("{}{}", KEY_PREFIX, key)
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        let mut guard = self.connection.lock().await;
        if let Some(con) = guard.as_ref() {
            return Ok(con.clone());
        }
        let con = self.client.get_multiplexed_async_connection().await?;
        debug!("Connected to Redis");
        *guard = Some(con.clone());
        Ok(con)
    }

    /// 丢弃缓存的连接并把命令错误转换为缓存错误
    async fn discard(&self, err: redis::RedisError) -> CacheError {
        warn!("Redis command failed, dropping connection: {}", err);
        self.connection.lock().await.take();
        err.into()
    }
}

#[async_trait]
impl PrimaryStore for RedisClient {
    /// 获取指定键的值
    ///
    /// # 参数
    ///
    /// * `key` - 键（不含命名空间前缀）
    ///
    /// # 返回值
    ///
    /// * `Ok(Option<String>)` - 键对应的值，如果不存在则返回None
    /// * `Err(CacheError)` - 连接或命令错误
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut con = self.connection().await?;
        match con.get::<_, Option<String>>(Self::namespaced(key)).await {
            Ok(value) => Ok(value),
            Err(e) => Err(self.discard(e).await),
        }
    }

    /// 设置键值对并指定过期时间
    ///
    /// # 参数
    ///
    /// * `key` - 键（不含命名空间前缀）
    /// * `value` - 值
    /// * `ttl_secs` - 过期时间（秒）
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        let mut con = self.connection().await?;
        if let Err(e) = con
            .set_ex::<_, _, ()>(Self::namespaced(key), value, ttl_secs.max(1))
            .await
        {
            return Err(self.discard(e).await);
        }
        Ok(())
    }

    async fn close(&self) {
        self.connection.lock().await.take();
    }
}
