// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 缓存模块
///
/// 两级缓存：可选的Redis主存储加进程内存储。
/// 主存储的任何错误都会静默回退到进程内存储，缓存永远不会让请求失败。
pub mod memory_store;
pub mod redis_client;
pub mod two_tier_cache;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::sync::Mutex;
use thiserror::Error;

/// 缓存键的长度（十六进制字符）
pub const KEY_LENGTH: usize = 32;

/// 根据查询字符串计算缓存键
///
/// 对去除首尾空白、压缩内部空白并转小写后的输入做SHA-256，取前32个十六进制字符。
/// 相同的逻辑查询（大小写或空白不同）得到相同的键。
pub fn key_for(raw: &str) -> String {
    let normalized = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    let mut key = hex::encode(digest);
    key.truncate(KEY_LENGTH);
    key
}

/// 缓存错误
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Primary store timed out")]
    Timeout,

    #[error("Primary store is closed")]
    Closed,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 主缓存存储
///
/// 值对缓存层来说是不透明的字符串
#[async_trait]
pub trait PrimaryStore: Send + Sync {
    /// 读取键值，不存在时返回 `None`
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// 写入键值并设置过期时间（秒）
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError>;

    /// 释放连接
    async fn close(&self) {}
}

/// 时间来源
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 系统时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 手动推进的时钟，用于测试过期逻辑
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// 将时钟向前推进
    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_for_is_deterministic_and_fixed_length() {
        let key = key_for("example.nl:target");
        assert_eq!(key.len(), KEY_LENGTH);
        assert_eq!(key, key_for("example.nl:target"));
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_key_for_ignores_case_and_whitespace() {
        assert_eq!(key_for("Example.NL:target"), key_for("  example.nl:target \n"));
        assert_eq!(key_for("acme   careers"), key_for("acme careers"));
    }

    #[test]
    fn test_key_for_distinct_inputs() {
        assert_ne!(key_for("example.nl:target"), key_for("example.nl:site"));
        assert_ne!(key_for("a"), key_for("b"));
    }

    #[test]
    fn test_manual_clock_advances() {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        clock.advance(chrono::Duration::seconds(90));
        assert_eq!(clock.now(), start + chrono::Duration::seconds(90));
    }
}
