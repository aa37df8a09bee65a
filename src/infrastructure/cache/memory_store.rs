// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::Clock;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// 过期时间上限：十年
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// 缓存条目
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// 进程内缓存存储
///
/// 读取时惰性清理过期条目，没有后台清理任务
pub struct MemoryStore {
    entries: DashMap<String, CacheEntry>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// 读取未过期的值，过期条目在此时删除
    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let expired = match self.entries.get(key) {
            Some(entry) if entry.is_live(now) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        }
        None
    }

    pub fn set(&self, key: &str, value: &str, ttl_secs: u64) {
        let ttl = chrono::Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64);
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: self.clock.now() + ttl,
            },
        );
    }

    /// 当前条目数（包含尚未被读取清理的过期条目）
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
