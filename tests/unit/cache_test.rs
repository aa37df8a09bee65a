// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 缓存公共API测试

#[cfg(test)]
mod tests {
    use sitescout::config::settings::CacheSettings;
    use sitescout::infrastructure::cache::two_tier_cache::TwoTierCache;
    use sitescout::infrastructure::cache::{key_for, ManualClock, KEY_LENGTH};
    use std::sync::Arc;

    #[test]
    fn test_key_for_is_case_and_whitespace_insensitive() {
        let key = key_for("Example.NL:target");
        assert_eq!(key.len(), KEY_LENGTH);
        assert_eq!(key, key_for("  example.nl:target "));
        assert_ne!(key, key_for("example.nl:site"));
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_entries_expire_with_the_clock() {
        let clock = Arc::new(ManualClock::default());
        let cache = TwoTierCache::new(None, &CacheSettings::default(), clock.clone());

        cache.set("k", "v", Some(60)).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
        assert_eq!(cache.get("unset").await, None);

        clock.advance(chrono::Duration::seconds(60));
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_back_to_local() {
        let settings = CacheSettings {
            redis_url: Some("redis://127.0.0.1:1/".to_string()),
            primary_timeout_ms: 500,
            ..CacheSettings::default()
        };
        let cache = TwoTierCache::from_settings(&settings);

        cache.set_json("k", &vec![1, 2, 3], None).await;
        assert_eq!(cache.get_json::<Vec<i32>>("k").await, Some(vec![1, 2, 3]));
        cache.close().await;
        cache.close().await;
    }
}
