// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含缓存、抓取、JS检测、发现、规范化和编排等所有配置项
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 缓存配置
    pub cache: CacheSettings,
    /// 抓取配置
    pub acquisition: AcquisitionSettings,
    /// JavaScript渲染检测配置
    pub js_detection: JsDetectionSettings,
    /// 目标页面发现配置
    pub discovery: DiscoverySettings,
    /// 内容规范化配置
    pub normalizer: NormalizerSettings,
    /// 编排配置
    pub orchestrator: OrchestratorSettings,
}

/// 缓存配置设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Redis连接URL，未配置时只使用进程内缓存
    pub redis_url: Option<String>,
    /// 默认过期时间（秒）
    pub default_ttl_secs: u64,
    /// 主存储操作超时（毫秒）
    pub primary_timeout_ms: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            redis_url: None,
            default_ttl_secs: 24 * 60 * 60,
            primary_timeout_ms: 2_000,
        }
    }
}

impl CacheSettings {
    pub fn primary_timeout(&self) -> Duration {
        Duration::from_millis(self.primary_timeout_ms)
    }
}

/// 抓取配置设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AcquisitionSettings {
    /// HTTP请求超时（秒）
    pub http_timeout_secs: u64,
    /// 浏览器导航超时（秒）
    pub browser_timeout_secs: u64,
    /// 模拟滚动的次数（每次一个视口高度）
    pub scroll_steps: u32,
    /// 每次滚动后的等待时间（毫秒）
    pub scroll_pause_ms: u64,
    /// 滚动结束后的最终等待时间（毫秒）
    pub settle_wait_ms: u64,
    /// 浏览器上下文的语言区域
    pub locale: String,
    /// 浏览器视口宽度
    pub viewport_width: i64,
    /// 浏览器视口高度
    pub viewport_height: i64,
    /// 远程Chrome调试地址（可选）
    pub remote_debugging_url: Option<String>,
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self {
            http_timeout_secs: 10,
            browser_timeout_secs: 35,
            scroll_steps: 3,
            scroll_pause_ms: 400,
            settle_wait_ms: 1_000,
            locale: "nl-NL".to_string(),
            viewport_width: 1920,
            viewport_height: 1080,
            remote_debugging_url: None,
        }
    }
}

impl AcquisitionSettings {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn browser_timeout(&self) -> Duration {
        Duration::from_secs(self.browser_timeout_secs)
    }
}

/// JavaScript渲染检测阈值
///
/// 这些阈值是经验值，因此全部可配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JsDetectionSettings {
    /// 原始HTML短于此长度视为可疑
    pub min_body_length: usize,
    /// 去除标签后的可见文本少于此长度视为可疑
    pub min_text_length: usize,
}

impl Default for JsDetectionSettings {
    fn default() -> Self {
        Self {
            min_body_length: 500,
            min_text_length: 500,
        }
    }
}

/// 目标页面发现配置设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// 构造URL时使用的协议
    pub scheme: String,
    /// 每批并发探测的候选URL数量
    pub batch_size: usize,
    /// 最多递归抓取的子站点地图数量
    pub max_nested_sitemaps: usize,
    /// 从站点地图中探测的最多URL数量
    pub max_sitemap_probes: usize,
    /// 从首页链接中探测的最多URL数量
    pub max_homepage_links: usize,
    /// 相关URL列表的最大长度
    pub max_related_urls: usize,
    /// 目标领域关键词（用于站点地图过滤和链接提取）
    pub keywords: Vec<String>,
    /// 部门/类别链接关键词
    pub department_keywords: Vec<String>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            batch_size: 3,
            max_nested_sitemaps: 3,
            max_sitemap_probes: 5,
            max_homepage_links: 5,
            max_related_urls: 50,
            keywords: crate::domain::models::keywords::CAREER_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            department_keywords: crate::domain::models::keywords::DEPARTMENT_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

/// 内容规范化配置设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizerSettings {
    /// 正文最大字符数
    pub max_content_chars: usize,
    /// 内容指纹长度（十六进制字符）
    pub hash_length: usize,
    /// 正文少于此字符数的页面会被编排层跳过
    pub min_content_chars: usize,
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            max_content_chars: 10_000,
            hash_length: 16,
            min_content_chars: 100,
        }
    }
}

/// 编排配置设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestratorSettings {
    /// 连续页面抓取之间的延迟（毫秒）
    pub page_delay_ms: u64,
    /// 站点扫描的最大页面数
    pub max_site_pages: usize,
    /// 站点扫描时用于挑选内容页的关键词
    pub content_page_keywords: Vec<String>,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            page_delay_ms: 1_200,
            max_site_pages: 8,
            content_page_keywords: crate::domain::models::keywords::CONTENT_PAGE_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

impl OrchestratorSettings {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载内置默认值、`config/default`、`config/{APP_ENVIRONMENT}`
    /// 和 `SITESCOUT__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::from_sources(&[
            "config/default".to_string(),
            format!("config/{}", env),
        ])
    }

    /// 从指定的配置文件列表加载（文件均为可选）
    pub fn from_sources(files: &[String]) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("cache.default_ttl_secs", 86_400)?
            .set_default("cache.primary_timeout_ms", 2_000)?
            .set_default("acquisition.http_timeout_secs", 10)?
            .set_default("acquisition.browser_timeout_secs", 35)?
            .set_default("discovery.scheme", "https")?
            .set_default("discovery.batch_size", 3)?
            .set_default("normalizer.max_content_chars", 10_000)?
            .set_default("orchestrator.page_delay_ms", 1_200)?;

        for file in files {
            builder = builder.add_source(File::with_name(file).required(false));
        }

        builder
            .add_source(
                Environment::with_prefix("SITESCOUT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("discovery.keywords")
                    .with_list_parse_key("discovery.department_keywords")
                    .with_list_parse_key("orchestrator.content_page_keywords")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
