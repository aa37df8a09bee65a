// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{OrchestratorSettings, Settings};
use crate::domain::models::discovery::{DiscoveryOutcome, DiscoveryResult, DiscoverySource};
use crate::domain::models::page::NormalizedPage;
use crate::domain::models::platform::Platform;
use crate::domain::services::discovery_service::DiscoveryEngine;
use crate::domain::services::extraction_service::{ExtractionService, PlatformClient};
use crate::domain::services::normalizer_service::ContentNormalizer;
use crate::engines::acquirer::ContentAcquirer;
use crate::engines::traits::EngineError;
use crate::infrastructure::cache::key_for;
use crate::infrastructure::cache::two_tier_cache::TwoTierCache;
use crate::utils::link_extractor::{extract_keyword_links, is_internal};
use crate::utils::url_utils::normalize_domain;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// 编排错误
#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("Acquisition failed: {0}")]
    Engine(#[from] EngineError),

    #[error("Extraction failed: {0}")]
    Extraction(anyhow::Error),
}

/// 实体数据的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitySource {
    /// 平台客户端提供的结构化数据
    Platform,
    /// AI抽取服务
    Extraction,
    /// 没有可用的抽取方式
    #[default]
    None,
}

/// 目标页面报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetReport {
    pub domain: String,
    pub url: String,
    pub platform: Platform,
    pub source: DiscoverySource,
    pub used_browser: bool,
    pub page: NormalizedPage,
    pub related_urls: Vec<String>,
    pub entities: Vec<Value>,
    pub confidence: Option<f64>,
    pub entity_source: EntitySource,
}

/// 一次运行的结果，可直接缓存
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AcquisitionOutcome {
    Found(TargetReport),
    NotFound,
}

impl AcquisitionOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, AcquisitionOutcome::Found(_))
    }
}

/// 站点扫描结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteReport {
    pub domain: String,
    pub pages: Vec<NormalizedPage>,
}

/// 抓取编排用例
///
/// 串联发现、抓取、规范化、抽取和缓存。共享的浏览器和缓存连接由本用例持有，
/// 在 `shutdown` 时统一释放。
pub struct AcquisitionUseCase {
    acquirer: Arc<ContentAcquirer>,
    discovery: DiscoveryEngine,
    normalizer: ContentNormalizer,
    cache: Arc<TwoTierCache>,
    extractor: Option<Arc<dyn ExtractionService>>,
    platform_clients: Vec<Arc<dyn PlatformClient>>,
    settings: OrchestratorSettings,
    min_content_chars: usize,
    closed: AtomicBool,
}

impl AcquisitionUseCase {
    /// 创建用例
    ///
    /// # 参数
    ///
    /// * `acquirer` - 内容抓取器，发现引擎与页面扫描共用
    /// * `cache` - 两级缓存
    /// * `settings` - 应用配置
    pub fn new(
        acquirer: Arc<ContentAcquirer>,
        cache: Arc<TwoTierCache>,
        settings: &Settings,
    ) -> Self {
        Self {
            discovery: DiscoveryEngine::new(acquirer.clone(), settings.discovery.clone()),
            acquirer,
            normalizer: ContentNormalizer::new(settings.normalizer.clone()),
            cache,
            extractor: None,
            platform_clients: Vec::new(),
            settings: settings.orchestrator.clone(),
            min_content_chars: settings.normalizer.min_content_chars,
            closed: AtomicBool::new(false),
        }
    }

    /// 按配置创建默认的抓取器和缓存
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Arc::new(ContentAcquirer::from_settings(settings)),
            Arc::new(TwoTierCache::from_settings(&settings.cache)),
            settings,
        )
    }

    /// 配置AI抽取服务
    pub fn with_extractor(mut self, extractor: Arc<dyn ExtractionService>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// 注册平台客户端
    pub fn with_platform_client(mut self, client: Arc<dyn PlatformClient>) -> Self {
        self.platform_clients.push(client);
        self
    }

    pub fn discovery(&self) -> &DiscoveryEngine {
        &self.discovery
    }

    /// 查找并处理域名的目标页面
    ///
    /// 结果（包括 `NotFound`）按默认过期时间缓存；抽取服务的错误不会被缓存。
    ///
    /// # 参数
    ///
    /// * `domain` - 公司域名
    ///
    /// # 返回值
    ///
    /// * `Ok(AcquisitionOutcome)` - 目标页面报告或 `NotFound`
    /// * `Err(AcquisitionError)` - 抽取服务失败
    pub async fn run(&self, domain: &str) -> Result<AcquisitionOutcome, AcquisitionError> {
        let domain = normalize_domain(domain);
        let key = key_for(&format!("{}:target", domain));
        if let Some(cached) = self.cache.get_json::<AcquisitionOutcome>(&key).await {
            info!("Serving {} from cache", domain);
            return Ok(cached);
        }

        let outcome = match self.discovery.find_target_page(&domain).await {
            DiscoveryOutcome::Found(result) => {
                AcquisitionOutcome::Found(self.build_report(&domain, result).await?)
            }
            DiscoveryOutcome::NotFound => AcquisitionOutcome::NotFound,
        };

        self.cache.set_json(&key, &outcome, None).await;
        Ok(outcome)
    }

    async fn build_report(
        &self,
        domain: &str,
        result: DiscoveryResult,
    ) -> Result<TargetReport, AcquisitionError> {
        let page = self.normalizer.normalize(&result.content, &result.url);

        let mut entities = Vec::new();
        let mut confidence = None;
        let mut entity_source = EntitySource::None;

        if let Some(parsed) = self.parse_with_platform(result.platform, &result.url).await {
            entities = parsed;
            entity_source = EntitySource::Platform;
        } else if let Some(extractor) = &self.extractor {
            let output = extractor
                .extract(&page.content, &result.url, &result.related_urls)
                .await
                .map_err(AcquisitionError::Extraction)?;
            entities = output.entities;
            confidence = Some(output.confidence);
            entity_source = EntitySource::Extraction;
        }

        info!(
            "{}: {} entities from {:?} ({})",
            domain,
            entities.len(),
            entity_source,
            result.url
        );

        Ok(TargetReport {
            domain: domain.to_string(),
            url: result.url,
            platform: result.platform,
            source: result.source,
            used_browser: result.used_browser,
            page,
            related_urls: result.related_urls,
            entities,
            confidence,
            entity_source,
        })
    }

    /// 使用已注册的平台客户端读取结构化数据
    ///
    /// 没有客户端、客户端出错或返回空数据时返回 `None`，由AI抽取接手
    async fn parse_with_platform(&self, platform: Platform, url: &str) -> Option<Vec<Value>> {
        if platform.is_none() {
            return None;
        }
        let client = self
            .platform_clients
            .iter()
            .find(|client| client.platform() == platform)?;
        match client.parse(url).await {
            Ok(Some(entities)) if !entities.is_empty() => Some(entities),
            Ok(_) => {
                debug!("{} client returned no data for {}", platform, url);
                None
            }
            Err(e) => {
                warn!("{} client failed for {}: {}", platform, url, e);
                None
            }
        }
    }

    /// 抓取目标页面链接到的部门页面
    ///
    /// 目标页面不存在时返回空列表
    pub async fn scan_departments(&self, domain: &str) -> Vec<NormalizedPage> {
        let domain = normalize_domain(domain);
        let Some(result) = self.discovery.find_target_page(&domain).await.into_result() else {
            return Vec::new();
        };
        let links: Vec<String> = self
            .discovery
            .department_links(&result)
            .into_iter()
            .take(self.settings.max_site_pages)
            .collect();
        info!("{}: scanning {} department pages", domain, links.len());

        let mut seen = HashSet::new();
        self.collect_pages(&links, &mut seen, false).await
    }

    /// 扫描首页和代表性内容页
    ///
    /// # 参数
    ///
    /// * `domain` - 公司域名
    /// * `max_pages` - 最多返回的页面数（包含首页）
    ///
    /// # 返回值
    ///
    /// * `Ok(SiteReport)` - 扫描结果，按默认过期时间缓存
    /// * `Err(AcquisitionError)` - 首页无法抓取
    pub async fn scan_site(
        &self,
        domain: &str,
        max_pages: usize,
    ) -> Result<SiteReport, AcquisitionError> {
        let domain = normalize_domain(domain);
        let key = key_for(&format!("{}:site", domain));
        if let Some(cached) = self.cache.get_json::<SiteReport>(&key).await {
            info!("Serving site scan of {} from cache", domain);
            return Ok(cached);
        }

        let homepage = self.discovery.homepage(&domain);
        let fetched = self.acquirer.fetch(&homepage).await?;
        let mut seen = HashSet::new();
        let mut pages = Vec::new();

        if let Some(page) = self.accept_page(&fetched.content, &homepage, &mut seen).await {
            pages.push(page);
        }

        let base = Url::parse(&homepage).ok();
        let links: Vec<String> =
            extract_keyword_links(&fetched.content, &homepage, &self.settings.content_page_keywords)
                .into_iter()
                .filter(|link| {
                    link != &homepage
                        && match (&base, Url::parse(link)) {
                            (Some(base), Ok(url)) => is_internal(&url, base),
                            _ => false,
                        }
                })
                .take(max_pages.saturating_sub(pages.len()))
                .collect();
        info!("{}: scanning {} content pages", domain, links.len());

        pages.extend(self.collect_pages(&links, &mut seen, true).await);
        pages.truncate(max_pages);

        let report = SiteReport { domain, pages };
        self.cache.set_json(&key, &report, None).await;
        Ok(report)
    }

    /// 逐个抓取页面，相邻抓取之间等待配置的间隔
    ///
    /// 失败、过短和重复的页面会被记录并跳过，保持原有顺序
    async fn collect_pages(
        &self,
        urls: &[String],
        seen: &mut HashSet<String>,
        delay_first: bool,
    ) -> Vec<NormalizedPage> {
        let mut pages = Vec::new();
        for (index, url) in urls.iter().enumerate() {
            if index > 0 || delay_first {
                tokio::time::sleep(self.settings.page_delay()).await;
            }
            let fetched = match self.acquirer.fetch(url).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    warn!("Skipping {}: {}", url, e);
                    continue;
                }
            };
            if let Some(page) = self.accept_page(&fetched.content, url, seen).await {
                pages.push(page);
            }
        }
        pages
    }

    /// 规范化页面，过短或重复时返回 `None`
    async fn accept_page(
        &self,
        content: &str,
        url: &str,
        seen: &mut HashSet<String>,
    ) -> Option<NormalizedPage> {
        let mut page = self.normalizer.normalize(content, url);
        if !page.is_substantial(self.min_content_chars) {
            debug!("Skipping thin page {}", url);
            return None;
        }
        if !seen.insert(page.content_hash.clone()) {
            debug!("Skipping duplicate page {}", url);
            return None;
        }
        self.enrich(&mut page).await;
        Some(page)
    }

    /// 用AI抽取结果填充页面的附加字段，失败时保持为空
    async fn enrich(&self, page: &mut NormalizedPage) {
        let Some(extractor) = &self.extractor else {
            return;
        };
        match extractor.extract(&page.content, &page.url, &[]).await {
            Ok(output) => {
                page.enrichment = Some(json!({
                    "entities": output.entities,
                    "confidence": output.confidence,
                }));
            }
            Err(e) => warn!("Enrichment of {} failed: {}", page.url, e),
        }
    }

    /// 关闭共享浏览器和缓存连接，只执行一次
    pub async fn shutdown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.acquirer.shutdown().await;
        self.cache.close().await;
        info!("Acquisition resources released");
    }
}

#[cfg(test)]
#[path = "acquisition_use_case_test.rs"]
mod tests;
