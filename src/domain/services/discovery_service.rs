// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::DiscoverySettings;
use crate::domain::models::discovery::{DiscoveryOutcome, DiscoveryResult, DiscoverySource};
use crate::domain::models::fetch_result::FetchResult;
use crate::domain::models::keywords::looks_like_target;
use crate::domain::models::platform::Platform;
use crate::engines::acquirer::ContentAcquirer;
use crate::utils::link_extractor::{extract_department_links, extract_keyword_links};
use crate::utils::sitemap::{
    extract_locs, is_nested_sitemap, is_sitemap_index, keyword_sitemaps, rank_urls, SITEMAP_PATHS,
};
use crate::utils::url_utils::{is_ip_host, normalize_domain, site_root};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info};

/// 在域名根路径上尝试的候选路径，按优先级排列
pub const HEURISTIC_PATHS: &[&str] = &[
    "/careers",
    "/vacatures",
    "/werken-bij",
    "/jobs",
    "/career",
    "/vacancies",
    "/werkenbij",
    "/karriere",
    "/over-ons/werken-bij",
    "/nl/vacatures",
    "/en/careers",
];

/// 常见的招聘子域名前缀
pub const SUBDOMAIN_PREFIXES: &[&str] = &["careers", "jobs", "werkenbij", "werken"];

/// 通过检测的候选页面
struct Accepted {
    url: String,
    fetched: FetchResult,
}

/// 目标页面发现引擎
///
/// 依次尝试站点地图、启发式候选URL和首页链接，三者都失败时才返回 `NotFound`。
/// 单个候选的抓取失败只会让引擎继续尝试下一个候选，从不返回错误。
pub struct DiscoveryEngine {
    acquirer: Arc<ContentAcquirer>,
    settings: DiscoverySettings,
}

impl DiscoveryEngine {
    pub fn new(acquirer: Arc<ContentAcquirer>, settings: DiscoverySettings) -> Self {
        Self { acquirer, settings }
    }

    /// 站点根URL（不含末尾斜杠）
    pub fn origin(&self, domain: &str) -> String {
        format!("{}://{}", self.settings.scheme, domain)
    }

    /// 首页URL（带末尾斜杠）
    pub fn homepage(&self, domain: &str) -> String {
        site_root(&self.settings.scheme, domain)
    }

    /// 查找目标页面
    ///
    /// # 参数
    ///
    /// * `domain` - 域名，可以带协议、`www.` 或路径
    ///
    /// # 返回值
    ///
    /// 找到时返回 `Found`，否则返回 `NotFound`
    pub async fn find_target_page(&self, domain: &str) -> DiscoveryOutcome {
        let domain = normalize_domain(domain);
        if domain.is_empty() {
            return DiscoveryOutcome::NotFound;
        }
        info!("Discovering target page for {}", domain);

        if let Some(result) = self.from_sitemap(&domain).await {
            return DiscoveryOutcome::Found(result);
        }
        if let Some(result) = self.from_heuristics(&domain).await {
            return DiscoveryOutcome::Found(result);
        }
        if let Some(result) = self.from_homepage(&domain).await {
            return DiscoveryOutcome::Found(result);
        }

        info!("No target page found for {}", domain);
        DiscoveryOutcome::NotFound
    }

    /// 启发式候选URL：先是根域名上的路径，再是子域名
    ///
    /// 主机为IP地址时不生成子域名候选
    pub fn heuristic_candidates(&self, domain: &str) -> Vec<String> {
        let origin = self.origin(domain);
        let mut candidates: Vec<String> = HEURISTIC_PATHS
            .iter()
            .map(|path| format!("{}{}", origin, path))
            .collect();
        if !is_ip_host(domain) {
            candidates.extend(
                SUBDOMAIN_PREFIXES
                    .iter()
                    .map(|prefix| format!("{}://{}.{}/", self.settings.scheme, prefix, domain)),
            );
        }
        candidates
    }

    /// 目标页面中的部门链接
    pub fn department_links(&self, result: &DiscoveryResult) -> Vec<String> {
        extract_department_links(
            &result.content,
            &result.url,
            &self.settings.department_keywords,
        )
    }

    /// 抓取单个候选，通过目标页面检测时返回
    async fn probe(&self, url: &str) -> Option<Accepted> {
        match self.acquirer.fetch(url).await {
            Ok(fetched) if fetched.is_success() && looks_like_target(&fetched.content) => {
                debug!("Accepted candidate {}", url);
                Some(Accepted {
                    url: url.to_string(),
                    fetched,
                })
            }
            Ok(fetched) => {
                debug!(
                    "Rejected candidate {} (HTTP {})",
                    url, fetched.http_status
                );
                None
            }
            Err(e) => {
                debug!("Candidate {} failed: {}", url, e);
                None
            }
        }
    }

    /// 依次抓取候选，返回第一个通过检测的
    async fn probe_sequential(&self, candidates: &[String]) -> Option<Accepted> {
        for url in candidates {
            if let Some(accepted) = self.probe(url).await {
                return Some(accepted);
            }
        }
        None
    }

    /// 分批并发抓取候选
    ///
    /// 同一批内并发抓取，按列表顺序取第一个通过的结果；批次之间按顺序进行
    async fn probe_in_batches(&self, candidates: &[String]) -> Option<Accepted> {
        for batch in candidates.chunks(self.settings.batch_size.max(1)) {
            let results = join_all(batch.iter().map(|url| self.probe(url))).await;
            if let Some(accepted) = results.into_iter().flatten().next() {
                return Some(accepted);
            }
        }
        None
    }

    fn build_result(
        &self,
        accepted: Accepted,
        related_urls: Vec<String>,
        source: DiscoverySource,
    ) -> DiscoveryResult {
        let platform = Platform::detect(&accepted.url, &accepted.fetched.content);
        info!(
            "Target page found: {} (source: {:?}, platform: {}, browser: {})",
            accepted.url, source, platform, accepted.fetched.used_browser
        );
        DiscoveryResult {
            url: accepted.url,
            content: accepted.fetched.content,
            platform,
            related_urls,
            used_browser: accepted.fetched.used_browser,
            source,
        }
    }

    /// 目标页面中除自身以外的关键字链接
    fn related_from_page(&self, accepted: &Accepted) -> Vec<String> {
        extract_keyword_links(
            &accepted.fetched.content,
            &accepted.url,
            &self.settings.keywords,
        )
        .into_iter()
        .filter(|url| url.trim_end_matches('/') != accepted.url.trim_end_matches('/'))
        .take(self.settings.max_related_urls)
        .collect()
    }

    /// 从站点地图中收集排好序的关键字URL
    ///
    /// 使用第一个产生关键字URL的站点地图；索引只展开URL包含关键字的嵌套站点地图
    pub async fn sitemap_candidates(&self, domain: &str) -> Vec<String> {
        let origin = self.origin(domain);
        let keywords = &self.settings.keywords;

        for path in SITEMAP_PATHS {
            let sitemap_url = format!("{}{}", origin, path);
            let Some(response) = self.acquirer.fetch_static(&sitemap_url).await else {
                continue;
            };
            let mut locs = extract_locs(&response.content);
            if locs.is_empty() {
                continue;
            }

            if is_sitemap_index(&response.content, &locs) {
                let nested =
                    keyword_sitemaps(&locs, keywords, self.settings.max_nested_sitemaps);
                debug!(
                    "{} is a sitemap index, following {} nested sitemaps",
                    sitemap_url,
                    nested.len()
                );
                locs.retain(|loc| !is_nested_sitemap(loc));
                for nested_url in nested {
                    if let Some(nested_response) = self.acquirer.fetch_static(&nested_url).await {
                        locs.extend(extract_locs(&nested_response.content));
                    }
                }
            }

            let ranked = rank_urls(&locs, keywords);
            if !ranked.is_empty() {
                debug!("{} yielded {} keyword URLs", sitemap_url, ranked.len());
                return ranked;
            }
        }
        Vec::new()
    }

    async fn from_sitemap(&self, domain: &str) -> Option<DiscoveryResult> {
        let ranked = self.sitemap_candidates(domain).await;
        if ranked.is_empty() {
            return None;
        }
        let probes = self.settings.max_sitemap_probes.min(ranked.len());
        let accepted = self.probe_sequential(&ranked[..probes]).await?;

        let related = ranked
            .iter()
            .filter(|url| **url != accepted.url)
            .take(self.settings.max_related_urls)
            .cloned()
            .collect();
        Some(self.build_result(accepted, related, DiscoverySource::Sitemap))
    }

    async fn from_heuristics(&self, domain: &str) -> Option<DiscoveryResult> {
        let candidates = self.heuristic_candidates(domain);
        let accepted = self.probe_in_batches(&candidates).await?;
        let related = self.related_from_page(&accepted);
        Some(self.build_result(accepted, related, DiscoverySource::Heuristic))
    }

    async fn from_homepage(&self, domain: &str) -> Option<DiscoveryResult> {
        let homepage = self.homepage(domain);
        let fetched = match self.acquirer.fetch(&homepage).await {
            Ok(fetched) => fetched,
            Err(e) => {
                debug!("Homepage {} failed: {}", homepage, e);
                return None;
            }
        };

        let links: Vec<String> =
            extract_keyword_links(&fetched.content, &homepage, &self.settings.keywords)
                .into_iter()
                .filter(|url| url != &homepage)
                .collect();
        let probes = self.settings.max_homepage_links.min(links.len());
        let accepted = self.probe_sequential(&links[..probes]).await?;

        let mut related: Vec<String> = links
            .iter()
            .filter(|url| **url != accepted.url)
            .cloned()
            .collect();
        for url in self.related_from_page(&accepted) {
            if !related.contains(&url) {
                related.push(url);
            }
        }
        related.truncate(self.settings.max_related_urls);
        Some(self.build_result(accepted, related, DiscoverySource::Homepage))
    }
}

#[cfg(test)]
#[path = "discovery_service_test.rs"]
mod tests;
