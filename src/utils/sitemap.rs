// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::keywords::contains_keyword;
use crate::utils::html_patterns::decode_entities;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use url::Url;

static LOC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<loc>\s*(?:<!\[CDATA\[)?\s*(.*?)\s*(?:\]\]>)?\s*</loc>").unwrap()
});

/// 常见的站点地图位置，按探测顺序排列
pub const SITEMAP_PATHS: &[&str] = &[
    "/sitemap.xml",
    "/sitemap_index.xml",
    "/sitemap-index.xml",
    "/wp-sitemap.xml",
];

/// 提取站点地图中所有 `<loc>` 条目
///
/// 不解析XML结构，对格式错误的文档也能尽量提取
pub fn extract_locs(xml: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    LOC_REGEX
        .captures_iter(xml)
        .filter_map(|c| c.get(1))
        .map(|m| decode_entities(m.as_str()).trim().to_string())
        .filter(|loc| !loc.is_empty() && seen.insert(loc.clone()))
        .collect()
}

/// 条目是否指向嵌套的站点地图
pub fn is_nested_sitemap(loc: &str) -> bool {
    let path = Url::parse(loc)
        .map(|u| u.path().to_lowercase())
        .unwrap_or_else(|_| loc.to_lowercase());
    path.ends_with(".xml") || path.ends_with(".xml.gz")
}

/// 是否为站点地图索引
pub fn is_sitemap_index(xml: &str, locs: &[String]) -> bool {
    xml.contains("<sitemapindex") || locs.iter().any(|l| is_nested_sitemap(l))
}

/// 最后一个路径段本身就是关键字的URL视为主页面，如 `/careers`、`/nl/werken-bij/`
pub fn is_main_page(url: &str, keywords: &[String]) -> bool {
    let path = Url::parse(url)
        .map(|u| u.path().to_lowercase())
        .unwrap_or_else(|_| url.to_lowercase());
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .map(|last| keywords.iter().any(|k| k == last))
        .unwrap_or(false)
}

/// 筛选包含关键字的页面URL并排序
///
/// 主页面排在前面，其余按长度从短到长，长度相同时保持原顺序
pub fn rank_urls(locs: &[String], keywords: &[String]) -> Vec<String> {
    let mut matching: Vec<String> = locs
        .iter()
        .filter(|loc| !is_nested_sitemap(loc))
        .filter(|loc| contains_keyword(loc, keywords))
        .cloned()
        .collect();
    matching.sort_by_key(|url| (!is_main_page(url, keywords), url.len()));
    matching
}

/// 选出URL中包含关键字的嵌套站点地图
pub fn keyword_sitemaps(locs: &[String], keywords: &[String], limit: usize) -> Vec<String> {
    locs.iter()
        .filter(|loc| is_nested_sitemap(loc))
        .filter(|loc| contains_keyword(loc, keywords))
        .take(limit)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords() -> Vec<String> {
        ["careers", "jobs", "vacatures", "werken-bij"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_extract_locs() {
        let xml = r#"<?xml version="1.0"?>
            <urlset>
              <url><loc>https://example.nl/</loc></url>
              <url><loc> https://example.nl/careers?a=1&amp;b=2 </loc></url>
              <url><loc><![CDATA[https://example.nl/jobs]]></loc></url>
              <url><loc>https://example.nl/</loc></url>
            </urlset>"#;
        assert_eq!(
            extract_locs(xml),
            vec![
                "https://example.nl/",
                "https://example.nl/careers?a=1&b=2",
                "https://example.nl/jobs",
            ]
        );
        assert!(extract_locs("not xml at all").is_empty());
    }

    #[test]
    fn test_sitemap_index_detection() {
        let xml = "<sitemapindex><sitemap><loc>https://example.nl/post-sitemap.xml</loc></sitemap></sitemapindex>";
        let locs = extract_locs(xml);
        assert!(is_sitemap_index(xml, &locs));

        let plain = "<urlset><url><loc>https://example.nl/about</loc></url></urlset>";
        assert!(!is_sitemap_index(plain, &extract_locs(plain)));
    }

    #[test]
    fn test_main_page_pattern() {
        let kw = keywords();
        assert!(is_main_page("https://example.nl/careers", &kw));
        assert!(is_main_page("https://example.nl/nl/werken-bij/", &kw));
        assert!(!is_main_page("https://example.nl/careers/backend-engineer", &kw));
    }

    #[test]
    fn test_rank_urls_prefers_main_page_then_shorter() {
        let locs: Vec<String> = [
            "https://example.nl/careers/senior-backend-engineer",
            "https://example.nl/about",
            "https://example.nl/careers/qa",
            "https://example.nl/nl/werken-bij/",
            "https://example.nl/jobs-sitemap.xml",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        assert_eq!(
            rank_urls(&locs, &keywords()),
            vec![
                "https://example.nl/nl/werken-bij/",
                "https://example.nl/careers/qa",
                "https://example.nl/careers/senior-backend-engineer",
            ]
        );
    }

    #[test]
    fn test_keyword_sitemaps_are_limited() {
        let locs: Vec<String> = [
            "https://example.nl/post-sitemap.xml",
            "https://example.nl/jobs-sitemap.xml",
            "https://example.nl/vacatures-sitemap.xml",
            "https://example.nl/careers-sitemap.xml",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        assert_eq!(
            keyword_sitemaps(&locs, &keywords(), 2),
            vec![
                "https://example.nl/jobs-sitemap.xml",
                "https://example.nl/vacatures-sitemap.xml",
            ]
        );
    }
}
