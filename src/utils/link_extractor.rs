// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::url_utils::{strip_www, without_fragment};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// 文档中的一个锚点
struct Anchor {
    href: String,
    text: String,
    url: Url,
}

/// 按出现顺序解析所有可跟随的锚点
///
/// 忽略片段、mailto、javascript、tel链接，以及无法解析或非http(s)的URL
fn anchors(html: &str, base_url: &str) -> Vec<Anchor> {
    let base = match Url::parse(base_url) {
        Ok(base) => base,
        Err(_) => return Vec::new(),
    };
    let document = Html::parse_document(html);

    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|element| {
            let href = element.value().attr("href")?.trim();
            let lowered = href.to_lowercase();
            if href.is_empty()
                || href.starts_with('#')
                || lowered.starts_with("mailto:")
                || lowered.starts_with("javascript:")
                || lowered.starts_with("tel:")
            {
                return None;
            }
            let url = base.join(href).ok()?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return None;
            }
            Some(Anchor {
                href: lowered,
                text: element.text().collect::<String>().to_lowercase(),
                url: without_fragment(url),
            })
        })
        .collect()
}

/// 保持顺序去重
fn dedup_ordered(urls: impl Iterator<Item = Url>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.map(|u| u.to_string())
        .filter(|u| seen.insert(u.clone()))
        .collect()
}

/// 提取链接地址或链接文本包含关键字的链接
///
/// # 参数
///
/// * `html` - HTML内容
/// * `base_url` - 用于解析相对链接的页面URL
/// * `keywords` - 小写关键字
///
/// # 返回值
///
/// 按首次出现顺序去重后的绝对URL列表
pub fn extract_keyword_links(html: &str, base_url: &str, keywords: &[String]) -> Vec<String> {
    dedup_ordered(
        anchors(html, base_url)
            .into_iter()
            .filter(|a| {
                keywords
                    .iter()
                    .any(|k| a.href.contains(k.as_str()) || a.text.contains(k.as_str()))
            })
            .map(|a| a.url),
    )
}

/// 判断链接是否属于同一站点
///
/// 解析后的主机名包含去掉 `www.` 的基础域名即视为内部链接
pub fn is_internal(url: &Url, base: &Url) -> bool {
    match (url.host_str(), base.host_str()) {
        (Some(host), Some(base_host)) => host.contains(strip_www(base_host)),
        _ => false,
    }
}

/// 路径按非字母数字字符切分后是否包含关键字
///
/// 含连字符或空格的多词关键字按子串匹配
fn path_matches(path: &str, keyword: &str) -> bool {
    if keyword.contains(['-', ' ']) {
        return path.contains(keyword);
    }
    path.split(|c: char| !c.is_alphanumeric())
        .any(|token| token == keyword)
}

/// 提取指向部门页面的内部链接
///
/// 只看链接路径，避免 "it"、"hr" 这类短关键字误匹配普通单词
pub fn extract_department_links(html: &str, base_url: &str, keywords: &[String]) -> Vec<String> {
    let base = match Url::parse(base_url) {
        Ok(base) => base,
        Err(_) => return Vec::new(),
    };
    dedup_ordered(
        anchors(html, base_url)
            .into_iter()
            .filter(|a| is_internal(&a.url, &base))
            .filter(|a| {
                let path = a.url.path().to_lowercase();
                keywords.iter().any(|k| path_matches(&path, k))
            })
            .map(|a| a.url),
    )
}
