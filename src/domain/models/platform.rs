// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 第三方招聘平台标识
///
/// 仅作为编排层的路由提示，不影响发现结果的正确性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    None,
    Recruitee,
    Greenhouse,
    Lever,
    Workable,
}

/// URL域名模式
const URL_PATTERNS: &[(Platform, &[&str])] = &[
    (Platform::Recruitee, &[".recruitee.com"]),
    (Platform::Greenhouse, &["boards.greenhouse.io", "job-boards.greenhouse.io"]),
    (Platform::Lever, &["jobs.lever.co"]),
    (Platform::Workable, &["apply.workable.com", ".workable.com"]),
];

/// 页面标记中的平台签名（脚本地址、容器元素ID）
const HTML_SIGNATURES: &[(Platform, &[&str])] = &[
    (
        Platform::Recruitee,
        &["recruitee.com/widget", "recruitee-careers", "rtcdn.recruitee"],
    ),
    (
        Platform::Greenhouse,
        &["boards.greenhouse.io/embed", "grnhse_app", "grnhse_iframe"],
    ),
    (Platform::Lever, &["jobs.lever.co/", "lever-jobs-container"]),
    (
        Platform::Workable,
        &["apply.workable.com", "whr_embed_hook", "workable.com/assets/embed"],
    ),
];

impl Platform {
    /// 根据URL识别平台
    pub fn from_url(url: &str) -> Self {
        let host = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
            .unwrap_or_else(|| url.to_lowercase());

        URL_PATTERNS
            .iter()
            .find(|(_, patterns)| patterns.iter().any(|p| host_matches(&host, p)))
            .map(|(platform, _)| *platform)
            .unwrap_or(Platform::None)
    }

    /// 根据页面标记中的签名识别平台
    pub fn from_html(html: &str) -> Self {
        let lowered = html.to_lowercase();
        HTML_SIGNATURES
            .iter()
            .find(|(_, signatures)| signatures.iter().any(|s| lowered.contains(s)))
            .map(|(platform, _)| *platform)
            .unwrap_or(Platform::None)
    }

    /// 先匹配URL，再匹配标记
    pub fn detect(url: &str, html: &str) -> Self {
        match Self::from_url(url) {
            Platform::None => Self::from_html(html),
            platform => platform,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Platform::None)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::None => "none",
            Platform::Recruitee => "recruitee",
            Platform::Greenhouse => "greenhouse",
            Platform::Lever => "lever",
            Platform::Workable => "workable",
        }
    }
}

/// ".example.com" 只匹配子域名；其他模式匹配完整主机名或其子域名
fn host_matches(host: &str, pattern: &str) -> bool {
    if pattern.starts_with('.') {
        host.ends_with(pattern)
    } else {
        host == pattern || host.ends_with(&format!(".{}", pattern))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 根据URL识别平台
pub fn detect_platform(url: &str) -> Platform {
    Platform::from_url(url)
}

/// 根据页面标记识别平台
pub fn detect_platform_from_html(html: &str) -> Platform {
    Platform::from_html(html)
}
