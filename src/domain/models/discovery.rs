// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::platform::Platform;
use serde::{Deserialize, Serialize};

/// 产生发现结果的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoverySource {
    Sitemap,
    Heuristic,
    Homepage,
}

/// 发现结果
///
/// `url` 一定是实际抓取过并通过目标页面检测的URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    /// 目标页面URL
    pub url: String,
    /// 抓取到的页面内容
    pub content: String,
    /// 识别出的平台
    pub platform: Platform,
    /// 按发现优先级排列的相关URL
    pub related_urls: Vec<String>,
    /// 抓取该页面时是否使用了浏览器
    pub used_browser: bool,
    /// 产生结果的发现阶段
    pub source: DiscoverySource,
}

/// 发现结果类型
///
/// `NotFound` 是正常结果而不是错误，调用方可以缓存并单独展示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DiscoveryOutcome {
    Found(DiscoveryResult),
    NotFound,
}

impl DiscoveryOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, DiscoveryOutcome::Found(_))
    }

    pub fn into_result(self) -> Option<DiscoveryResult> {
        match self {
            DiscoveryOutcome::Found(result) => Some(result),
            DiscoveryOutcome::NotFound => None,
        }
    }
}
