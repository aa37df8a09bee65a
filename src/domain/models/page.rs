// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 页面类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Home,
    About,
    Contact,
    Faq,
    Pricing,
    Blog,
    Team,
    Service,
    Product,
    #[default]
    Other,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Home => "home",
            PageType::About => "about",
            PageType::Contact => "contact",
            PageType::Faq => "faq",
            PageType::Pricing => "pricing",
            PageType::Blog => "blog",
            PageType::Team => "team",
            PageType::Service => "service",
            PageType::Product => "product",
            PageType::Other => "other",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 规范化后的页面记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPage {
    pub url: String,
    pub title: String,
    /// 类Markdown的正文（已截断）
    pub content: String,
    pub meta_description: Option<String>,
    pub headings: Vec<String>,
    pub page_type: PageType,
    /// 仅由 `content` 计算的内容指纹
    pub content_hash: String,
    pub extracted_at: DateTime<Utc>,
    /// 编排层附加的AI派生字段
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<serde_json::Value>,
}

impl NormalizedPage {
    /// 正文是否足够长，值得交给下游处理
    pub fn is_substantial(&self, min_chars: usize) -> bool {
        self.content.chars().count() >= min_chars
    }
}
