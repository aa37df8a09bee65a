// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 多语言关键词表（英语、荷兰语、德语）
//!
//! 发现、链接提取和页面分类共用这些列表。所有条目均为小写。

/// 招聘/职业相关的URL与链接文本关键词
pub const CAREER_KEYWORDS: &[&str] = &[
    "career",
    "careers",
    "carriere",
    "jobs",
    "job",
    "vacature",
    "vacatures",
    "vacancies",
    "vacancy",
    "werken-bij",
    "werkenbij",
    "werken bij",
    "join-us",
    "join us",
    "karriere",
    "stellenangebote",
];

/// 判断页面是否为目标页面的短语指标
pub const TARGET_INDICATORS: &[&str] = &[
    "vacature",
    "vacancies",
    "vacancy",
    "open positions",
    "open position",
    "job openings",
    "we are hiring",
    "we're hiring",
    "join our team",
    "career opportunities",
    "werken bij",
    "kom werken",
    "solliciteer",
    "openstaande functies",
    "apply now",
    "stellenangebote",
    "offene stellen",
    "jetzt bewerben",
];

/// 部门/类别链接关键词
pub const DEPARTMENT_KEYWORDS: &[&str] = &[
    "department",
    "afdeling",
    "team",
    "engineering",
    "sales",
    "marketing",
    "finance",
    "operations",
    "support",
    "logistiek",
    "techniek",
    "it",
    "hr",
];

/// 站点扫描时挑选代表性内容页的关键词
pub const CONTENT_PAGE_KEYWORDS: &[&str] = &[
    "about",
    "over-ons",
    "over ons",
    "contact",
    "faq",
    "pricing",
    "prijzen",
    "tarieven",
    "services",
    "diensten",
    "products",
    "producten",
    "team",
    "blog",
];

/// 目标关键词是否出现在字符串中（不区分大小写）
pub fn contains_keyword(haystack: &str, keywords: &[String]) -> bool {
    let lowered = haystack.to_lowercase();
    keywords.iter().any(|k| lowered.contains(k.as_str()))
}

/// 页面内容是否看起来像目标页面
///
/// 宽松的子串匹配，允许误报
pub fn looks_like_target(content: &str) -> bool {
    let lowered = content.to_lowercase();
    TARGET_INDICATORS.iter().any(|p| lowered.contains(p))
}
