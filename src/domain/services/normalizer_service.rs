// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::NormalizerSettings;
use crate::domain::models::page::{NormalizedPage, PageType};
use crate::utils::html_patterns::{
    self, block_regexes, collapse_whitespace, decode_entities, remove_all, strip_comments,
    text_of, void_regexes,
};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

static NOISE_BLOCKS: Lazy<Vec<Regex>> = Lazy::new(|| {
    block_regexes(&["script", "style", "noscript", "svg", "iframe", "template"])
});
static LAYOUT_BLOCKS: Lazy<Vec<Regex>> =
    Lazy::new(|| block_regexes(&["nav", "header", "footer", "aside", "form"]));
static ICON_ELEMENTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?is)<(i|span)\b[^>]*\bclass\s*=\s*["'][^"']*\b(icons?|fa[srlbd]?|material-icons|material-symbols-\w+|bi|glyphicon)\b[^"']*["'][^>]*>.*?</(i|span)\s*>"#,
        r#"(?is)<i\b[^>]*>\s*</i\s*>"#,
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});
static MEDIA_BLOCKS: Lazy<Vec<Regex>> =
    Lazy::new(|| block_regexes(&["picture", "video", "audio", "canvas"]));
static MEDIA_VOID: Lazy<Vec<Regex>> = Lazy::new(|| void_regexes(&["img", "source", "input"]));
static BUTTONS: Lazy<Vec<Regex>> = Lazy::new(|| block_regexes(&["button"]));

static HEADING_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h([1-6])\b[^>]*>(.*?)</h[1-6]\s*>").unwrap());
static STRONG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(?:strong|b)\b[^>]*>(.*?)</(?:strong|b)\s*>").unwrap());
static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(?:em|i)\b[^>]*>(.*?)</(?:em|i)\s*>").unwrap());
static ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<a\b[^>]*>(.*?)</a\s*>").unwrap());
static INLINE_TAGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</?(?:span|small|mark|abbr|sup|sub|u|code|time)\b[^>]*>").unwrap()
});
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<li\b[^>]*>").unwrap());
static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static PARAGRAPH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</?p\b[^>]*>").unwrap());
static BLOCK_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)</(?:div|section|article|main|ul|ol|table|tr|blockquote|dl|dt|dd|figure|figcaption|pre)\s*>",
    )
    .unwrap()
});

/// URL路径段到页面类型的映射（精确匹配）
const PATH_KEYWORDS: &[(PageType, &[&str])] = &[
    (
        PageType::About,
        &[
            "about", "about-us", "about_us", "aboutus", "over-ons", "overons", "over",
            "wie-zijn-wij", "ueber-uns", "uber-uns", "unternehmen", "company", "our-story",
            "ons-verhaal",
        ],
    ),
    (
        PageType::Contact,
        &["contact", "contact-us", "contactus", "kontakt", "contacteer-ons", "impressum"],
    ),
    (
        PageType::Faq,
        &["faq", "faqs", "veelgestelde-vragen", "vragen", "haeufige-fragen", "help"],
    ),
    (
        PageType::Pricing,
        &["pricing", "prices", "prijzen", "tarieven", "preise", "plans", "abonnementen"],
    ),
    (
        PageType::Blog,
        &["blog", "news", "nieuws", "articles", "artikelen", "aktuelles", "insights", "magazine"],
    ),
    (
        PageType::Team,
        &["team", "our-team", "ons-team", "people", "medewerkers", "mensen", "unser-team"],
    ),
    (
        PageType::Service,
        &[
            "services",
            "service",
            "diensten",
            "dienstverlening",
            "leistungen",
            "solutions",
            "oplossingen",
        ],
    ),
    (
        PageType::Product,
        &["products", "product", "producten", "produkte", "shop", "features", "assortiment"],
    ),
];

/// 标题和开头正文中的页面类型短语
const TEXT_PHRASES: &[(PageType, &[&str])] = &[
    (
        PageType::About,
        &[
            "about us",
            "over ons",
            "who we are",
            "wie zijn wij",
            "über uns",
            "our story",
            "ons verhaal",
        ],
    ),
    (
        PageType::Contact,
        &[
            "contact us",
            "neem contact op",
            "get in touch",
            "kontaktieren sie uns",
            "contactgegevens",
        ],
    ),
    (
        PageType::Faq,
        &["frequently asked questions", "faq", "veelgestelde vragen", "häufige fragen"],
    ),
    (
        PageType::Pricing,
        &["pricing", "prijzen", "tarieven", "preise", "per month", "per maand", "pro monat"],
    ),
    (
        PageType::Blog,
        &["blog", "latest news", "laatste nieuws", "neuigkeiten"],
    ),
    (
        PageType::Team,
        &["our team", "ons team", "meet the team", "unser team"],
    ),
    (
        PageType::Service,
        &["our services", "onze diensten", "unsere leistungen", "what we do", "wat wij doen"],
    ),
    (
        PageType::Product,
        &["our products", "onze producten", "unsere produkte"],
    ),
];

/// 用于分类的开头正文长度（字符）
const LEAD_CHARS: usize = 500;

/// 作为语言前缀出现的路径段（不含 `it`，它多半是部门路径）
const LANGUAGE_SEGMENTS: &[&str] = &["nl", "en", "de", "fr", "es", "pt", "pl", "da", "sv", "fi"];

/// 内容规范化服务
///
/// 把任意HTML转换为干净的类Markdown文本并提取元数据。
/// 每一步都只做模式匹配，从不失败：异常文档得到空值或默认值。
#[derive(Debug, Clone, Default)]
pub struct ContentNormalizer {
    settings: NormalizerSettings,
}

impl ContentNormalizer {
    pub fn new(settings: NormalizerSettings) -> Self {
        Self { settings }
    }

    /// 规范化页面
    ///
    /// # 参数
    ///
    /// * `raw_html` - 原始或渲染后的HTML
    /// * `url` - 页面URL，用于页面分类
    ///
    /// # 返回值
    ///
    /// 规范化后的页面记录
    pub fn normalize(&self, raw_html: &str, url: &str) -> NormalizedPage {
        let cleaned = strip_noise(raw_html);
        let region = main_region(&cleaned);
        let markdown = to_markdown(&region);
        let content = truncate_content(&markdown, self.settings.max_content_chars);

        let title = html_patterns::title(raw_html)
            .or_else(|| html_patterns::first_h1(raw_html))
            .unwrap_or_else(|| "Untitled".to_string());
        let page_type = classify_page(url, &title, &content);

        NormalizedPage {
            url: url.to_string(),
            meta_description: html_patterns::meta_description(raw_html),
            headings: html_patterns::headings(&cleaned),
            content_hash: content_hash(&content, self.settings.hash_length),
            title,
            content,
            page_type,
            extracted_at: Utc::now(),
            enrichment: None,
        }
    }
}

/// 依次去除噪声块、布局块、图标、媒体和按钮
fn strip_noise(html: &str) -> String {
    let html = strip_comments(html);
    let html = remove_all(&html, &NOISE_BLOCKS);
    let html = remove_all(&html, &LAYOUT_BLOCKS);
    let html = remove_all(&html, &ICON_ELEMENTS);
    let html = remove_all(&html, &MEDIA_BLOCKS);
    let html = remove_all(&html, &MEDIA_VOID);
    remove_all(&html, &BUTTONS)
}

/// 主内容区域：`<main>`，否则 `<article>`，否则 `<body>`，否则整个文档
fn main_region(html: &str) -> String {
    ["main", "article", "body"]
        .iter()
        .find_map(|tag| {
            html_patterns::inner_of(html, tag).filter(|inner| !inner.trim().is_empty())
        })
        .unwrap_or_else(|| html.to_string())
}

fn wrap_inline(marker: &str, caps: &Captures) -> String {
    let inner = caps.get(1).map(|m| text_of(m.as_str())).unwrap_or_default();
    if inner.is_empty() {
        String::new()
    } else {
        format!("{marker}{inner}{marker}")
    }
}

/// 转换为类Markdown文本
///
/// 源码中的空白没有意义，先压缩为单个空格，换行只来自块级元素
pub fn to_markdown(html: &str) -> String {
    let html = collapse_whitespace(html);
    let text = HEADING_BLOCK.replace_all(&html, |caps: &Captures| {
        let level = caps.get(1).map(|m| m.as_str()).unwrap_or("3");
        let prefix = match level {
            "1" => "#",
            "2" => "##",
            _ => "###",
        };
        let inner = caps.get(2).map(|m| text_of(m.as_str())).unwrap_or_default();
        if inner.is_empty() {
            "\n".to_string()
        } else {
            format!("\n\n{} {}\n\n", prefix, inner)
        }
    });
    let text = STRONG.replace_all(&text, |caps: &Captures| wrap_inline("**", caps));
    let text = EMPHASIS.replace_all(&text, |caps: &Captures| wrap_inline("*", caps));
    let text = ANCHOR.replace_all(&text, "$1");
    let text = INLINE_TAGS.replace_all(&text, "");
    let text = LIST_ITEM.replace_all(&text, "\n- ");
    let text = LINE_BREAK.replace_all(&text, "\n");
    let text = PARAGRAPH.replace_all(&text, "\n\n");
    let text = BLOCK_END.replace_all(&text, "\n");
    let text = html_patterns::replace_tags(&text, " ");
    tidy_lines(&decode_entities(&text))
}

/// 逐行压缩空白，删除只有标点或符号的行，不保留连续空行
fn tidy_lines(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        let line = collapse_whitespace(raw);
        if !line.is_empty() && !line.chars().any(char::is_alphanumeric) {
            continue;
        }
        if line.is_empty() && lines.last().map_or(true, |prev| prev.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// 截断到最大字符数
///
/// 在限制之前最后一个 `". "` 或换行处截断；
/// 若该边界不超过预算的一半，则直接在限制处截断
pub fn truncate_content(content: &str, max_chars: usize) -> String {
    let cut = match content.char_indices().nth(max_chars) {
        Some((index, _)) => index,
        None => return content.to_string(),
    };
    let head = &content[..cut];
    let boundary = [head.rfind(". ").map(|i| i + 1), head.rfind('\n')]
        .into_iter()
        .flatten()
        .max();

    match boundary {
        Some(end) if head[..end].chars().count() > max_chars / 2 => {
            head[..end].trim_end().to_string()
        }
        _ => head.trim_end().to_string(),
    }
}

/// 内容指纹：SHA-256十六进制的前 `length` 个字符
pub fn content_hash(content: &str, length: usize) -> String {
    let mut hash = hex::encode(Sha256::digest(content.as_bytes()));
    hash.truncate(length);
    hash
}

fn path_segments(url: &str) -> Vec<String> {
    let path = url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    path.to_lowercase()
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches(".html").trim_end_matches(".php").to_string())
        .collect()
}

/// `nl`、`en-gb` 这样的语言前缀
fn is_language_segment(segment: &str) -> bool {
    let (language, region) = match segment.split_once(['-', '_']) {
        Some((language, region)) => (language, Some(region)),
        None => (segment, None),
    };
    LANGUAGE_SEGMENTS.contains(&language)
        && region.map_or(true, |r| r.len() == 2 && r.chars().all(|c| c.is_ascii_alphabetic()))
}

/// 判断页面类型
///
/// 先按URL路径段精确匹配，再扫描标题和开头正文，默认 `Other`。
/// 根路径（或只有语言前缀的路径，如 `/nl/`、`/en-gb/`）为 `Home`。
pub fn classify_page(url: &str, title: &str, content: &str) -> PageType {
    let segments = path_segments(url);
    if segments.iter().all(|s| is_language_segment(s)) {
        return PageType::Home;
    }

    for segment in &segments {
        if let Some((page_type, _)) = PATH_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.contains(&segment.as_str()))
        {
            return *page_type;
        }
    }

    let lead: String = content.chars().take(LEAD_CHARS).collect();
    let words: Vec<String> = format!("{} {}", title, lead)
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();
    let haystack = format!(" {} ", words.join(" "));

    TEXT_PHRASES
        .iter()
        .find(|(_, phrases)| {
            phrases
                .iter()
                .any(|phrase| haystack.contains(&format!(" {} ", phrase)))
        })
        .map(|(page_type, _)| *page_type)
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "normalizer_service_test.rs"]
mod tests;
