// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 基于正则的HTML模式匹配函数
//!
//! 面向任意（可能无效的）标记做尽力而为的结构提取，不构建DOM。
//! 每个函数都是纯函数且不会失败，可以按固定顺序组合。

use once_cell::sync::Lazy;
use regex::Regex;

static COMMENT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());
static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static HIDDEN_BLOCKS: Lazy<Vec<Regex>> =
    Lazy::new(|| block_regexes(&["script", "style", "noscript", "template", "svg"]));
static TITLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").unwrap());
static H1_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<h1\b[^>]*>(.*?)</h1\s*>").unwrap());
static HEADING_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h([1-6])\b[^>]*>(.*?)</h[1-6]\s*>").unwrap());
static META_NAME_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<meta\b[^>]*\bname\s*=\s*["']description["'][^>]*\bcontent\s*=\s*"([^"]*)""#)
        .unwrap()
});
static META_NAME_FIRST_SQ: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<meta\b[^>]*\bname\s*=\s*["']description["'][^>]*\bcontent\s*=\s*'([^']*)'"#)
        .unwrap()
});
static META_CONTENT_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<meta\b[^>]*\bcontent\s*=\s*"([^"]*)"[^>]*\bname\s*=\s*["']description["']"#)
        .unwrap()
});
static META_CONTENT_FIRST_SQ: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<meta\b[^>]*\bcontent\s*=\s*'([^']*)'[^>]*\bname\s*=\s*["']description["']"#)
        .unwrap()
});

/// 为每个标签构造匹配整个元素块的正则
pub fn block_regexes(tags: &[&str]) -> Vec<Regex> {
    tags.iter()
        .filter_map(|tag| Regex::new(&format!(r"(?is)<{0}\b[^>]*>.*?</{0}\s*>", tag)).ok())
        .collect()
}

/// 为每个空元素构造匹配开始标签的正则
pub fn void_regexes(tags: &[&str]) -> Vec<Regex> {
    tags.iter()
        .filter_map(|tag| Regex::new(&format!(r"(?is)<{}\b[^>]*/?>", tag)).ok())
        .collect()
}

/// 依次应用所有正则并删除匹配内容
pub fn remove_all(html: &str, patterns: &[Regex]) -> String {
    patterns.iter().fold(html.to_string(), |acc, re| {
        re.replace_all(&acc, "").into_owned()
    })
}

/// 删除HTML注释
pub fn strip_comments(html: &str) -> String {
    COMMENT_REGEX.replace_all(html, "").into_owned()
}

/// 将所有标签替换为指定字符串
pub fn replace_tags(html: &str, replacement: &str) -> String {
    TAG_REGEX.replace_all(html, replacement).into_owned()
}

/// 解码HTML实体
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// 把连续空白压缩成一个空格并去除首尾空白
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text, " ").trim().to_string()
}

/// 标记片段的纯文本：去标签、解码实体、压缩空白
pub fn text_of(fragment: &str) -> String {
    collapse_whitespace(&decode_entities(&replace_tags(fragment, " ")))
}

/// 用户可见的文本
///
/// 去除脚本、样式、noscript等不可见块后再提取文本
pub fn visible_text(html: &str) -> String {
    let without_hidden = remove_all(&strip_comments(html), &HIDDEN_BLOCKS);
    text_of(&without_hidden)
}

/// 第一个匹配元素的内部标记（贪婪匹配到最后一个结束标签，兼容嵌套）
pub fn inner_of(html: &str, tag: &str) -> Option<String> {
    let re = Regex::new(&format!(r"(?is)<{0}\b[^>]*>(.*)</{0}\s*>", tag)).ok()?;
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// 文档 `<title>` 的文本
pub fn title(html: &str) -> Option<String> {
    TITLE_REGEX
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| text_of(m.as_str()))
        .filter(|t| !t.is_empty())
}

/// 第一个 `<h1>` 的文本
pub fn first_h1(html: &str) -> Option<String> {
    H1_REGEX
        .captures_iter(html)
        .filter_map(|c| c.get(1).map(|m| text_of(m.as_str())))
        .find(|t| !t.is_empty())
}

/// `name=description` 的meta内容，支持任意属性顺序和引号类型
pub fn meta_description(html: &str) -> Option<String> {
    [
        &*META_NAME_FIRST,
        &*META_NAME_FIRST_SQ,
        &*META_CONTENT_FIRST,
        &*META_CONTENT_FIRST_SQ,
    ]
    .iter()
    .find_map(|re| re.captures(html).and_then(|c| c.get(1)))
    .map(|m| collapse_whitespace(&decode_entities(m.as_str())))
    .filter(|d| !d.is_empty())
}

/// 按文档顺序返回所有标题文本
pub fn headings(html: &str) -> Vec<String> {
    HEADING_REGEX
        .captures_iter(html)
        .filter_map(|c| c.get(2).map(|m| text_of(m.as_str())))
        .filter(|t| !t.is_empty())
        .collect()
}
