// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::JsDetectionSettings;
use crate::utils::html_patterns;
use once_cell::sync::Lazy;
use regex::Regex;

/// 客户端渲染外壳页面的特征
static SHELL_SIGNATURES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // empty root/app containers used by React, Vue, Next and friends
        r#"(?is)<div[^>]*\bid\s*=\s*["']?(root|app|__next|__nuxt|svelte)["']?[^>]*>\s*</div>"#,
        r#"(?i)\bloading\s*(\.\.\.|…)"#,
        r#"(?is)<noscript[^>]*>[^<]*(enable|activeer|aktivieren)[^<]*javascript"#,
        r#"(?is)<body[^>]*>\s*</body>"#,
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// 页面是否包含已知的空壳特征
pub fn has_shell_signature(html: &str) -> bool {
    SHELL_SIGNATURES.iter().any(|re| re.is_match(html))
}

/// 判断页面是否需要JavaScript渲染
///
/// 页面过短或带有空壳特征，并且去除标记后的可见文本低于阈值时才需要渲染。
/// 仅有空壳特征但已包含大量文本的页面不需要渲染。
///
/// 这是尽力而为的启发式判断：把JS页面误判为静态页面是可以接受的，
/// 发现阶段的目标页面检测会失败并继续回退。
pub fn needs_javascript(html: &str, settings: &JsDetectionSettings) -> bool {
    let suspicious = html.trim().len() < settings.min_body_length || has_shell_signature(html);
    if !suspicious {
        return false;
    }
    html_patterns::visible_text(html).chars().count() < settings.min_text_length
}
