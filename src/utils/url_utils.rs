// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::Url;

/// 规范化用户输入的域名
///
/// 去除协议、`www.` 前缀、路径和末尾斜杠并转为小写，保留端口。
/// `"https://www.Example.nl/about/"` -> `"example.nl"`
pub fn normalize_domain(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let without_scheme = lowered
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(&lowered);
    let authority = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    strip_www(authority).trim_end_matches('.').to_string()
}

/// 去除 `www.` 前缀
pub fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// 主机部分是否为IP字面量（不含端口）
pub fn is_ip_host(domain: &str) -> bool {
    let host = if domain.starts_with('[') {
        return true;
    } else {
        domain.rsplit_once(':').map(|(h, _)| h).unwrap_or(domain)
    };
    host.parse::<std::net::IpAddr>().is_ok()
}

/// 由协议和域名构造站点根URL
pub fn site_root(scheme: &str, domain: &str) -> String {
    format!("{}://{}/", scheme, domain)
}

/// 去掉片段标识符，便于去重
pub fn without_fragment(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}
