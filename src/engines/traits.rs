// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// 页面获取失败的原因
///
/// 非2xx状态码不在此列，它们作为正常响应返回
#[derive(Error, Debug)]
pub enum EngineError {
    /// 连接、TLS或读取响应体失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 地址无法解析
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// 无头浏览器启动、导航或取内容失败
    #[error("Browser error: {0}")]
    Browser(String),
    /// 关闭后仍收到渲染请求
    #[error("Browser has been shut down")]
    BrowserClosed,
    /// 超过单页时限
    #[error("Timeout")]
    Timeout,
    #[error("Other error: {0}")]
    Other(String),
}

/// 单页获取参数，由获取器按层级填充
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub url: String,
    /// 额外请求头，名称或取值非法的条目会被忽略
    pub headers: HashMap<String, String>,
    /// 单页时限，两级获取各自不同
    pub timeout: Duration,
    pub user_agent: String,
}

/// 获取到的原始页面
#[derive(Debug, Clone)]
pub struct ScrapeResponse {
    /// 浏览器层取主文档的响应状态
    pub status_code: u16,
    /// HTML正文（浏览器层为渲染后的DOM）
    pub content: String,
    /// 耗时（毫秒），仅用于日志
    pub response_time_ms: u64,
}

/// 页面获取后端
///
/// 普通HTTP与无头浏览器两种实现共用此接口，测试中以桩实现替换
#[async_trait]
pub trait ScraperEngine: Send + Sync {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResponse, EngineError>;

    /// 用于日志的短名称
    fn name(&self) -> &'static str;

    /// 关闭后端持有的进程或连接，默认无事可做
    async fn shutdown(&self) {}
}
