// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{AcquisitionSettings, JsDetectionSettings, Settings};
use crate::domain::models::fetch_result::FetchResult;
use crate::engines::browser_engine::BrowserEngine;
use crate::engines::js_detector::needs_javascript;
use crate::engines::reqwest_engine::ReqwestEngine;
use crate::engines::traits::{EngineError, ScrapeRequest, ScrapeResponse, ScraperEngine};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const DESKTOP_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
];

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// 随机选择一个桌面浏览器User-Agent
pub fn random_user_agent() -> &'static str {
    DESKTOP_USER_AGENTS[rand::random_range(0..DESKTOP_USER_AGENTS.len())]
}

/// 由区域设置生成Accept-Language头
///
/// `"nl-NL"` -> `"nl-NL,nl;q=0.9,en;q=0.8"`
pub fn accept_language(locale: &str) -> String {
    let language = locale.split(['-', '_']).next().unwrap_or(locale);
    if language.eq_ignore_ascii_case("en") {
        format!("{},en;q=0.9", locale)
    } else {
        format!("{},{};q=0.9,en;q=0.8", locale, language)
    }
}

/// 两级内容抓取器
///
/// 先用廉价的HTTP请求，只有在状态码非200、请求失败或页面需要JavaScript时
/// 才使用浏览器渲染。浏览器引擎由调用方注入，生命周期由抓取器的 `shutdown` 结束。
pub struct ContentAcquirer {
    http: Arc<dyn ScraperEngine>,
    browser: Arc<dyn ScraperEngine>,
    settings: AcquisitionSettings,
    js_detection: JsDetectionSettings,
}

impl ContentAcquirer {
    /// 创建抓取器
    ///
    /// # 参数
    ///
    /// * `http` - HTTP引擎
    /// * `browser` - 浏览器引擎
    /// * `settings` - 抓取配置
    /// * `js_detection` - JavaScript检测阈值
    pub fn new(
        http: Arc<dyn ScraperEngine>,
        browser: Arc<dyn ScraperEngine>,
        settings: AcquisitionSettings,
        js_detection: JsDetectionSettings,
    ) -> Self {
        Self {
            http,
            browser,
            settings,
            js_detection,
        }
    }

    /// 使用reqwest和chromiumoxide引擎创建抓取器
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Arc::new(ReqwestEngine),
            Arc::new(BrowserEngine::new(settings.acquisition.clone())),
            settings.acquisition.clone(),
            settings.js_detection.clone(),
        )
    }

    fn request(&self, url: &str, timeout: Duration) -> ScrapeRequest {
        let headers = HashMap::from([
            ("Accept".to_string(), ACCEPT.to_string()),
            (
                "Accept-Language".to_string(),
                accept_language(&self.settings.locale),
            ),
        ]);
        ScrapeRequest {
            url: url.to_string(),
            headers,
            timeout,
            user_agent: random_user_agent().to_string(),
        }
    }

    /// 抓取页面内容
    ///
    /// # 参数
    ///
    /// * `url` - 页面URL
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchResult)` - 页面内容，`used_browser` 标记是否经过浏览器渲染
    /// * `Err(EngineError)` - URL无效或浏览器渲染失败
    pub async fn fetch(&self, url: &str) -> Result<FetchResult, EngineError> {
        let request = self.request(url, self.settings.http_timeout());
        match self.http.scrape(&request).await {
            Ok(response) if response.status_code == 200 => {
                if !needs_javascript(&response.content, &self.js_detection) {
                    return Ok(FetchResult {
                        content: response.content,
                        http_status: response.status_code,
                        used_browser: false,
                    });
                }
                debug!("{} looks client-rendered, escalating to browser", url);
            }
            Ok(response) => {
                debug!(
                    "{} returned HTTP {}, escalating to browser",
                    url, response.status_code
                );
            }
            Err(EngineError::InvalidUrl(reason)) => return Err(EngineError::InvalidUrl(reason)),
            Err(e) => {
                debug!("HTTP fetch of {} failed ({}), escalating to browser", url, e);
            }
        }

        let request = self.request(url, self.settings.browser_timeout());
        match self.browser.scrape(&request).await {
            Ok(response) => {
                info!(
                    "Rendered {} with {} (HTTP {})",
                    url,
                    self.browser.name(),
                    response.status_code
                );
                Ok(FetchResult {
                    content: response.content,
                    http_status: response.status_code,
                    used_browser: true,
                })
            }
            Err(e) => {
                warn!("Browser fetch of {} failed: {}", url, e);
                Err(e)
            }
        }
    }

    /// 只用HTTP抓取，用于从不需要渲染的资源（如站点地图）
    ///
    /// 请求失败或状态码非200时返回 `None`
    pub async fn fetch_static(&self, url: &str) -> Option<ScrapeResponse> {
        let request = self.request(url, self.settings.http_timeout());
        match self.http.scrape(&request).await {
            Ok(response) if response.status_code == 200 => Some(response),
            Ok(response) => {
                debug!("Static fetch of {} returned HTTP {}", url, response.status_code);
                None
            }
            Err(e) => {
                debug!("Static fetch of {} failed: {}", url, e);
                None
            }
        }
    }

    /// 释放浏览器资源
    pub async fn shutdown(&self) {
        self.browser.shutdown().await;
        self.http.shutdown().await;
    }
}

#[cfg(test)]
#[path = "acquirer_test.rs"]
mod tests;
