// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sitescout::config::settings::Settings;
use sitescout::engines::acquirer::ContentAcquirer;
use sitescout::engines::reqwest_engine::ReqwestEngine;
use sitescout::engines::traits::{EngineError, ScrapeRequest, ScrapeResponse, ScraperEngine};
use sitescout::infrastructure::cache::{CacheError, PrimaryStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wiremock::{MockServer, ResponseTemplate};

pub const NOT_FOUND_PAGE: &str = "<html><body><h1>Page not found</h1></body></html>";

/// 按URL路径返回预设页面的浏览器替身
///
/// 未登记的路径返回一个简短的404页面
pub struct StubBrowser {
    pages: HashMap<String, String>,
    pub calls: AtomicUsize,
    pub shutdowns: AtomicUsize,
}

impl StubBrowser {
    pub fn new() -> Arc<Self> {
        Self::with_pages(&[])
    }

    pub fn with_pages(pages: &[(&str, String)]) -> Arc<Self> {
        Arc::new(Self {
            pages: pages
                .iter()
                .map(|(path, body)| (path.to_string(), body.clone()))
                .collect(),
            calls: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScraperEngine for StubBrowser {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResponse, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let path = url::Url::parse(&request.url)
            .map(|u| u.path().to_string())
            .map_err(|e| EngineError::InvalidUrl(e.to_string()))?;
        let content = self
            .pages
            .get(&path)
            .cloned()
            .unwrap_or_else(|| NOT_FOUND_PAGE.to_string());
        Ok(ScrapeResponse {
            status_code: 200,
            content,
            response_time_ms: 1,
        })
    }

    fn name(&self) -> &'static str {
        "stub-browser"
    }

    async fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

/// 共享的进程外缓存替身，模拟多个进程共用的Redis
#[derive(Default)]
pub struct SharedPrimary {
    entries: Mutex<HashMap<String, String>>,
    pub writes: AtomicUsize,
}

impl SharedPrimary {
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl PrimaryStore for SharedPrimary {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set_ex(&self, key: &str, value: &str, _ttl_secs: u64) -> Result<(), CacheError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// 指向模拟站点的配置：HTTP协议、无页面间隔
pub fn settings_for_mock() -> Settings {
    let mut settings = Settings::default();
    settings.discovery.scheme = "http".to_string();
    settings.orchestrator.page_delay_ms = 0;
    settings
}

pub fn acquirer_with(settings: &Settings, browser: Arc<StubBrowser>) -> Arc<ContentAcquirer> {
    Arc::new(ContentAcquirer::new(
        Arc::new(ReqwestEngine),
        browser,
        settings.acquisition.clone(),
        settings.js_detection.clone(),
    ))
}

/// 模拟站点的域名（`127.0.0.1:端口`）
pub fn domain_of(server: &MockServer) -> String {
    server.address().to_string()
}

fn filler(sentence: &str) -> String {
    format!("<p>{}</p>", sentence.repeat(12))
}

/// 足够长、能通过目标页面检测的招聘页
pub fn careers_page(extra: &str) -> String {
    format!(
        "<html><head><title>Careers at ACME</title>\
         <meta name=\"description\" content=\"Open positions at ACME\"></head>\
         <body><header><nav><a href=\"/\">Home</a></nav></header>\
         <main><h1>Open positions</h1>{}{}</main><footer>ACME BV</footer></body></html>",
        extra,
        filler("Join a friendly crew of engineers and makers in Utrecht. ")
    )
}

/// 足够长、不含目标指标的普通页面
pub fn plain_page(title: &str, extra: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body><main><h1>{}</h1>{}{}</main></body></html>",
        title,
        title,
        extra,
        filler("We bake fresh bread and pastries every single morning. ")
    )
}

/// 需要JavaScript渲染的空壳页面
pub fn shell_page() -> String {
    r#"<!DOCTYPE html><html><head><title>Careers</title>
        <script src="/static/js/main.8f1c.js"></script></head>
        <body><div id="root"></div></body></html>"#
        .to_string()
}

pub fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

pub fn xml(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/xml")
        .set_body_string(body)
}
