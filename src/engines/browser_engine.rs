// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::AcquisitionSettings;
use crate::engines::traits::{EngineError, ScrapeRequest, ScrapeResponse, ScraperEngine};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetLocaleOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// 无法得到主文档响应时（如 `about:` 或本地文件）使用的状态码
const ASSUMED_STATUS: u16 = 200;

/// chromiumoxide不认识的CDP消息会以反序列化错误的形式出现，不影响后续事件
fn is_benign_handler_error(message: &str) -> bool {
    message.contains("data did not match any variant of untagged enum Message")
        || message.contains("Failed to deserialize WS response")
}

/// 主文档响应的状态码
fn document_status(status: Option<i64>) -> u16 {
    status
        .and_then(|code| u16::try_from(code).ok())
        .unwrap_or(ASSUMED_STATUS)
}

/// 运行中的浏览器及其事件处理任务
struct RunningBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
    /// 本进程启动的浏览器在关闭时需要终止进程；远程浏览器只断开连接
    owned: bool,
}

enum BrowserState {
    Idle,
    Running(RunningBrowser),
    Closed,
}

/// 浏览器渲染引擎
///
/// 基于chromiumoxide实现。浏览器进程在第一次需要时才启动，在整个进程内复用；
/// 每次抓取都在独立的浏览器上下文中进行，抓取结束后关闭页面并销毁上下文，
/// 因此cookie、存储和导航状态不会在目标之间泄漏。
pub struct BrowserEngine {
    settings: AcquisitionSettings,
    state: Mutex<BrowserState>,
}

impl BrowserEngine {
    pub fn new(settings: AcquisitionSettings) -> Self {
        Self {
            settings,
            state: Mutex::new(BrowserState::Idle),
        }
    }

    /// 浏览器是否已经启动
    pub async fn is_running(&self) -> bool {
        matches!(*self.state.lock().await, BrowserState::Running(_))
    }

    async fn launch(&self) -> Result<RunningBrowser, EngineError> {
        let remote_debugging_url = self
            .settings
            .remote_debugging_url
            .clone()
            .or_else(|| std::env::var("CHROMIUM_REMOTE_DEBUGGING_URL").ok());

        let (browser, mut handler, owned) = if let Some(ref url) = remote_debugging_url {
            info!("Connecting to remote Chrome instance at: {}", url);
            let (browser, handler) = Browser::connect(url).await.map_err(|e| {
                EngineError::Browser(format!("Failed to connect to remote Chrome: {}", e))
            })?;
            (browser, handler, false)
        } else {
            info!("Launching headless Chrome");
            let config = BrowserConfig::builder()
                .no_sandbox()
                .request_timeout(self.settings.browser_timeout())
                .window_size(
                    self.settings.viewport_width as u32,
                    self.settings.viewport_height as u32,
                )
                .arg("--disable-gpu")
                .arg("--disable-dev-shm-usage")
                .build()
                .map_err(EngineError::Browser)?;

            let (browser, handler) = Browser::launch(config)
                .await
                .map_err(|e| EngineError::Browser(e.to_string()))?;
            (browser, handler, true)
        };

        // Pump CDP events until the connection closes
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    let message = e.to_string();
                    if is_benign_handler_error(&message) {
                        trace!("Ignored CDP message: {}", message);
                    } else {
                        warn!("Browser handler error: {}", message);
                    }
                }
            }
            info!("Browser event handler finished");
        });

        Ok(RunningBrowser {
            browser,
            handler,
            owned,
        })
    }

    /// 在新的独立上下文中打开空白页面
    async fn open_isolated_page(
        &self,
        request: &ScrapeRequest,
    ) -> Result<(Page, BrowserContextId), EngineError> {
        let mut state = self.state.lock().await;
        let handler_stopped =
            matches!(&*state, BrowserState::Running(running) if running.handler.is_finished());
        if handler_stopped {
            warn!("Browser connection lost, relaunching");
            *state = BrowserState::Idle;
        }
        if matches!(*state, BrowserState::Idle) {
            *state = BrowserState::Running(self.launch().await?);
        }
        let running = match &*state {
            BrowserState::Running(running) => running,
            _ => return Err(EngineError::BrowserClosed),
        };

        let context_id = running
            .browser
            .execute(CreateBrowserContextParams::default())
            .await
            .map_err(|e| EngineError::Browser(format!("Failed to create context: {}", e)))?
            .result
            .browser_context_id;

        let mut target = CreateTargetParams::new("about:blank");
        target.browser_context_id = Some(context_id.clone());

        match running.browser.new_page(target).await {
            Ok(page) => Ok((page, context_id)),
            Err(e) => {
                let _ = running
                    .browser
                    .execute(DisposeBrowserContextParams::new(context_id))
                    .await;
                Err(EngineError::Browser(format!("Failed to open page: {}", e)))
            }
        }
    }

    async fn dispose_context(&self, context_id: BrowserContextId) {
        let state = self.state.lock().await;
        if let BrowserState::Running(running) = &*state {
            if let Err(e) = running
                .browser
                .execute(DisposeBrowserContextParams::new(context_id))
                .await
            {
                warn!("Failed to dispose browser context: {}", e);
            }
        }
    }

    /// 配置页面、导航、滚动，返回主文档状态码和渲染后的文档
    async fn render(
        &self,
        page: &Page,
        request: &ScrapeRequest,
    ) -> Result<(u16, String), EngineError> {
        page.set_user_agent(request.user_agent.as_str())
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))?;

        let metrics = SetDeviceMetricsOverrideParams::builder()
            .width(self.settings.viewport_width)
            .height(self.settings.viewport_height)
            .device_scale_factor(1.0)
            .mobile(false)
            .build()
            .map_err(EngineError::Browser)?;
        page.execute(metrics)
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))?;

        let locale = SetLocaleOverrideParams {
            locale: Some(self.settings.locale.clone()),
        };
        if let Err(e) = page.execute(locale).await {
            // Not every Chrome build supports locale overrides
            debug!("Locale override rejected: {}", e);
        }

        page.goto(request.url.as_str())
            .await
            .map_err(|e| EngineError::Browser(format!("Navigation failed: {}", e)))?;
        let navigation = page
            .wait_for_navigation_response()
            .await
            .map_err(|e| EngineError::Browser(format!("Navigation failed: {}", e)))?;
        let status = document_status(
            navigation
                .as_ref()
                .and_then(|http| http.response.as_ref())
                .map(|response| response.status),
        );

        // Trigger lazy-loaded content
        let pause = Duration::from_millis(self.settings.scroll_pause_ms);
        for _ in 0..self.settings.scroll_steps {
            page.evaluate("window.scrollBy(0, window.innerHeight);")
                .await
                .map_err(|e| EngineError::Browser(format!("Scroll failed: {}", e)))?;
            tokio::time::sleep(pause).await;
        }
        tokio::time::sleep(Duration::from_millis(self.settings.settle_wait_ms)).await;

        let content = page
            .content()
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))?;
        Ok((status, content))
    }
}

#[async_trait]
impl ScraperEngine for BrowserEngine {
    /// 执行浏览器渲染抓取
    ///
    /// # 参数
    ///
    /// * `request` - 抓取请求，`timeout` 约束导航、滚动和文档捕获的总时长
    ///
    /// # 返回值
    ///
    /// * `Ok(ScrapeResponse)` - 渲染后的文档
    /// * `Err(EngineError)` - 启动、导航或超时错误
    async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResponse, EngineError> {
        let start = Instant::now();
        let (page, context_id) = self.open_isolated_page(request).await?;

        let rendered = tokio::time::timeout(request.timeout, self.render(&page, request)).await;

        if let Err(e) = page.close().await {
            debug!("Failed to close page: {}", e);
        }
        self.dispose_context(context_id).await;

        let (status_code, content) = rendered.map_err(|_| EngineError::Timeout)??;
        let response_time_ms = start.elapsed().as_millis() as u64;
        debug!(
            "Rendered {} in browser (HTTP {}, {} bytes, {} ms)",
            request.url,
            status_code,
            content.len(),
            response_time_ms
        );

        Ok(ScrapeResponse {
            status_code,
            content,
            response_time_ms,
        })
    }

    fn name(&self) -> &'static str {
        "chromium"
    }

    /// 关闭共享浏览器，只执行一次
    async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        let previous = std::mem::replace(&mut *state, BrowserState::Closed);
        if let BrowserState::Running(running) = previous {
            let RunningBrowser {
                mut browser,
                handler,
                owned,
            } = running;
            if owned {
                if let Err(e) = browser.close().await {
                    warn!("Failed to close browser: {}", e);
                }
                let _ = browser.wait().await;
            }
            handler.abort();
            info!("Browser shut down");
        }
    }
}
