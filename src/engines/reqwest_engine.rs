// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{EngineError, ScrapeRequest, ScrapeResponse, ScraperEngine};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;
use url::Url;

/// 普通HTTP获取，两级获取中的第一级
///
/// 每次请求新建客户端，cookie不在站点之间共享
pub struct ReqwestEngine;

impl ReqwestEngine {
    fn header_map(extra: &HashMap<String, String>) -> HeaderMap {
        extra
            .iter()
            .filter_map(|(name, value)| {
                let name = HeaderName::from_bytes(name.as_bytes()).ok()?;
                let value = HeaderValue::from_str(value).ok()?;
                Some((name, value))
            })
            .collect()
    }

    fn send_error(err: reqwest::Error) -> EngineError {
        if err.is_timeout() {
            EngineError::Timeout
        } else {
            EngineError::RequestFailed(err)
        }
    }
}

#[async_trait]
impl ScraperEngine for ReqwestEngine {
    /// 任何状态码都原样返回，是否回退到浏览器由获取器判断
    async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResponse, EngineError> {
        let target = Url::parse(&request.url)
            .map_err(|e| EngineError::InvalidUrl(format!("{}: {}", request.url, e)))?;

        let client = reqwest::Client::builder()
            .user_agent(request.user_agent.as_str())
            .timeout(request.timeout)
            .cookie_store(true)
            .build()?;

        let started = Instant::now();
        let response = client
            .get(target)
            .headers(Self::header_map(&request.headers))
            .send()
            .await
            .map_err(Self::send_error)?;

        let status_code = response.status().as_u16();
        let content = response.text().await.map_err(Self::send_error)?;
        let response_time_ms = started.elapsed().as_millis() as u64;

        debug!(
            url = %request.url,
            status = status_code,
            bytes = content.len(),
            elapsed_ms = response_time_ms,
            "Fetched page over HTTP"
        );

        Ok(ScrapeResponse {
            status_code,
            content,
            response_time_ms,
        })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
