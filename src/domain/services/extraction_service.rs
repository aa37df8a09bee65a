// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::platform::Platform;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// AI抽取的结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionOutput {
    /// 抽取出的结构化实体
    pub entities: Vec<Value>,
    /// 0到1之间的置信度
    pub confidence: f64,
}

/// 外部AI抽取服务
///
/// 输入规范化文本和候选URL，输出结构化实体和置信度
#[async_trait]
pub trait ExtractionService: Send + Sync {
    /// 执行抽取
    ///
    /// # 参数
    ///
    /// * `text` - 规范化后的页面文本
    /// * `source_url` - 页面URL
    /// * `related_urls` - 发现阶段收集的相关URL
    ///
    /// # 返回值
    ///
    /// * `Ok(ExtractionOutput)` - 抽取结果
    /// * `Err(anyhow::Error)` - 服务错误，原样传给调用方
    async fn extract(
        &self,
        text: &str,
        source_url: &str,
        related_urls: &[String],
    ) -> Result<ExtractionOutput>;
}

/// 已知平台的结构化数据客户端
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// 客户端负责的平台
    fn platform(&self) -> Platform;

    /// 读取平台上的结构化数据，平台没有数据时返回 `None`
    async fn parse(&self, url: &str) -> Result<Option<Vec<Value>>>;
}
