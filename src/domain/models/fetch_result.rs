// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 单次抓取的结果
///
/// 在一次抓取调用内创建并丢弃，不持久化
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    /// 页面内容（原始HTML或渲染后的文档）
    pub content: String,
    /// HTTP状态码
    pub http_status: u16,
    /// 是否使用了浏览器渲染
    pub used_browser: bool,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.http_status)
    }
}
