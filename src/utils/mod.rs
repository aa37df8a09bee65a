// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
/// 包括HTML模式匹配、链接提取、站点地图解析和遥测
pub mod html_patterns;
pub mod link_extractor;
pub mod sitemap;
pub mod telemetry;
pub mod url_utils;

#[cfg(test)]
mod telemetry_test;
