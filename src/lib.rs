// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含编排发现、抓取、规范化和缓存的用例
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心模型、关键词表以及发现、规范化和抽取服务
pub mod domain;

/// 引擎模块
///
/// 实现HTTP和无头浏览器两级抓取
pub mod engines;

/// 基础设施模块
///
/// 提供两级缓存等外部服务集成
pub mod infrastructure;

/// 工具模块
///
/// 提供HTML、URL、站点地图和日志等通用辅助功能
pub mod utils;
