// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 发现服务（discovery_service）：在域名上查找目标页面
/// - 规范化服务（normalizer_service）：把HTML转换为干净的页面记录
/// - 抽取服务（extraction_service）：外部AI抽取和平台客户端的接口
pub mod discovery_service;
pub mod extraction_service;
pub mod normalizer_service;
