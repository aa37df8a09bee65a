// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：抓取结果、发现结果、页面记录和关键词表
/// - 服务（services）：目标页面发现、内容规范化以及外部协作者接口
pub mod models;
pub mod services;
