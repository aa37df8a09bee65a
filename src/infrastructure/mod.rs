// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 包含与外部系统交互的技术实现。
///
/// 包含的子模块：
/// - 缓存（cache）：Redis主存储加进程内存储的两级缓存
pub mod cache;
