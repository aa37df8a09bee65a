// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含把发现、抓取、规范化和缓存串联起来的用例
pub mod use_cases;
