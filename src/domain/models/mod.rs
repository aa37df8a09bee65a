// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod discovery;
pub mod fetch_result;
pub mod keywords;
pub mod page;
pub mod platform;
