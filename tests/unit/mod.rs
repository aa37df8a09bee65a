// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod cache_test;
pub mod page_signals_test;
pub mod settings_test;
