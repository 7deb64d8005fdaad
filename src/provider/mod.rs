// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 提供商客户端
pub mod client;

/// 提供商响应类型
pub mod types;

pub use client::{HttpTaskProvider, ProviderError, TaskProvider};
pub use types::ResultPage;
