// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 导入任务编排工作器
pub mod import_worker;

/// Webhook投递工作器
pub mod webhook_worker;
