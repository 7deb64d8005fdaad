// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 导入任务模型
pub mod job;

/// 评论记录模型
pub mod review;

/// Webhook通知模型
pub mod webhook;
