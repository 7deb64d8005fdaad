// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 导入任务仓库接口
pub mod job_repository;

/// 评论仓库接口
pub mod review_repository;

/// Webhook事件仓库接口
pub mod webhook_event_repository;
