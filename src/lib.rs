// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含请求/响应数据传输对象
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体、服务和仓库接口
pub mod domain;

/// 导入模块
///
/// 将提供商原始结果转换并批量写入规范化评论记录
pub mod importer;

/// 基础设施模块
///
/// 提供外部服务集成，如数据库、指标等
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由、处理器和错误映射
pub mod presentation;

/// 提供商模块
///
/// 封装外部异步任务API（提交任务、轮询状态、获取结果）
pub mod provider;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 实现后台任务处理：导入任务编排与Webhook投递
pub mod workers;
