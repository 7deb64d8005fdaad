// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::{ImportJob, JobStatus, Platform};
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
}

/// 任务查询参数
#[derive(Debug, Default, Clone)]
pub struct JobQueryParams {
    pub operator_id: Option<Uuid>,
    pub platform: Option<Platform>,
    pub statuses: Option<Vec<JobStatus>>,
    pub limit: u64,
    pub offset: u64,
}

/// 导入任务仓库特质
///
/// 定义任务数据访问接口；任务记录是唯一的状态真相来源，
/// 所有状态转换均为按ID的读-改-写
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// 创建新任务
    async fn create(&self, job: &ImportJob) -> Result<ImportJob, RepositoryError>;
    /// 根据ID查找任务
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ImportJob>, RepositoryError>;
    /// 更新任务
    async fn update(&self, job: &ImportJob) -> Result<ImportJob, RepositoryError>;
    /// 按启动时间升序列出可处理的任务（状态属于statuses，至多limit个）
    async fn list_eligible(
        &self,
        statuses: &[JobStatus],
        limit: u64,
    ) -> Result<Vec<ImportJob>, RepositoryError>;
    /// 任务列表查询
    async fn query_jobs(
        &self,
        params: JobQueryParams,
    ) -> Result<(Vec<ImportJob>, u64), RepositoryError>;
}
