// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    application::dto::{
        job_request::{CreateJobRequestDto, JobQueryRequestDto},
        job_response::{JobListResponseDto, JobResponseDto},
    },
    domain::models::job::{DomainError, ImportJob, JobStatus, Platform, CANCELLED_MESSAGE},
    domain::models::webhook::NotificationType,
    domain::repositories::job_repository::{JobQueryParams, JobRepository, RepositoryError},
    domain::services::notifier::Notifier,
    presentation::errors::AppError,
};

/// 创建新的导入任务
///
/// 任务创建后立即进入Running状态，由后台工作器拾取执行
pub async fn create_job<J>(
    Extension(job_repo): Extension<Arc<J>>,
    Json(payload): Json<CreateJobRequestDto>,
) -> Result<impl IntoResponse, AppError>
where
    J: JobRepository + 'static,
{
    if let Err(e) = payload.validate() {
        return Err(DomainError::ValidationError(e.to_string()).into());
    }

    let platform: Platform = payload
        .platform
        .parse()
        .map_err(|_| DomainError::ValidationError(format!("invalid platform: {}", payload.platform)))?;

    let mut job = ImportJob::new(
        payload.operator_id,
        platform,
        payload.target_url,
        payload.full_history,
    );
    job.webhook_url = payload.webhook_url;

    job_repo.create(&job).await?;
    let job = job.start()?;
    let job = job_repo.update(&job).await?;

    Ok((StatusCode::CREATED, Json(JobResponseDto::from(job))))
}

/// 获取导入任务详情
pub async fn get_job<J>(
    Extension(job_repo): Extension<Arc<J>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    J: JobRepository + 'static,
{
    let job = job_repo
        .find_by_id(job_id)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    Ok(Json(JobResponseDto::from(job)))
}

/// 任务列表查询
pub async fn list_jobs<J>(
    Extension(job_repo): Extension<Arc<J>>,
    Query(query): Query<JobQueryRequestDto>,
) -> Result<impl IntoResponse, AppError>
where
    J: JobRepository + 'static,
{
    let platform = match query.platform.as_deref() {
        Some(s) => Some(s.parse::<Platform>().map_err(|_| {
            DomainError::ValidationError(format!("invalid platform: {}", s))
        })?),
        None => None,
    };

    let statuses = match query.status.as_deref() {
        Some(s) => {
            let status = s.parse::<JobStatus>().map_err(|_| {
                DomainError::ValidationError(format!("invalid status: {}", s))
            })?;
            Some(vec![status])
        }
        None => None,
    };

    let params = JobQueryParams {
        operator_id: query.operator_id,
        platform,
        statuses,
        limit: query.limit.unwrap_or(50).min(200),
        offset: query.offset.unwrap_or(0),
    };

    let (jobs, total) = job_repo.query_jobs(params).await?;

    Ok(Json(JobListResponseDto {
        jobs: jobs.into_iter().map(JobResponseDto::from).collect(),
        total,
    }))
}

/// 重试失败的任务
///
/// 仅允许Failed状态的任务重试；清除cursor/error/计数后
/// 任务回到Running，等待下一次扫描拾取
pub async fn retry_job<J>(
    Extension(job_repo): Extension<Arc<J>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    J: JobRepository + 'static,
{
    let job = job_repo
        .find_by_id(job_id)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    let job = job.retry()?;
    let job = job_repo.update(&job).await?;

    Ok(Json(JobResponseDto::from(job)))
}

/// 取消进行中的任务
///
/// 仅允许从Running/Processing取消；已提交的外部任务
/// 会被放弃（提供商不提供取消操作）
pub async fn cancel_job<J, N>(
    Extension(job_repo): Extension<Arc<J>>,
    Extension(notifier): Extension<Arc<N>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    J: JobRepository + 'static,
    N: Notifier + 'static,
{
    let job = job_repo
        .find_by_id(job_id)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    let job = job.cancel()?;
    let job = job_repo.update(&job).await?;

    notifier
        .notify(&job, NotificationType::Cancelled, CANCELLED_MESSAGE)
        .await;

    Ok(Json(JobResponseDto::from(job)))
}
