// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::{ImportJob, JobCursor, JobStatus};
use crate::domain::repositories::job_repository::{
    JobQueryParams, JobRepository, RepositoryError,
};
use crate::infrastructure::database::entities::import_job as job_entity;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 导入任务仓库实现
///
/// 基于SeaORM实现的任务数据访问层
#[derive(Clone)]
pub struct JobRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl JobRepositoryImpl {
    /// 创建新的任务仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<job_entity::Model> for ImportJob {
    fn from(model: job_entity::Model) -> Self {
        Self {
            id: model.id,
            operator_id: model.operator_id,
            platform: model.platform.parse().unwrap_or_default(),
            target_url: model.target_url,
            status: model.status.parse().unwrap_or_default(),
            cursor: model
                .cursor
                .and_then(|v| serde_json::from_value::<JobCursor>(v).ok()),
            imported_count: model.imported_count,
            total_available: model.total_available,
            progress_percentage: model.progress_percentage,
            error: model.error,
            full_history: model.full_history,
            webhook_url: model.webhook_url,
            started_at: model.started_at,
            completed_at: model.completed_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<ImportJob> for job_entity::ActiveModel {
    fn from(job: ImportJob) -> Self {
        Self {
            id: Set(job.id),
            operator_id: Set(job.operator_id),
            platform: Set(job.platform.to_string()),
            target_url: Set(job.target_url),
            status: Set(job.status.to_string()),
            cursor: Set(job
                .cursor
                .as_ref()
                .and_then(|c| serde_json::to_value(c).ok())),
            imported_count: Set(job.imported_count),
            total_available: Set(job.total_available),
            progress_percentage: Set(job.progress_percentage),
            error: Set(job.error),
            full_history: Set(job.full_history),
            webhook_url: Set(job.webhook_url),
            started_at: Set(job.started_at),
            completed_at: Set(job.completed_at),
            created_at: Set(job.created_at),
            updated_at: Set(job.updated_at),
        }
    }
}

#[async_trait]
impl JobRepository for JobRepositoryImpl {
    async fn create(&self, job: &ImportJob) -> Result<ImportJob, RepositoryError> {
        let model: job_entity::ActiveModel = job.clone().into();

        model.insert(self.db.as_ref()).await?;
        Ok(job.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ImportJob>, RepositoryError> {
        let model = job_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn update(&self, job: &ImportJob) -> Result<ImportJob, RepositoryError> {
        let model: job_entity::ActiveModel = job.clone().into();

        let updated_model = model.update(self.db.as_ref()).await?;
        Ok(updated_model.into())
    }

    async fn list_eligible(
        &self,
        statuses: &[JobStatus],
        limit: u64,
    ) -> Result<Vec<ImportJob>, RepositoryError> {
        let status_strings: Vec<String> = statuses.iter().map(|s| s.to_string()).collect();

        let models = job_entity::Entity::find()
            .filter(job_entity::Column::Status.is_in(status_strings))
            .order_by_asc(job_entity::Column::StartedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(ImportJob::from).collect())
    }

    async fn query_jobs(
        &self,
        params: JobQueryParams,
    ) -> Result<(Vec<ImportJob>, u64), RepositoryError> {
        let mut query = job_entity::Entity::find();

        if let Some(operator_id) = params.operator_id {
            query = query.filter(job_entity::Column::OperatorId.eq(operator_id));
        }

        if let Some(platform) = params.platform {
            query = query.filter(job_entity::Column::Platform.eq(platform.to_string()));
        }

        if let Some(statuses) = &params.statuses {
            let status_strings: Vec<String> = statuses.iter().map(|s| s.to_string()).collect();
            query = query.filter(job_entity::Column::Status.is_in(status_strings));
        }

        let total = query.clone().count(self.db.as_ref()).await?;

        let models = query
            .order_by_desc(job_entity::Column::CreatedAt)
            .offset(params.offset)
            .limit(params.limit)
            .all(self.db.as_ref())
            .await?;

        Ok((models.into_iter().map(ImportJob::from).collect(), total))
    }
}
