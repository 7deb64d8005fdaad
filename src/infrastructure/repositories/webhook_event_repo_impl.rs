// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::webhook::WebhookEvent;
use crate::domain::repositories::job_repository::RepositoryError;
use crate::domain::repositories::webhook_event_repository::WebhookEventRepository;
use crate::infrastructure::database::entities::webhook_event;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// Webhook事件仓库实现
#[derive(Clone)]
pub struct WebhookEventRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl WebhookEventRepoImpl {
    /// 创建新的Webhook事件仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<webhook_event::Model> for WebhookEvent {
    fn from(model: webhook_event::Model) -> Self {
        Self {
            id: model.id,
            job_id: model.job_id,
            operator_id: model.operator_id,
            event_type: model.event_type.parse().unwrap_or(
                crate::domain::models::webhook::NotificationType::Progress,
            ),
            payload: model.payload,
            webhook_url: model.webhook_url,
            status: model.status.parse().unwrap_or_default(),
            attempt_count: model.attempt_count,
            max_retries: model.max_retries,
            response_status: model.response_status,
            error_message: model.error_message,
            next_retry_at: model.next_retry_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
            delivered_at: model.delivered_at,
        }
    }
}

impl From<WebhookEvent> for webhook_event::ActiveModel {
    fn from(event: WebhookEvent) -> Self {
        Self {
            id: Set(event.id),
            job_id: Set(event.job_id),
            operator_id: Set(event.operator_id),
            event_type: Set(event.event_type.to_string()),
            payload: Set(event.payload),
            webhook_url: Set(event.webhook_url),
            status: Set(event.status.to_string()),
            attempt_count: Set(event.attempt_count),
            max_retries: Set(event.max_retries),
            response_status: Set(event.response_status),
            error_message: Set(event.error_message),
            next_retry_at: Set(event.next_retry_at),
            created_at: Set(event.created_at),
            updated_at: Set(event.updated_at),
            delivered_at: Set(event.delivered_at),
        }
    }
}

#[async_trait]
impl WebhookEventRepository for WebhookEventRepoImpl {
    async fn create(&self, event: &WebhookEvent) -> Result<WebhookEvent, RepositoryError> {
        let model: webhook_event::ActiveModel = event.clone().into();

        model.insert(self.db.as_ref()).await?;
        Ok(event.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<WebhookEvent>, RepositoryError> {
        let model = webhook_event::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_pending(&self, limit: u64) -> Result<Vec<WebhookEvent>, RepositoryError> {
        let now = Utc::now();

        let models = webhook_event::Entity::find()
            .filter(
                Condition::any()
                    .add(webhook_event::Column::Status.eq("pending"))
                    .add(
                        Condition::all()
                            .add(webhook_event::Column::Status.eq("failed"))
                            .add(webhook_event::Column::NextRetryAt.lte(now)),
                    ),
            )
            .order_by_asc(webhook_event::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, event: &WebhookEvent) -> Result<WebhookEvent, RepositoryError> {
        let mut active: webhook_event::ActiveModel = webhook_event::Entity::find_by_id(event.id)
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)?
            .into();

        active.status = Set(event.status.to_string());
        active.attempt_count = Set(event.attempt_count);
        active.response_status = Set(event.response_status);
        active.error_message = Set(event.error_message.clone());
        active.next_retry_at = Set(event.next_retry_at);
        active.updated_at = Set(event.updated_at);
        active.delivered_at = Set(event.delivered_at);

        let updated_model = active.update(self.db.as_ref()).await?;

        Ok(updated_model.into())
    }
}
