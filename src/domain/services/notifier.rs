// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::ImportJob;
use crate::domain::models::webhook::{NotificationType, WebhookEvent, WebhookStatus};
use crate::domain::repositories::webhook_event_repository::WebhookEventRepository;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

/// 通知服务特质
///
/// 向外部观察者发送任务生命周期事件。投递是尽力而为的：
/// 通知失败在服务内部消化，绝不中断任务处理，因此该方法
/// 不返回Result
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 发送一条生命周期通知
    ///
    /// # 参数
    ///
    /// * `job` - 关联的导入任务
    /// * `kind` - 事件类型
    /// * `message` - 人类可读的事件描述
    async fn notify(&self, job: &ImportJob, kind: NotificationType, message: &str);
}

/// 基于发件箱的通知服务实现
///
/// 将事件写入webhook_events表，由Webhook工作器异步投递。
/// 没有配置webhook_url的任务跳过通知。
pub struct OutboxNotifier<R: WebhookEventRepository> {
    repo: Arc<R>,
}

impl<R: WebhookEventRepository> OutboxNotifier<R> {
    /// 创建新的通知服务实例
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl<R: WebhookEventRepository> Notifier for OutboxNotifier<R> {
    async fn notify(&self, job: &ImportJob, kind: NotificationType, message: &str) {
        let Some(webhook_url) = job.webhook_url.clone() else {
            debug!(job_id = %job.id, "No webhook configured, skipping {} notification", kind);
            return;
        };

        let payload = json!({
            "job_id": job.id,
            "operator_id": job.operator_id,
            "platform": job.platform.to_string(),
            "event": kind.to_string(),
            "status": job.status.to_string(),
            "message": message,
            "imported_count": job.imported_count,
            "total_available": job.total_available,
            "progress_percentage": job.progress_percentage,
            "timestamp": Utc::now(),
        });

        let event = WebhookEvent {
            id: Uuid::new_v4(),
            job_id: job.id,
            operator_id: job.operator_id,
            event_type: kind,
            payload,
            webhook_url,
            status: WebhookStatus::Pending,
            attempt_count: 0,
            max_retries: 5,
            response_status: None,
            error_message: None,
            next_retry_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            delivered_at: None,
        };

        // Notification failures must never reach the job pipeline
        if let Err(e) = self.repo.create(&event).await {
            error!(job_id = %job.id, "Failed to enqueue {} notification: {}", kind, e);
        }
    }
}
