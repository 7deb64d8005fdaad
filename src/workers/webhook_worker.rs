// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::webhook::{WebhookEvent, WebhookStatus};
use crate::domain::repositories::webhook_event_repository::WebhookEventRepository;
use chrono::Utc;
use futures::StreamExt;
use hmac::{Hmac, Mac};
use metrics::{counter, histogram};
use rand::Rng;
use reqwest::{header, Client};
use sha2::Sha256;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

/// Webhook投递工作器
///
/// 轮询通知发件箱并投递待处理事件。投递失败按指数退避加
/// 抖动重试，超过重试预算后进入死信状态。通知投递与任务
/// 处理完全解耦，这里的任何失败都不会影响任务状态。
#[derive(Clone)]
pub struct WebhookWorker<R: WebhookEventRepository> {
    /// 发件箱仓库
    repo: Arc<R>,
    /// Webhook 签名密钥
    secret: String,
    /// HTTP客户端
    client: Client,
}

impl<R: WebhookEventRepository> WebhookWorker<R> {
    /// 创建新的Webhook工作器实例
    ///
    /// # 参数
    ///
    /// * `repo` - 发件箱仓库
    /// * `secret` - Webhook 签名密钥
    pub fn new(repo: Arc<R>, secret: String) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("Revsync-Webhook/0.1.0"),
        );
        Self {
            repo,
            secret,
            client: Client::builder()
                .default_headers(headers)
                .build()
                .expect("reqwest client with static headers"),
        }
    }

    /// 运行Webhook工作器
    ///
    /// 启动投递循环，定期处理待处理的Webhook事件
    pub async fn run(&self) {
        info!("Webhook worker started");
        loop {
            if let Err(e) = self.process_pending_webhooks().await {
                error!("Error processing webhooks: {}", e);
            }
            sleep(Duration::from_secs(5)).await;
        }
    }

    /// 处理待处理的Webhook事件
    pub async fn process_pending_webhooks(&self) -> anyhow::Result<()> {
        // Batch size
        let batch_size = 50;

        let events = self.repo.find_pending(batch_size).await?;

        if events.is_empty() {
            return Ok(());
        }

        info!("Processing {} pending webhooks", events.len());

        // Process in parallel with bounded concurrency
        let worker = self;
        futures::stream::iter(events)
            .for_each_concurrent(10, |event| {
                let w = worker;
                async move {
                    if let Err(e) = w.deliver_webhook(event).await {
                        error!("Failed to deliver webhook: {}", e);
                    }
                }
            })
            .await;

        Ok(())
    }

    async fn deliver_webhook(&self, mut event: WebhookEvent) -> anyhow::Result<()> {
        info!("Delivering webhook {} to {}", event.id, event.webhook_url);
        counter!("webhook_delivery_attempts_total").increment(1);

        let start = std::time::Instant::now();

        // Create signature
        let secret = self.secret.as_bytes();
        type HmacSha256 = Hmac<Sha256>;
        let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
        mac.update(event.payload.to_string().as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_hex = hex::encode(signature);

        let response = self
            .client
            .post(&event.webhook_url)
            .header("X-Revsync-Signature", signature_hex)
            .header("X-Revsync-Event", event.event_type.to_string())
            .json(&event.payload)
            .timeout(Duration::from_secs(10))
            .send()
            .await;

        let duration = start.elapsed();
        histogram!("webhook_delivery_duration_seconds").record(duration.as_secs_f64());

        match response {
            Ok(resp) => {
                // Record response status
                event.response_status = Some(resp.status().as_u16() as i32);

                if resp.status().is_success() {
                    event.status = WebhookStatus::Delivered;
                    event.delivered_at = Some(Utc::now());

                    info!("Webhook {} delivered successfully", event.id);
                    self.repo.update(&event).await?;
                    counter!("webhook_delivery_success_total").increment(1);
                } else {
                    error!(
                        "Webhook {} delivery failed with status: {}",
                        event.id,
                        resp.status()
                    );
                    self.handle_failure(event).await?;
                    counter!("webhook_delivery_failed_total", "reason" => "http_error")
                        .increment(1);
                }
            }
            Err(e) => {
                // Network or other error
                error!("Webhook {} delivery failed with error: {}", event.id, e);
                event.error_message = Some(e.to_string());
                self.handle_failure(event).await?;
                counter!("webhook_delivery_failed_total", "reason" => "network_error").increment(1);
            }
        }

        Ok(())
    }

    async fn handle_failure(&self, mut event: WebhookEvent) -> anyhow::Result<()> {
        let new_attempt_count = event.attempt_count + 1;

        if new_attempt_count >= event.max_retries {
            event.status = WebhookStatus::Dead; // Dead Letter Queue equivalent
            info!(
                "Webhook moved to dead letter state after {} retries",
                event.max_retries
            );
            counter!("webhook_dead_letter_total").increment(1);
        } else {
            event.status = WebhookStatus::Failed;
            event.attempt_count = new_attempt_count;

            // Exponential backoff with jitter
            let base_backoff = 2u64.pow(new_attempt_count as u32);
            let jitter = rand::rng().random_range(0..base_backoff / 2 + 1);
            let backoff = base_backoff + jitter;

            event.next_retry_at = Some(Utc::now() + chrono::Duration::seconds(backoff as i64));
        }

        event.updated_at = Utc::now();
        self.repo.update(&event).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::webhook::NotificationType;
    use crate::domain::repositories::job_repository::RepositoryError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use uuid::Uuid;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct MemoryOutbox {
        events: Mutex<Vec<WebhookEvent>>,
    }

    #[async_trait]
    impl WebhookEventRepository for MemoryOutbox {
        async fn create(&self, event: &WebhookEvent) -> Result<WebhookEvent, RepositoryError> {
            self.events.lock().unwrap().push(event.clone());
            Ok(event.clone())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<WebhookEvent>, RepositoryError> {
            Ok(self
                .events
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.id == id)
                .cloned())
        }

        async fn find_pending(&self, limit: u64) -> Result<Vec<WebhookEvent>, RepositoryError> {
            Ok(self
                .events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.status == WebhookStatus::Pending)
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn update(&self, event: &WebhookEvent) -> Result<WebhookEvent, RepositoryError> {
            let mut events = self.events.lock().unwrap();
            if let Some(existing) = events.iter_mut().find(|e| e.id == event.id) {
                *existing = event.clone();
            }
            Ok(event.clone())
        }
    }

    fn pending_event(webhook_url: String) -> WebhookEvent {
        WebhookEvent {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            operator_id: Uuid::new_v4(),
            event_type: NotificationType::Completed,
            payload: json!({ "event": "import.completed" }),
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
        }
    }

    #[tokio::test]
    async fn test_successful_delivery_marks_event_delivered() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let repo = Arc::new(MemoryOutbox::default());
        let event = pending_event(format!("{}/hook", server.uri()));
        let event_id = event.id;
        repo.create(&event).await.unwrap();

        let worker = WebhookWorker::new(repo.clone(), "secret".to_string());
        worker.process_pending_webhooks().await.unwrap();

        let stored = repo.find_by_id(event_id).await.unwrap().unwrap();
        assert_eq!(stored.status, WebhookStatus::Delivered);
        assert!(stored.delivered_at.is_some());
        assert_eq!(stored.response_status, Some(200));
    }

    #[tokio::test]
    async fn test_failed_delivery_schedules_retry_with_backoff() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let repo = Arc::new(MemoryOutbox::default());
        let event = pending_event(format!("{}/hook", server.uri()));
        let event_id = event.id;
        repo.create(&event).await.unwrap();

        let worker = WebhookWorker::new(repo.clone(), "secret".to_string());
        worker.process_pending_webhooks().await.unwrap();

        let stored = repo.find_by_id(event_id).await.unwrap().unwrap();
        assert_eq!(stored.status, WebhookStatus::Failed);
        assert_eq!(stored.attempt_count, 1);
        assert!(stored.next_retry_at.unwrap() > Utc::now());
    }

    #[tokio::test]
    async fn test_exhausted_retries_move_event_to_dead() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let repo = Arc::new(MemoryOutbox::default());
        let mut event = pending_event(format!("{}/hook", server.uri()));
        event.attempt_count = 4; // one attempt left of max_retries = 5
        let event_id = event.id;
        repo.create(&event).await.unwrap();

        let worker = WebhookWorker::new(repo.clone(), "secret".to_string());
        worker.process_pending_webhooks().await.unwrap();

        let stored = repo.find_by_id(event_id).await.unwrap().unwrap();
        assert_eq!(stored.status, WebhookStatus::Dead);
    }
}
