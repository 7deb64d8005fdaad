// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ProviderSettings;
use crate::domain::models::job::Platform;
use crate::provider::types::{requested_depth, ResultPage, TaskEnvelope, TaskEntry};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// 提供商错误类型
///
/// TaskPending是预期内的可重试状态，不是失败；重试与退避
/// 完全由编排器负责，客户端内部从不重试
#[derive(Error, Debug)]
pub enum ProviderError {
    /// 外部任务仍在排队或处理中，属预期状态，在轮询上限内重试
    #[error("Provider task is still pending")]
    TaskPending,

    /// 提供商拒绝请求或任务终态失败（凭证、配额、目标格式错误）
    #[error("Provider error: {0}")]
    Rejected(String),

    /// 提供商的提交响应中没有任务ID
    #[error("Provider returned no task id")]
    MissingTaskId,

    /// 网络传输或响应解码错误
    #[error("Provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// 外部任务提供商特质
///
/// 封装外部异步任务API：提交任务、获取已完成任务的结果。
/// 无业务逻辑，无内部重试。
#[async_trait]
pub trait TaskProvider: Send + Sync {
    /// 提交一个新的外部任务
    ///
    /// # 参数
    ///
    /// * `platform` - 评论来源平台
    /// * `target_url` - 目标商家页面URL
    /// * `full_history` - 是否请求全量历史（影响有界的结果深度）
    ///
    /// # 返回值
    ///
    /// * `Ok(String)` - 提供商分配的任务ID
    /// * `Err(ProviderError)` - 提供商拒绝了请求
    async fn submit(
        &self,
        platform: Platform,
        target_url: &str,
        full_history: bool,
    ) -> Result<String, ProviderError>;

    /// 获取外部任务的结果页
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<ResultPage>)` - 解码后的结果页（可能为空）
    /// * `Err(ProviderError::TaskPending)` - 任务仍在排队/处理中
    /// * `Err(ProviderError)` - 任务终态失败
    async fn fetch(
        &self,
        task_id: &str,
        platform: Platform,
    ) -> Result<Vec<ResultPage>, ProviderError>;
}

/// 基于HTTP的提供商客户端实现
pub struct HttpTaskProvider {
    client: Client,
    base_url: String,
    login: String,
    password: String,
}

impl HttpTaskProvider {
    /// 根据配置创建新的客户端实例
    ///
    /// 单次请求超时为固定上界，取自配置
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            login: settings.login.clone(),
            password: settings.password.clone(),
        })
    }

    fn first_entry(envelope: TaskEnvelope) -> Result<TaskEntry, ProviderError> {
        envelope
            .tasks
            .and_then(|tasks| tasks.into_iter().next())
            .ok_or_else(|| ProviderError::Rejected("empty provider response".to_string()))
    }
}

#[async_trait]
impl TaskProvider for HttpTaskProvider {
    async fn submit(
        &self,
        platform: Platform,
        target_url: &str,
        full_history: bool,
    ) -> Result<String, ProviderError> {
        let depth = requested_depth(full_history);
        let url = format!("{}/reviews/{}/task_post", self.base_url, platform);
        debug!(%platform, depth, "Submitting provider task for {}", target_url);

        let envelope: TaskEnvelope = self
            .client
            .post(&url)
            .basic_auth(&self.login, Some(&self.password))
            .json(&json!([{ "url": target_url, "depth": depth }]))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let entry = Self::first_entry(envelope)?;
        if let Some("failed") = entry.status.as_deref() {
            return Err(ProviderError::Rejected(
                entry
                    .status_message
                    .unwrap_or_else(|| "task rejected".to_string()),
            ));
        }

        entry.id.ok_or(ProviderError::MissingTaskId)
    }

    async fn fetch(
        &self,
        task_id: &str,
        platform: Platform,
    ) -> Result<Vec<ResultPage>, ProviderError> {
        let url = format!("{}/reviews/{}/task_get/{}", self.base_url, platform, task_id);

        let envelope: TaskEnvelope = self
            .client
            .get(&url)
            .basic_auth(&self.login, Some(&self.password))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let entry = Self::first_entry(envelope)?;
        match entry.status.as_deref() {
            Some("queued") | Some("processing") => Err(ProviderError::TaskPending),
            Some("failed") => Err(ProviderError::Rejected(
                entry
                    .status_message
                    .unwrap_or_else(|| "task failed".to_string()),
            )),
            Some("ready") => Ok(entry.result.unwrap_or_default()),
            other => Err(ProviderError::Rejected(format!(
                "unexpected task status: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::types::{FULL_HISTORY_DEPTH, RECENT_DEPTH};
    use serde_json::Value;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> HttpTaskProvider {
        HttpTaskProvider::new(&ProviderSettings {
            base_url: server.uri(),
            login: "login".to_string(),
            password: "password".to_string(),
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    async fn submitted_depth(server: &MockServer) -> u64 {
        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        body[0]["depth"].as_u64().unwrap()
    }

    #[tokio::test]
    async fn test_submit_returns_task_id_and_bounds_depth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reviews/tripadvisor/task_post"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tasks": [{ "id": "task-42", "status": "queued" }]
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let task_id = provider
            .submit(Platform::Tripadvisor, "https://example.com/hotel", false)
            .await
            .unwrap();

        assert_eq!(task_id, "task-42");
        assert_eq!(submitted_depth(&server).await, RECENT_DEPTH as u64);
    }

    #[tokio::test]
    async fn test_submit_full_history_requests_full_depth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reviews/google/task_post"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tasks": [{ "id": "task-7", "status": "queued" }]
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        provider
            .submit(Platform::Google, "https://example.com/hotel", true)
            .await
            .unwrap();

        assert_eq!(submitted_depth(&server).await, FULL_HISTORY_DEPTH as u64);
    }

    #[tokio::test]
    async fn test_submit_without_task_id_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reviews/tripadvisor/task_post"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tasks": [{ "status": "queued" }]
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider
            .submit(Platform::Tripadvisor, "https://example.com/hotel", false)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingTaskId));
    }

    #[tokio::test]
    async fn test_fetch_pending_statuses_map_to_task_pending() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reviews/tripadvisor/task_get/t-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tasks": [{ "id": "t-1", "status": "processing" }]
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider
            .fetch("t-1", Platform::Tripadvisor)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::TaskPending));
    }

    #[tokio::test]
    async fn test_fetch_ready_returns_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reviews/google/task_get/t-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tasks": [{
                    "id": "t-2",
                    "status": "ready",
                    "result": [
                        { "items_count": 2, "items": [{ "review_id": "a" }, { "review_id": "b" }] },
                        { "items_count": 1, "items": [{ "review_id": "c" }] }
                    ]
                }]
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let pages = provider.fetch("t-2", Platform::Google).await.unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].items.as_ref().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failed_task_is_rejected_with_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reviews/tripadvisor/task_get/t-3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tasks": [{ "id": "t-3", "status": "failed", "status_message": "quota exhausted" }]
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider
            .fetch("t-3", Platform::Tripadvisor)
            .await
            .unwrap_err();
        match err {
            ProviderError::Rejected(msg) => assert_eq!(msg, "quota exhausted"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
