// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Webhook事件实体
///
/// 表示一个待发送的任务生命周期通知，包含事件类型、
/// 负载数据、发送状态和重试机制等信息。作为发件箱记录持久化，
/// 由Webhook工作器异步投递。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// 事件唯一标识符
    pub id: Uuid,
    /// 关联的导入任务ID
    pub job_id: Uuid,
    /// 所属运营方ID
    pub operator_id: Uuid,
    /// 事件类型，决定通知的内容和格式
    pub event_type: NotificationType,
    /// 事件负载数据，包含具体的通知内容
    pub payload: serde_json::Value,
    /// Webhook回调URL，事件发送的目标地址
    pub webhook_url: String,
    /// 事件状态，跟踪事件的发送进度
    pub status: WebhookStatus,
    /// 已重试次数
    pub attempt_count: i32,
    /// 最大重试次数
    pub max_retries: i32,
    /// 响应状态码，最后一次发送的HTTP响应状态
    pub response_status: Option<i32>,
    /// 错误信息，发送失败时的错误描述
    pub error_message: Option<String>,
    /// 下次重试时间
    pub next_retry_at: Option<DateTime<Utc>>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
    /// 发送时间，事件成功发送的时间戳
    pub delivered_at: Option<DateTime<Utc>>,
}

/// 通知类型枚举
///
/// 任务生命周期事件，镜像任务的status/error状态面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// 任务已开始
    Started,
    /// 进度更新
    Progress,
    /// 任务成功完成
    Completed,
    /// 任务失败
    Failed,
    /// 任务已取消
    Cancelled,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationType::Started => write!(f, "import.started"),
            NotificationType::Progress => write!(f, "import.progress"),
            NotificationType::Completed => write!(f, "import.completed"),
            NotificationType::Failed => write!(f, "import.failed"),
            NotificationType::Cancelled => write!(f, "import.cancelled"),
        }
    }
}

impl FromStr for NotificationType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "import.started" => Ok(NotificationType::Started),
            "import.progress" => Ok(NotificationType::Progress),
            "import.completed" => Ok(NotificationType::Completed),
            "import.failed" => Ok(NotificationType::Failed),
            "import.cancelled" => Ok(NotificationType::Cancelled),
            _ => Err(()),
        }
    }
}

/// Webhook状态枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WebhookStatus {
    /// 待处理，事件已创建但尚未发送
    #[default]
    Pending,
    /// 已发送，事件已成功发送到目标URL
    Delivered,
    /// 发送失败，事件发送失败但仍在重试中
    Failed,
    /// 死信，事件发送失败且已达到最大重试次数
    Dead,
}

impl fmt::Display for WebhookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebhookStatus::Pending => write!(f, "pending"),
            WebhookStatus::Delivered => write!(f, "delivered"),
            WebhookStatus::Failed => write!(f, "failed"),
            WebhookStatus::Dead => write!(f, "dead"),
        }
    }
}

impl FromStr for WebhookStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(WebhookStatus::Pending),
            "delivered" => Ok(WebhookStatus::Delivered),
            "failed" => Ok(WebhookStatus::Failed),
            "dead" => Ok(WebhookStatus::Dead),
            _ => Err(()),
        }
    }
}
