// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// 取消任务时写入的固定错误信息
pub const CANCELLED_MESSAGE: &str = "Import cancelled by operator";

/// 导入任务实体
///
/// 表示一次第三方评论导入请求及其完整生命周期状态。
/// 任务通过外部异步任务API获取数据，cursor字段持有已提交
/// 外部任务的恢复令牌，保证任何时刻至多关联一个存活的外部任务。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportJob {
    /// 任务唯一标识符
    pub id: Uuid,
    /// 所属运营方ID，评论的归属主体
    pub operator_id: Uuid,
    /// 评论来源平台，创建后不可变
    pub platform: Platform,
    /// 目标URL，要导入评论的商家页面
    pub target_url: String,
    /// 任务状态，跟踪任务在其生命周期中的当前阶段
    pub status: JobStatus,
    /// 恢复令牌，持有已提交的外部任务ID及其创建时间
    pub cursor: Option<JobCursor>,
    /// 已导入数量，单次运行内单调不减
    pub imported_count: i32,
    /// 提供商报告的可用总量
    pub total_available: i32,
    /// 进度百分比，取值[0,100]，仅显式重试时归零
    pub progress_percentage: i32,
    /// 最近一次失败信息，重试时清除
    pub error: Option<String>,
    /// 是否导入全量历史，创建后固定，影响请求深度
    pub full_history: bool,
    /// 回调Webhook地址，接收生命周期通知（可选）
    pub webhook_url: Option<String>,
    /// 开始执行时间
    pub started_at: Option<DateTime<FixedOffset>>,
    /// 完成时间，仅在进入终态时设置
    pub completed_at: Option<DateTime<FixedOffset>>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

/// 恢复令牌
///
/// 持有已提交外部任务的标识符与创建时间，是任务崩溃后
/// 唯一可用于恢复的持久化状态。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCursor {
    /// 外部任务标识符
    pub task_id: String,
    /// 外部任务创建时间
    pub task_created_at: DateTime<Utc>,
}

/// 评论来源平台枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// TripAdvisor评论
    #[default]
    Tripadvisor,
    /// Google评论
    Google,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Platform::Tripadvisor => write!(f, "tripadvisor"),
            Platform::Google => write!(f, "google"),
        }
    }
}

impl FromStr for Platform {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tripadvisor" => Ok(Platform::Tripadvisor),
            "google" => Ok(Platform::Google),
            _ => Err(()),
        }
    }
}

/// 任务状态枚举
///
/// 状态转换遵循以下流程：
/// Queued → Running → Processing → Succeeded/Failed；
/// Running/Processing → Cancelled；Failed →（显式重试）→ Running。
/// Succeeded 和 Cancelled 为终态，无出边。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// 已入队，任务已创建但尚未开始执行
    #[default]
    Queued,
    /// 运行中，任务等待提交外部任务
    Running,
    /// 处理中，外部任务已提交，正在轮询或导入
    Processing,
    /// 已成功，导入完成
    Succeeded,
    /// 已失败，可通过显式重试恢复
    Failed,
    /// 已取消
    Cancelled,
}

impl JobStatus {
    /// 判断是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Succeeded => write!(f, "succeeded"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "running" => Ok(JobStatus::Running),
            "processing" => Ok(JobStatus::Processing),
            "succeeded" => Ok(JobStatus::Succeeded),
            "failed" => Ok(JobStatus::Failed),
            "cancelled" => Ok(JobStatus::Cancelled),
            _ => Err(()),
        }
    }
}

/// 领域错误类型
#[derive(Error, Debug)]
pub enum DomainError {
    /// 无效的状态转换，当任务状态转换不符合业务规则时发生
    #[error("Invalid state transition")]
    InvalidStateTransition,

    /// 验证错误，当输入数据不符合领域规则时发生
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl ImportJob {
    /// 创建一个新的导入任务
    ///
    /// # 参数
    ///
    /// * `operator_id` - 所属运营方ID
    /// * `platform` - 评论来源平台
    /// * `target_url` - 目标URL
    /// * `full_history` - 是否导入全量历史
    ///
    /// # 返回值
    ///
    /// 返回新创建的任务实例，初始状态为Queued
    pub fn new(operator_id: Uuid, platform: Platform, target_url: String, full_history: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            operator_id,
            platform,
            target_url,
            status: JobStatus::Queued,
            cursor: None,
            imported_count: 0,
            total_available: 0,
            progress_percentage: 0,
            error: None,
            full_history,
            webhook_url: None,
            started_at: None,
            completed_at: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    /// 启动任务
    ///
    /// 将任务状态从Queued变更为Running
    pub fn start(mut self) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Queued => {
                self.status = JobStatus::Running;
                self.started_at = Some(Utc::now().into());
                self.updated_at = Utc::now().into();
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 记录外部任务提交，进入Processing
    ///
    /// cursor持有唯一的外部任务标识，保证一个任务任何时刻
    /// 至多关联一个存活的外部任务
    pub fn begin_processing(mut self, task_id: String) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Running | JobStatus::Processing => {
                self.cursor = Some(JobCursor {
                    task_id,
                    task_created_at: Utc::now(),
                });
                self.status = JobStatus::Processing;
                self.updated_at = Utc::now().into();
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 完成任务
    ///
    /// 将任务状态变更为Succeeded，进度固定为100
    pub fn succeed(mut self, imported_count: i32) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Running | JobStatus::Processing => {
                self.status = JobStatus::Succeeded;
                self.imported_count = imported_count;
                self.progress_percentage = 100;
                self.completed_at = Some(Utc::now().into());
                self.updated_at = Utc::now().into();
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 标记任务失败
    pub fn fail(mut self, message: impl Into<String>) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Running | JobStatus::Processing => {
                self.status = JobStatus::Failed;
                self.error = Some(message.into());
                self.completed_at = Some(Utc::now().into());
                self.updated_at = Utc::now().into();
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 取消任务
    ///
    /// 仅允许从Running/Processing取消；不尝试取消已提交的
    /// 外部任务（提供商不提供该操作）
    pub fn cancel(mut self) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Running | JobStatus::Processing => {
                self.status = JobStatus::Cancelled;
                self.error = Some(CANCELLED_MESSAGE.to_string());
                self.completed_at = Some(Utc::now().into());
                self.updated_at = Utc::now().into();
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 重试失败的任务
    ///
    /// 清除cursor/error/计数并回到Running，下次拾取时会重新
    /// 提交外部任务，保证不会混用新旧任务的结果
    pub fn retry(mut self) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Failed => {
                self.status = JobStatus::Running;
                self.cursor = None;
                self.error = None;
                self.imported_count = 0;
                self.total_available = 0;
                self.progress_percentage = 0;
                self.completed_at = None;
                self.started_at = Some(Utc::now().into());
                self.updated_at = Utc::now().into();
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 推进进度百分比
    ///
    /// 单次运行内进度单调不减，回退值会被忽略
    pub fn advance_progress(&mut self, percentage: i32) {
        let clamped = percentage.clamp(0, 100);
        if clamped > self.progress_percentage {
            self.progress_percentage = clamped;
            self.updated_at = Utc::now().into();
        }
    }

    /// 外部任务标识（若已提交）
    pub fn task_id(&self) -> Option<&str> {
        self.cursor.as_ref().map(|c| c.task_id.as_str())
    }
}
