// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Deserialize;
use serde_json::Value;

/// full_history=true 时请求的最大结果深度
pub const FULL_HISTORY_DEPTH: u32 = 4490;

/// full_history=false 时请求的最大结果深度
pub const RECENT_DEPTH: u32 = 100;

/// 根据full_history计算向提供商请求的结果深度
///
/// 深度始终有界，以遵守提供商的配额限制
pub fn requested_depth(full_history: bool) -> u32 {
    if full_history {
        FULL_HISTORY_DEPTH
    } else {
        RECENT_DEPTH
    }
}

/// 一页原始结果
///
/// 外部任务就绪后返回的有序结果页，items为提供商原始JSON条目
#[derive(Debug, Clone, Deserialize)]
pub struct ResultPage {
    /// 本页条目数
    pub items_count: Option<i64>,
    /// 原始评论条目
    pub items: Option<Vec<Value>>,
}

impl ResultPage {
    /// 取出本页条目，缺失时为空
    pub fn into_items(self) -> Vec<Value> {
        self.items.unwrap_or_default()
    }
}

/// 提供商响应信封
#[derive(Debug, Deserialize)]
pub(crate) struct TaskEnvelope {
    pub tasks: Option<Vec<TaskEntry>>,
}

/// 信封中的单个任务条目
#[derive(Debug, Deserialize)]
pub(crate) struct TaskEntry {
    pub id: Option<String>,
    pub status: Option<String>,
    pub status_message: Option<String>,
    pub result: Option<Vec<ResultPage>>,
}
