// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateJobRequestDto {
    pub operator_id: Uuid,
    /// 来源平台："tripadvisor" 或 "google"
    pub platform: String,
    #[validate(url)]
    pub target_url: String,
    /// 是否导入全量历史，默认只导入最近评论
    #[serde(default)]
    pub full_history: bool,
    #[validate(url)]
    pub webhook_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct JobQueryRequestDto {
    pub operator_id: Option<Uuid>,
    pub platform: Option<String>,
    pub status: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}
