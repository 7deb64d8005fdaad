// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::Platform;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 作者名称最大长度
pub const MAX_AUTHOR_LEN: usize = 255;

/// 评论文本最大长度
pub const MAX_TEXT_LEN: usize = 8192;

/// 规范化评论记录
///
/// 批量导入的写入目标。自然键为(operator_id, source, external_id)，
/// 由存储层的upsert保证唯一性；核心逻辑从不删除评论记录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// 记录唯一标识符
    pub id: Uuid,
    /// 所属运营方ID
    pub operator_id: Uuid,
    /// 来源平台
    pub source: Platform,
    /// 提供商侧的评论标识符
    pub external_id: String,
    /// 作者名称，截断到最大长度
    pub author: Option<String>,
    /// 评分，始终被钳制到[1,5]
    pub rating: Option<f64>,
    /// 评论文本，截断到最大长度
    pub text: Option<String>,
    /// 发布时间
    pub posted_at: Option<DateTime<FixedOffset>>,
    /// 商家回复文本
    pub response_text: Option<String>,
    /// 商家回复时间
    pub response_at: Option<DateTime<FixedOffset>>,
    /// 评论原始链接
    pub review_url: Option<String>,
    /// 作者头像链接
    pub author_avatar_url: Option<String>,
    /// 有用票数，缺失时默认为0
    pub helpful_count: i32,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

impl Review {
    /// 创建一条新的评论记录
    pub fn new(operator_id: Uuid, source: Platform, external_id: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            operator_id,
            source,
            external_id,
            author: None,
            rating: None,
            text: None,
            posted_at: None,
            response_text: None,
            response_at: None,
            review_url: None,
            author_avatar_url: None,
            helpful_count: 0,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }
}
