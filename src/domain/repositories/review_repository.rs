// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::Platform;
use crate::domain::models::review::Review;
use crate::domain::repositories::job_repository::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 评论仓库特质
///
/// 写入以(operator_id, source, external_id)为冲突目标的幂等upsert，
/// 重复导入同一外部任务的结果不会产生重复记录也不会报错
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// 批量upsert一组评论记录
    ///
    /// # 返回值
    ///
    /// 返回写入的记录条数
    async fn upsert_batch(&self, reviews: &[Review]) -> Result<u64, RepositoryError>;

    /// 统计某运营方在某平台下的评论数量
    async fn count_for_operator(
        &self,
        operator_id: Uuid,
        source: Platform,
    ) -> Result<u64, RepositoryError>;
}
