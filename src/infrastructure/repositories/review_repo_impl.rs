// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::Platform;
use crate::domain::models::review::Review;
use crate::domain::repositories::job_repository::RepositoryError;
use crate::domain::repositories::review_repository::ReviewRepository;
use crate::infrastructure::database::entities::review as review_entity;
use async_trait::async_trait;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 评论仓库实现
///
/// 基于SeaORM实现的评论数据访问层。写入以自然键
/// (operator_id, source, external_id)为冲突目标做upsert，
/// 冲突时刷新内容字段而不产生重复记录。
#[derive(Clone)]
pub struct ReviewRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl ReviewRepositoryImpl {
    /// 创建新的评论仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<review_entity::Model> for Review {
    fn from(model: review_entity::Model) -> Self {
        Self {
            id: model.id,
            operator_id: model.operator_id,
            source: model.source.parse().unwrap_or_default(),
            external_id: model.external_id,
            author: model.author,
            rating: model.rating,
            text: model.text,
            posted_at: model.posted_at,
            response_text: model.response_text,
            response_at: model.response_at,
            review_url: model.review_url,
            author_avatar_url: model.author_avatar_url,
            helpful_count: model.helpful_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Review> for review_entity::ActiveModel {
    fn from(review: Review) -> Self {
        Self {
            id: Set(review.id),
            operator_id: Set(review.operator_id),
            source: Set(review.source.to_string()),
            external_id: Set(review.external_id),
            author: Set(review.author),
            rating: Set(review.rating),
            text: Set(review.text),
            posted_at: Set(review.posted_at),
            response_text: Set(review.response_text),
            response_at: Set(review.response_at),
            review_url: Set(review.review_url),
            author_avatar_url: Set(review.author_avatar_url),
            helpful_count: Set(review.helpful_count),
            created_at: Set(review.created_at),
            updated_at: Set(review.updated_at),
        }
    }
}

#[async_trait]
impl ReviewRepository for ReviewRepositoryImpl {
    async fn upsert_batch(&self, reviews: &[Review]) -> Result<u64, RepositoryError> {
        if reviews.is_empty() {
            return Ok(0);
        }

        let models: Vec<review_entity::ActiveModel> =
            reviews.iter().cloned().map(Into::into).collect();
        let count = models.len() as u64;

        // 自然键冲突时刷新内容字段，保留原记录的id和created_at
        let on_conflict = OnConflict::columns([
            review_entity::Column::OperatorId,
            review_entity::Column::Source,
            review_entity::Column::ExternalId,
        ])
        .update_columns([
            review_entity::Column::Author,
            review_entity::Column::Rating,
            review_entity::Column::Text,
            review_entity::Column::PostedAt,
            review_entity::Column::ResponseText,
            review_entity::Column::ResponseAt,
            review_entity::Column::ReviewUrl,
            review_entity::Column::AuthorAvatarUrl,
            review_entity::Column::HelpfulCount,
            review_entity::Column::UpdatedAt,
        ])
        .to_owned();

        review_entity::Entity::insert_many(models)
            .on_conflict(on_conflict)
            .exec_without_returning(self.db.as_ref())
            .await?;

        Ok(count)
    }

    async fn count_for_operator(
        &self,
        operator_id: Uuid,
        source: Platform,
    ) -> Result<u64, RepositoryError> {
        let count = review_entity::Entity::find()
            .filter(review_entity::Column::OperatorId.eq(operator_id))
            .filter(review_entity::Column::Source.eq(source.to_string()))
            .count(self.db.as_ref())
            .await?;

        Ok(count)
    }
}
