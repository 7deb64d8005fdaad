// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::Platform;
use crate::domain::models::review::{Review, MAX_AUTHOR_LEN, MAX_TEXT_LEN};
use chrono::DateTime;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// 转换错误类型
#[derive(Error, Debug)]
pub enum TransformError {
    /// 原始条目缺少可推导的外部标识符，无法构成自然键
    #[error("Raw item has no derivable external identifier")]
    MissingExternalId,
}

/// 每个规范化字段的别名表
///
/// 提供商对同一字段存在多种响应形态（如评分可能是嵌套对象、
/// 裸数字或"score"字段）。每个字段按固定优先级顺序取第一个
/// 存在的别名，保证跨响应形态的确定性行为。
/// 别名支持点号路径（如 "rating.value"）。
const EXTERNAL_ID_ALIASES: &[&str] = &["review_id", "id", "review_hash"];
const RATING_ALIASES: &[&str] = &["rating.value", "rating", "score"];
const AUTHOR_ALIASES: &[&str] = &["user_profile.name", "author", "user_name", "profile_name"];
const TEXT_ALIASES: &[&str] = &["review_text", "text", "snippet"];
const POSTED_AT_ALIASES: &[&str] = &["timestamp", "date_posted", "posted_at"];
const RESPONSE_TEXT_ALIASES: &[&str] = &["owner_answer.text", "response.text", "owner_answer"];
const RESPONSE_AT_ALIASES: &[&str] = &["owner_answer.timestamp", "response.timestamp"];
const REVIEW_URL_ALIASES: &[&str] = &["review_url", "url"];
const AVATAR_ALIASES: &[&str] = &["user_profile.image_url", "author_avatar", "profile_image_url"];
const HELPFUL_ALIASES: &[&str] = &["helpful_votes", "votes.helpful", "likes"];

/// 将一个原始提供商条目转换为规范化评论记录
///
/// # 返回值
///
/// * `Ok(Review)` - 转换后的记录，评分已钳制、文本已截断
/// * `Err(TransformError)` - 条目缺少外部标识符，应被丢弃
pub fn transform_item(
    operator_id: Uuid,
    source: Platform,
    item: &Value,
) -> Result<Review, TransformError> {
    let external_id =
        first_id(item, EXTERNAL_ID_ALIASES).ok_or(TransformError::MissingExternalId)?;

    let mut review = Review::new(operator_id, source, external_id);
    review.author = first_str(item, AUTHOR_ALIASES).map(|s| truncate(s, MAX_AUTHOR_LEN));
    review.rating = first_number(item, RATING_ALIASES).map(clamp_rating);
    review.text = first_str(item, TEXT_ALIASES).map(|s| truncate(s, MAX_TEXT_LEN));
    review.posted_at = first_timestamp(item, POSTED_AT_ALIASES);
    review.response_text = first_str(item, RESPONSE_TEXT_ALIASES).map(|s| truncate(s, MAX_TEXT_LEN));
    review.response_at = first_timestamp(item, RESPONSE_AT_ALIASES);
    review.review_url = first_str(item, REVIEW_URL_ALIASES).map(str::to_string);
    review.author_avatar_url = first_str(item, AVATAR_ALIASES).map(str::to_string);
    review.helpful_count = first_number(item, HELPFUL_ALIASES).map(|n| n as i32).unwrap_or(0);
    Ok(review)
}

/// 评分始终被钳制到[1,5]
fn clamp_rating(rating: f64) -> f64 {
    rating.clamp(1.0, 5.0)
}

/// 按字符边界安全截断
fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// 按点号路径在JSON中查找值
fn lookup<'a>(item: &'a Value, alias: &str) -> Option<&'a Value> {
    let mut current = item;
    for segment in alias.split('.') {
        current = current.get(segment)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// 按别名优先级取第一个存在的值
fn first_value<'a>(item: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|alias| lookup(item, alias))
}

fn first_str<'a>(item: &'a Value, aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .find_map(|alias| lookup(item, alias).and_then(Value::as_str))
}

fn first_number(item: &Value, aliases: &[&str]) -> Option<f64> {
    aliases
        .iter()
        .find_map(|alias| lookup(item, alias).and_then(Value::as_f64))
}

/// 标识符可能是字符串或数字，数字会被格式化为字符串
fn first_id(item: &Value, aliases: &[&str]) -> Option<String> {
    first_value(item, aliases).and_then(|v| match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn first_timestamp(
    item: &Value,
    aliases: &[&str],
) -> Option<chrono::DateTime<chrono::FixedOffset>> {
    first_str(item, aliases).and_then(|s| DateTime::parse_from_rfc3339(s).ok())
}
