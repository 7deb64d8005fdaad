// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 字段提取与转换
pub mod transform;

use crate::domain::models::job::ImportJob;
use crate::domain::models::webhook::NotificationType;
use crate::domain::repositories::job_repository::{JobRepository, RepositoryError};
use crate::domain::repositories::review_repository::ReviewRepository;
use crate::domain::services::notifier::Notifier;
use metrics::counter;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 任务提交完成时的进度百分比
pub const SUBMIT_PROGRESS: i32 = 10;

/// 导入阶段占用的进度窗口上界（其余留给收尾）
pub const IMPORT_PROGRESS_CEILING: i32 = 95;

/// 进度通知的里程碑粒度（导入完成率每跨过25%通知一次）
const MILESTONE_STEP: usize = 25;

/// 将导入完成率映射到保留的进度窗口
///
/// 任务提交占用前10%，导入占用其后的85%，收尾占用最后5%，
/// 保证进度跨越两次真实API调用时单调不回退
pub fn import_progress(processed: usize, total: usize) -> i32 {
    if total == 0 {
        return SUBMIT_PROGRESS;
    }
    let window = (IMPORT_PROGRESS_CEILING - SUBMIT_PROGRESS) as f64;
    let fraction = processed as f64 / total as f64;
    SUBMIT_PROGRESS + (fraction * window).round() as i32
}

/// 批量导入器
///
/// 将原始提供商条目转换为规范化评论记录，按固定大小分块
/// 幂等写入，并在每个持久化成功的分块之后推进任务进度。
/// 单个坏条目或单个失败分块都不会中止整次导入。
pub struct BatchImporter<R, J, N>
where
    R: ReviewRepository,
    J: JobRepository,
    N: Notifier,
{
    reviews: Arc<R>,
    jobs: Arc<J>,
    notifier: Arc<N>,
    chunk_size: usize,
}

impl<R, J, N> BatchImporter<R, J, N>
where
    R: ReviewRepository,
    J: JobRepository,
    N: Notifier,
{
    /// 创建新的批量导入器实例
    ///
    /// # 参数
    ///
    /// * `reviews` - 评论仓库
    /// * `jobs` - 任务仓库
    /// * `notifier` - 通知服务
    /// * `chunk_size` - 分块大小
    pub fn new(reviews: Arc<R>, jobs: Arc<J>, notifier: Arc<N>, chunk_size: usize) -> Self {
        Self {
            reviews,
            jobs,
            notifier,
            chunk_size: chunk_size.max(1),
        }
    }

    /// 导入一个任务的全部原始条目
    ///
    /// 分块流程：(a) 逐条转换，缺少外部标识符的条目被丢弃；
    /// (b) 以自然键幂等upsert整个分块；(c) 仅在分块持久化成功后
    /// 推进并保存imported_count/progress_percentage；(d) 分块写入
    /// 失败时记录日志并继续下一分块。
    ///
    /// # 返回值
    ///
    /// 返回本次运行累计成功写入的条目数
    pub async fn import_all(
        &self,
        job: &mut ImportJob,
        raw_items: Vec<Value>,
    ) -> Result<i32, RepositoryError> {
        let total = raw_items.len();
        if total == 0 {
            return Ok(0);
        }

        info!(job_id = %job.id, total, "Importing raw items in chunks of {}", self.chunk_size);

        // A resumed job replays the provider's full result set; the count
        // is rebuilt from this run's durable writes, not stacked on top of
        // the previously persisted value
        job.imported_count = 0;

        let mut processed = 0usize;
        let mut last_milestone = 0usize;

        for chunk in raw_items.chunks(self.chunk_size) {
            processed += chunk.len();

            let mut records = Vec::with_capacity(chunk.len());
            for item in chunk {
                match transform::transform_item(job.operator_id, job.platform, item) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        // A single malformed item never aborts the chunk
                        warn!(job_id = %job.id, "Dropping raw item: {}", e);
                        counter!("import_items_dropped_total").increment(1);
                    }
                }
            }

            if !records.is_empty() {
                if let Err(e) = self.reviews.upsert_batch(&records).await {
                    // Partial-failure semantics: the chunk is skipped, the
                    // import keeps going; the job's retry path can resume
                    error!(job_id = %job.id, "Chunk write failed, skipping chunk: {}", e);
                    counter!("import_chunks_failed_total").increment(1);
                    continue;
                }
                counter!("reviews_imported_total").increment(records.len() as u64);
                job.imported_count += records.len() as i32;
            }

            // Progress is persisted only after durably written data
            job.advance_progress(import_progress(processed, total));
            *job = self.jobs.update(job).await?;

            // Coarse-grained milestones keep notification volume independent
            // of the chunk count
            let milestone = (processed * 100 / total) / MILESTONE_STEP;
            if milestone > last_milestone {
                last_milestone = milestone;
                self.notifier
                    .notify(
                        job,
                        NotificationType::Progress,
                        &format!("Imported {} of {} reviews", job.imported_count, total),
                    )
                    .await;
            }
        }

        Ok(job.imported_count)
    }
}
