// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ImporterSettings;
use crate::domain::models::job::{ImportJob, JobStatus};
use crate::domain::models::webhook::NotificationType;
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::review_repository::ReviewRepository;
use crate::domain::services::notifier::Notifier;
use crate::importer::{BatchImporter, SUBMIT_PROGRESS};
use crate::provider::{ProviderError, TaskProvider};
use anyhow::{anyhow, Result};
use metrics::counter;
use serde_json::Value;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// 单个任务在一次扫描中的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    /// 任务ID
    pub job_id: Uuid,
    /// 处理后的任务状态
    pub status: JobStatus,
}

/// 导入任务编排工作器
///
/// 拥有任务状态机：恢复或创建外部任务，驱动有界重试的轮询
/// 循环，调用批量导入器，并以成功/失败收尾任务、发出进度与
/// 完成事件。一次扫描内任务串行处理，单个任务的失败被隔离，
/// 不会中断扫描。
pub struct ImportWorker<P, J, R, N>
where
    P: TaskProvider,
    J: JobRepository,
    R: ReviewRepository,
    N: Notifier,
{
    provider: Arc<P>,
    jobs: Arc<J>,
    importer: BatchImporter<R, J, N>,
    notifier: Arc<N>,
    settings: ImporterSettings,
}

impl<P, J, R, N> ImportWorker<P, J, R, N>
where
    P: TaskProvider,
    J: JobRepository,
    R: ReviewRepository,
    N: Notifier,
{
    /// 创建新的导入工作器实例
    ///
    /// # 参数
    ///
    /// * `provider` - 外部任务提供商客户端
    /// * `jobs` - 任务仓库
    /// * `reviews` - 评论仓库
    /// * `notifier` - 通知服务
    /// * `settings` - 导入器配置（显式配置对象，非进程级状态）
    pub fn new(
        provider: Arc<P>,
        jobs: Arc<J>,
        reviews: Arc<R>,
        notifier: Arc<N>,
        settings: ImporterSettings,
    ) -> Self {
        let importer = BatchImporter::new(
            reviews,
            jobs.clone(),
            notifier.clone(),
            settings.chunk_size,
        );
        Self {
            provider,
            jobs,
            importer,
            notifier,
            settings,
        }
    }

    /// 运行工作器
    ///
    /// 以固定间隔执行扫描，直到进程退出
    pub async fn run(&self) {
        info!("Import worker started");
        loop {
            self.sweep().await;
            sleep(self.settings.sweep_interval()).await;
        }
    }

    /// 执行一次扫描
    ///
    /// 按启动时间顺序最多选取max_jobs_per_sweep个可处理任务，
    /// 串行处理（确定性地限制并发的外部任务负载）；每个任务的
    /// 结果独立收集，一个任务的失败不会阻止后续任务
    pub async fn sweep(&self) -> Vec<SweepOutcome> {
        let eligible = match self
            .jobs
            .list_eligible(
                &[JobStatus::Running, JobStatus::Processing],
                self.settings.max_jobs_per_sweep,
            )
            .await
        {
            Ok(jobs) => jobs,
            Err(e) => {
                error!("Failed to list eligible jobs: {}", e);
                return Vec::new();
            }
        };

        if eligible.is_empty() {
            return Vec::new();
        }

        info!("Sweep picked up {} eligible jobs", eligible.len());

        let mut outcomes = Vec::with_capacity(eligible.len());
        for job in eligible {
            let job_id = job.id;
            let status = match self.process_job(job).await {
                Ok(status) => status,
                Err(e) => {
                    // Isolation: the error is recorded on this job only and
                    // the sweep moves on to the next one
                    error!(job_id = %job_id, "Job processing failed: {}", e);
                    self.mark_failed(job_id, &e.to_string()).await
                }
            };
            outcomes.push(SweepOutcome { job_id, status });
        }
        outcomes
    }

    /// 驱动单个任务直到本次扫描内的决策点
    #[instrument(skip(self, job), fields(job_id = %job.id, platform = %job.platform))]
    async fn process_job(&self, mut job: ImportJob) -> Result<JobStatus> {
        // 1. No live external task yet: submit one and persist the cursor
        if job.task_id().is_none() {
            let task_id = match self
                .provider
                .submit(job.platform, &job.target_url, job.full_history)
                .await
            {
                Ok(id) => id,
                Err(e) => return self.finalize_failure(job, e.to_string()).await,
            };

            job = job.begin_processing(task_id)?;
            job.advance_progress(SUBMIT_PROGRESS);
            job = self.jobs.update(&job).await?;
            counter!("import_tasks_submitted_total").increment(1);
            self.notifier
                .notify(&job, NotificationType::Started, "External task submitted")
                .await;

            // A freshly submitted task is guaranteed pending; wait before
            // the first poll
            sleep(self.settings.submit_delay()).await;
        }

        // Cancellation checkpoint: a cancel issued while this job was idle
        // or sleeping is observed here, never mid-call
        match self.jobs.find_by_id(job.id).await? {
            Some(current) if current.status == JobStatus::Cancelled => {
                info!(job_id = %job.id, "Job was cancelled, skipping");
                return Ok(JobStatus::Cancelled);
            }
            Some(current) => job = current,
            None => return Err(anyhow!("job disappeared from the store")),
        }

        let task_id = job
            .task_id()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("processing job has no cursor"))?;

        // 2. Poll until the provider reports the task ready, bounded by
        // max_poll_attempts; pending never changes the job's status
        let mut attempts: u32 = 0;
        let pages = loop {
            match self.provider.fetch(&task_id, job.platform).await {
                Ok(pages) => break pages,
                Err(ProviderError::TaskPending) => {
                    attempts += 1;
                    counter!("import_poll_attempts_total").increment(1);
                    if attempts >= self.settings.max_poll_attempts {
                        let message = format!(
                            "Timed out waiting for provider task after {} poll attempts",
                            attempts
                        );
                        return self.finalize_failure(job, message).await;
                    }
                    sleep(self.settings.poll_interval()).await;
                }
                Err(e) => return self.finalize_failure(job, e.to_string()).await,
            }
        };

        let raw_items: Vec<Value> = pages.into_iter().flat_map(|p| p.into_items()).collect();
        job.total_available = raw_items.len() as i32;

        // 3. Nothing to import is still a success
        if raw_items.is_empty() {
            return self.finalize_success(job, 0).await;
        }
        job = self.jobs.update(&job).await?;

        // 4. Hand the raw results to the batch importer
        let imported = self.importer.import_all(&mut job, raw_items).await?;
        self.finalize_success(job, imported).await
    }

    async fn finalize_success(&self, job: ImportJob, imported: i32) -> Result<JobStatus> {
        let job = job.succeed(imported)?;
        let job = self.jobs.update(&job).await?;
        counter!("import_jobs_succeeded_total").increment(1);
        info!(job_id = %job.id, imported, "Import job succeeded");
        self.notifier
            .notify(
                &job,
                NotificationType::Completed,
                &format!("Imported {} reviews", imported),
            )
            .await;
        Ok(JobStatus::Succeeded)
    }

    async fn finalize_failure(&self, job: ImportJob, message: String) -> Result<JobStatus> {
        let job = job.fail(message.clone())?;
        let job = self.jobs.update(&job).await?;
        counter!("import_jobs_failed_total").increment(1);
        warn!(job_id = %job.id, "Import job failed: {}", message);
        self.notifier
            .notify(&job, NotificationType::Failed, &message)
            .await;
        Ok(JobStatus::Failed)
    }

    /// 尽力将任务标记为失败（用于process_job自身出错的隔离路径）
    async fn mark_failed(&self, job_id: Uuid, message: &str) -> JobStatus {
        match self.jobs.find_by_id(job_id).await {
            Ok(Some(job)) if !job.status.is_terminal() => {
                match job.fail(message) {
                    Ok(failed) => {
                        if let Err(e) = self.jobs.update(&failed).await {
                            error!(job_id = %job_id, "Failed to persist failure: {}", e);
                        }
                        counter!("import_jobs_failed_total").increment(1);
                        self.notifier
                            .notify(&failed, NotificationType::Failed, message)
                            .await;
                    }
                    Err(e) => error!(job_id = %job_id, "Cannot mark job failed: {}", e),
                }
                JobStatus::Failed
            }
            Ok(Some(job)) => job.status,
            Ok(None) => JobStatus::Failed,
            Err(e) => {
                error!(job_id = %job_id, "Failed to load job while failing it: {}", e);
                JobStatus::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::job::{ImportJob, Platform};
    use crate::domain::models::review::Review;
    use crate::domain::repositories::job_repository::{JobQueryParams, RepositoryError};
    use crate::provider::types::ResultPage;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    type FetchResult = Result<Vec<ResultPage>, ProviderError>;

    /// 脚本化的提供商：按顺序弹出预置结果，空时默认pending
    #[derive(Default)]
    struct ScriptedProvider {
        submit_results: Mutex<VecDeque<Result<String, ProviderError>>>,
        fetch_results: Mutex<HashMap<String, VecDeque<FetchResult>>>,
        submit_calls: AtomicUsize,
        fetch_calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn on_submit(&self, result: Result<String, ProviderError>) {
            self.submit_results.lock().unwrap().push_back(result);
        }

        fn on_fetch(&self, task_id: &str, result: FetchResult) {
            self.fetch_results
                .lock()
                .unwrap()
                .entry(task_id.to_string())
                .or_default()
                .push_back(result);
        }
    }

    #[async_trait]
    impl TaskProvider for ScriptedProvider {
        async fn submit(
            &self,
            _platform: Platform,
            _target_url: &str,
            _full_history: bool,
        ) -> Result<String, ProviderError> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            self.submit_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ProviderError::MissingTaskId))
        }

        async fn fetch(
            &self,
            task_id: &str,
            _platform: Platform,
        ) -> Result<Vec<ResultPage>, ProviderError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            self.fetch_results
                .lock()
                .unwrap()
                .get_mut(task_id)
                .and_then(VecDeque::pop_front)
                .unwrap_or(Err(ProviderError::TaskPending))
        }
    }

    /// 内存任务仓库，记录每次update时的(状态,进度)轨迹
    #[derive(Default)]
    struct MemoryJobRepository {
        store: Mutex<HashMap<Uuid, ImportJob>>,
        trail: Mutex<Vec<(JobStatus, i32)>>,
    }

    impl MemoryJobRepository {
        fn insert(&self, job: ImportJob) {
            self.store.lock().unwrap().insert(job.id, job);
        }

        fn get(&self, id: Uuid) -> ImportJob {
            self.store.lock().unwrap().get(&id).unwrap().clone()
        }
    }

    #[async_trait]
    impl JobRepository for MemoryJobRepository {
        async fn create(&self, job: &ImportJob) -> Result<ImportJob, RepositoryError> {
            self.insert(job.clone());
            Ok(job.clone())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<ImportJob>, RepositoryError> {
            Ok(self.store.lock().unwrap().get(&id).cloned())
        }

        async fn update(&self, job: &ImportJob) -> Result<ImportJob, RepositoryError> {
            self.trail
                .lock()
                .unwrap()
                .push((job.status, job.progress_percentage));
            self.insert(job.clone());
            Ok(job.clone())
        }

        async fn list_eligible(
            &self,
            statuses: &[JobStatus],
            limit: u64,
        ) -> Result<Vec<ImportJob>, RepositoryError> {
            let store = self.store.lock().unwrap();
            let mut jobs: Vec<ImportJob> = store
                .values()
                .filter(|j| statuses.contains(&j.status))
                .cloned()
                .collect();
            jobs.sort_by_key(|j| j.started_at);
            jobs.truncate(limit as usize);
            Ok(jobs)
        }

        async fn query_jobs(
            &self,
            _params: JobQueryParams,
        ) -> Result<(Vec<ImportJob>, u64), RepositoryError> {
            Ok((Vec::new(), 0))
        }
    }

    #[derive(Default)]
    struct MemoryReviewRepository {
        store: Mutex<HashMap<(Uuid, String, String), Review>>,
    }

    #[async_trait]
    impl ReviewRepository for MemoryReviewRepository {
        async fn upsert_batch(&self, reviews: &[Review]) -> Result<u64, RepositoryError> {
            let mut store = self.store.lock().unwrap();
            for review in reviews {
                store.insert(
                    (
                        review.operator_id,
                        review.source.to_string(),
                        review.external_id.clone(),
                    ),
                    review.clone(),
                );
            }
            Ok(reviews.len() as u64)
        }

        async fn count_for_operator(
            &self,
            operator_id: Uuid,
            source: Platform,
        ) -> Result<u64, RepositoryError> {
            Ok(self
                .store
                .lock()
                .unwrap()
                .keys()
                .filter(|(op, src, _)| *op == operator_id && *src == source.to_string())
                .count() as u64)
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<(Uuid, NotificationType, String)>>,
    }

    impl RecordingNotifier {
        fn kinds_for(&self, job_id: Uuid) -> Vec<NotificationType> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|(id, _, _)| *id == job_id)
                .map(|(_, kind, _)| *kind)
                .collect()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, job: &ImportJob, kind: NotificationType, message: &str) {
            self.events
                .lock()
                .unwrap()
                .push((job.id, kind, message.to_string()));
        }
    }

    struct Harness {
        provider: Arc<ScriptedProvider>,
        jobs: Arc<MemoryJobRepository>,
        reviews: Arc<MemoryReviewRepository>,
        notifier: Arc<RecordingNotifier>,
        worker: ImportWorker<
            ScriptedProvider,
            MemoryJobRepository,
            MemoryReviewRepository,
            RecordingNotifier,
        >,
    }

    fn test_settings() -> ImporterSettings {
        ImporterSettings {
            chunk_size: 50,
            max_jobs_per_sweep: 5,
            poll_interval_secs: 30,
            max_poll_attempts: 3,
            submit_delay_secs: 10,
            sweep_interval_secs: 15,
        }
    }

    fn harness(settings: ImporterSettings) -> Harness {
        let provider = Arc::new(ScriptedProvider::default());
        let jobs = Arc::new(MemoryJobRepository::default());
        let reviews = Arc::new(MemoryReviewRepository::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let worker = ImportWorker::new(
            provider.clone(),
            jobs.clone(),
            reviews.clone(),
            notifier.clone(),
            settings,
        );
        Harness {
            provider,
            jobs,
            reviews,
            notifier,
            worker,
        }
    }

    fn running_job() -> ImportJob {
        ImportJob::new(
            Uuid::new_v4(),
            Platform::Tripadvisor,
            "https://example.com/hotel".to_string(),
            true,
        )
        .start()
        .unwrap()
    }

    fn page(items: Vec<Value>) -> ResultPage {
        serde_json::from_value(json!({ "items_count": items.len(), "items": items }))
            .unwrap()
    }

    fn items(prefix: &str, count: usize) -> Vec<Value> {
        (0..count)
            .map(|i| json!({ "review_id": format!("{prefix}-{i}"), "rating": 5 }))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_import_drops_unidentifiable_items() {
        let h = harness(test_settings());
        let job = running_job();
        h.jobs.insert(job.clone());

        h.provider.on_submit(Ok("task-1".to_string()));
        let mut second_page = items("b", 124);
        for _ in 0..5 {
            second_page.push(json!({ "rating": 2, "text": "anonymous" }));
        }
        h.provider.on_fetch(
            "task-1",
            Ok(vec![page(items("a", 121)), page(second_page)]),
        );

        let outcomes = h.worker.sweep().await;
        assert_eq!(outcomes, vec![SweepOutcome { job_id: job.id, status: JobStatus::Succeeded }]);

        let done = h.jobs.get(job.id);
        assert_eq!(done.status, JobStatus::Succeeded);
        assert_eq!(done.imported_count, 245);
        assert_eq!(done.total_available, 250);
        assert_eq!(done.progress_percentage, 100);
        assert_eq!(
            h.reviews
                .count_for_operator(job.operator_id, job.platform)
                .await
                .unwrap(),
            245
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_keeps_job_in_processing() {
        let h = harness(test_settings());
        let job = running_job();
        h.jobs.insert(job.clone());

        h.provider.on_submit(Ok("task-1".to_string()));
        h.provider.on_fetch("task-1", Err(ProviderError::TaskPending));
        h.provider.on_fetch("task-1", Err(ProviderError::TaskPending));
        h.provider.on_fetch("task-1", Ok(vec![]));

        let outcomes = h.worker.sweep().await;
        assert_eq!(outcomes[0].status, JobStatus::Succeeded);

        // Between submit and the terminal write the job never left Processing
        let trail = h.jobs.trail.lock().unwrap();
        let intermediate: Vec<JobStatus> = trail[..trail.len() - 1]
            .iter()
            .map(|(status, _)| *status)
            .collect();
        assert!(intermediate.iter().all(|s| *s == JobStatus::Processing));
        assert_eq!(h.jobs.get(job.id).imported_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_bound_exceeded_fails_with_timeout_message() {
        let h = harness(test_settings());
        let job = running_job();
        h.jobs.insert(job.clone());

        h.provider.on_submit(Ok("task-1".to_string()));
        // No fetch scripted: the provider stays pending forever

        let outcomes = h.worker.sweep().await;
        assert_eq!(outcomes[0].status, JobStatus::Failed);

        let failed = h.jobs.get(job.id);
        assert_eq!(failed.status, JobStatus::Failed);
        assert!(failed.error.unwrap().contains("Timed out"));
        assert_eq!(h.provider.fetch_calls.load(Ordering::SeqCst), 3);
        assert!(h
            .notifier
            .kinds_for(job.id)
            .contains(&NotificationType::Failed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_rejection_fails_without_polling() {
        let h = harness(test_settings());
        let job = running_job();
        h.jobs.insert(job.clone());

        h.provider
            .on_submit(Err(ProviderError::Rejected("bad credentials".to_string())));

        let outcomes = h.worker.sweep().await;
        assert_eq!(outcomes[0].status, JobStatus::Failed);

        let failed = h.jobs.get(job.id);
        assert!(failed.error.unwrap().contains("bad credentials"));
        assert_eq!(h.provider.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_task_id_fails_without_polling() {
        let h = harness(test_settings());
        let job = running_job();
        h.jobs.insert(job.clone());

        h.provider.on_submit(Err(ProviderError::MissingTaskId));

        let outcomes = h.worker.sweep().await;
        assert_eq!(outcomes[0].status, JobStatus::Failed);
        assert_eq!(h.provider.fetch_calls.load(Ordering::SeqCst), 0);
        assert!(h.jobs.get(job.id).error.unwrap().contains("no task id"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_items_succeeds_with_zero_count() {
        let h = harness(test_settings());
        let job = running_job();
        h.jobs.insert(job.clone());

        h.provider.on_submit(Ok("task-1".to_string()));
        h.provider.on_fetch("task-1", Ok(vec![]));

        h.worker.sweep().await;

        let done = h.jobs.get(job.id);
        assert_eq!(done.status, JobStatus::Succeeded);
        assert_eq!(done.imported_count, 0);
        assert_eq!(done.progress_percentage, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_isolates_failing_job() {
        let h = harness(test_settings());

        let mut ids = Vec::new();
        for i in 0..3 {
            let job = running_job();
            ids.push(job.id);
            h.jobs.insert(job);
            let task_id = format!("task-{i}");
            h.provider.on_submit(Ok(task_id.clone()));
            if i == 1 {
                h.provider.on_fetch(
                    &task_id,
                    Err(ProviderError::Rejected("task exploded".to_string())),
                );
            } else {
                h.provider.on_fetch(&task_id, Ok(vec![page(items(&task_id, 3))]));
            }
        }

        let outcomes = h.worker.sweep().await;
        assert_eq!(outcomes.len(), 3);

        let by_id: HashMap<Uuid, JobStatus> =
            outcomes.iter().map(|o| (o.job_id, o.status)).collect();
        // Submission order is not the sweep order, so look jobs up by id
        let statuses: Vec<JobStatus> = ids.iter().map(|id| h.jobs.get(*id).status).collect();
        assert_eq!(
            statuses.iter().filter(|s| **s == JobStatus::Succeeded).count(),
            2
        );
        assert_eq!(
            statuses.iter().filter(|s| **s == JobStatus::Failed).count(),
            1
        );
        assert_eq!(by_id.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_clears_cursor_and_resubmits() {
        let h = harness(test_settings());
        let job = running_job();
        let job_id = job.id;
        h.jobs.insert(job);

        h.provider.on_submit(Ok("stale-task".to_string()));
        h.provider.on_fetch(
            "stale-task",
            Err(ProviderError::Rejected("terminal failure".to_string())),
        );
        h.worker.sweep().await;
        assert_eq!(h.jobs.get(job_id).status, JobStatus::Failed);

        // Explicit retry resets the job; the next pickup must submit a
        // fresh task instead of reusing the stale id
        let retried = h.jobs.get(job_id).retry().unwrap();
        assert!(retried.cursor.is_none());
        h.jobs.insert(retried);

        h.provider.on_submit(Ok("fresh-task".to_string()));
        h.provider
            .on_fetch("fresh-task", Ok(vec![page(items("fresh", 2))]));
        h.worker.sweep().await;

        let done = h.jobs.get(job_id);
        assert_eq!(done.status, JobStatus::Succeeded);
        assert_eq!(done.imported_count, 2);
        assert_eq!(done.task_id(), Some("fresh-task"));
        assert_eq!(h.provider.submit_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_job_is_observed_at_checkpoint() {
        let h = harness(test_settings());
        let job = running_job();
        let job_id = job.id;
        // Already processing with a live task, then cancelled externally
        let job = job.begin_processing("task-1".to_string()).unwrap();
        let cancelled = job.cancel().unwrap();
        h.jobs.insert(cancelled);

        // A cancelled job is terminal and no longer eligible
        let outcomes = h.worker.sweep().await;
        assert!(outcomes.is_empty());
        assert_eq!(h.jobs.get(job_id).status, JobStatus::Cancelled);
        assert_eq!(h.provider.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resumes_existing_task_without_resubmitting() {
        let h = harness(test_settings());
        let job = running_job()
            .begin_processing("resumed-task".to_string())
            .unwrap();
        let job_id = job.id;
        h.jobs.insert(job);

        h.provider
            .on_fetch("resumed-task", Ok(vec![page(items("r", 4))]));

        h.worker.sweep().await;

        assert_eq!(h.provider.submit_calls.load(Ordering::SeqCst), 0);
        let done = h.jobs.get(job_id);
        assert_eq!(done.status, JobStatus::Succeeded);
        assert_eq!(done.imported_count, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resumed_job_count_matches_written_rows() {
        let h = harness(test_settings());
        // Crashed mid-run: the cursor and a partial count were persisted
        let mut job = running_job()
            .begin_processing("resumed-task".to_string())
            .unwrap();
        job.imported_count = 100;
        job.advance_progress(50);
        let job_id = job.id;
        h.jobs.insert(job);

        // Fetching the same task replays the full result set
        h.provider
            .on_fetch("resumed-task", Ok(vec![page(items("r", 250))]));

        h.worker.sweep().await;

        let done = h.jobs.get(job_id);
        assert_eq!(done.status, JobStatus::Succeeded);
        assert_eq!(done.total_available, 250);
        // The replayed items upsert into the same rows; the terminal count
        // must match the written rows, not prior + replay
        assert_eq!(done.imported_count, 250);
        assert_eq!(
            h.reviews
                .count_for_operator(done.operator_id, done.platform)
                .await
                .unwrap(),
            250
        );
    }
}
