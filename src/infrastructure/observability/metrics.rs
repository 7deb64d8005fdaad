// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// 初始化指标系统
///
/// 配置并注册应用所需的各类监控指标
pub fn init_metrics() {
    let builder = PrometheusBuilder::new();
    builder
        .install()
        .expect("failed to install Prometheus recorder");

    // Register metrics
    describe_counter!(
        "import_tasks_submitted_total",
        "Total number of provider tasks submitted"
    );
    describe_counter!(
        "import_poll_attempts_total",
        "Total number of provider result polls"
    );
    describe_counter!(
        "import_jobs_succeeded_total",
        "Total number of import jobs that completed successfully"
    );
    describe_counter!(
        "import_jobs_failed_total",
        "Total number of import jobs that failed"
    );
    describe_counter!(
        "reviews_imported_total",
        "Total number of review records upserted"
    );
    describe_counter!(
        "import_items_dropped_total",
        "Total number of raw review items dropped during extraction"
    );
    describe_counter!(
        "import_chunks_failed_total",
        "Total number of review chunks that failed to persist"
    );

    // Webhook delivery metrics
    describe_counter!(
        "webhook_delivery_attempts_total",
        "Total number of webhook delivery attempts"
    );
    describe_counter!(
        "webhook_delivery_success_total",
        "Total number of webhooks delivered successfully"
    );
    describe_counter!(
        "webhook_delivery_failed_total",
        "Total number of failed webhook deliveries"
    );
    describe_counter!(
        "webhook_dead_letter_total",
        "Total number of webhooks moved to the dead letter state"
    );
    describe_histogram!(
        "webhook_delivery_duration_seconds",
        "Duration of webhook delivery requests in seconds"
    );
}
