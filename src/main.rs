// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::Extension;
use revsync::config::settings::Settings;
use revsync::domain::services::notifier::OutboxNotifier;
use revsync::infrastructure::database::connection;
use revsync::infrastructure::observability::metrics;
use revsync::infrastructure::repositories::{
    JobRepositoryImpl, ReviewRepositoryImpl, WebhookEventRepoImpl,
};
use revsync::presentation::routes;
use revsync::provider::HttpTaskProvider;
use revsync::utils::telemetry;
use revsync::workers::import_worker::ImportWorker;
use revsync::workers::webhook_worker::WebhookWorker;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use migration::{Migrator, MigratorTrait};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting revsync...");

    // Initialize Prometheus Metrics
    metrics::init_metrics();

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // 3. Connect to database
    let db = connection::create_pool(&settings.database).await?;
    let db = Arc::new(db);
    info!("Database connection established");

    // Run database migrations
    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. Initialize Components
    let job_repo = Arc::new(JobRepositoryImpl::new(db.clone()));
    let review_repo = Arc::new(ReviewRepositoryImpl::new(db.clone()));
    let webhook_event_repo = Arc::new(WebhookEventRepoImpl::new(db.clone()));

    let provider = Arc::new(HttpTaskProvider::new(&settings.provider)?);
    let notifier = Arc::new(OutboxNotifier::new(webhook_event_repo.clone()));

    // 5. Start Workers
    let import_worker = ImportWorker::new(
        provider,
        job_repo.clone(),
        review_repo.clone(),
        notifier.clone(),
        settings.importer.clone(),
    );
    tokio::spawn(async move {
        import_worker.run().await;
    });

    let webhook_worker = WebhookWorker::new(
        webhook_event_repo.clone(),
        settings.webhook.secret.clone(),
    );
    tokio::spawn(async move {
        webhook_worker.run().await;
    });

    // 6. Start HTTP server
    let app = routes::routes()
        .layer(Extension(job_repo))
        .layer(Extension(review_repo))
        .layer(Extension(webhook_event_repo))
        .layer(Extension(notifier))
        .layer(Extension(settings.clone()))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
