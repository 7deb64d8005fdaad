// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::notifier::OutboxNotifier;
use crate::infrastructure::repositories::{JobRepositoryImpl, WebhookEventRepoImpl};
use crate::presentation::handlers::job_handler;
use axum::{
    routing::{get, post},
    Router,
};

/// 创建应用路由
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes() -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let job_routes = Router::new()
        .route(
            "/v1/jobs",
            post(job_handler::create_job::<JobRepositoryImpl>)
                .get(job_handler::list_jobs::<JobRepositoryImpl>),
        )
        .route(
            "/v1/jobs/{id}",
            get(job_handler::get_job::<JobRepositoryImpl>),
        )
        .route(
            "/v1/jobs/{id}/retry",
            post(job_handler::retry_job::<JobRepositoryImpl>),
        )
        .route(
            "/v1/jobs/{id}/cancel",
            post(
                job_handler::cancel_job::<
                    JobRepositoryImpl,
                    OutboxNotifier<WebhookEventRepoImpl>,
                >,
            ),
        );

    Router::new().merge(public_routes).merge(job_routes)
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
