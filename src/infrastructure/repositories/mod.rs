// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod job_repo_impl;
pub mod review_repo_impl;
pub mod webhook_event_repo_impl;

pub use job_repo_impl::JobRepositoryImpl;
pub use review_repo_impl::ReviewRepositoryImpl;
pub use webhook_event_repo_impl::WebhookEventRepoImpl;
