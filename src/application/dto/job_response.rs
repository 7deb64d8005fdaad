// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::ImportJob;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct JobResponseDto {
    pub id: Uuid,
    pub operator_id: Uuid,
    pub platform: String,
    pub target_url: String,
    pub status: String,
    pub imported_count: i32,
    pub total_available: i32,
    pub progress_percentage: i32,
    pub error: Option<String>,
    pub full_history: bool,
    pub webhook_url: Option<String>,
    pub started_at: Option<DateTime<FixedOffset>>,
    pub completed_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<ImportJob> for JobResponseDto {
    fn from(job: ImportJob) -> Self {
        Self {
            id: job.id,
            operator_id: job.operator_id,
            platform: job.platform.to_string(),
            target_url: job.target_url,
            status: job.status.to_string(),
            imported_count: job.imported_count,
            total_available: job.total_available,
            progress_percentage: job.progress_percentage,
            error: job.error,
            full_history: job.full_history,
            webhook_url: job.webhook_url,
            started_at: job.started_at,
            completed_at: job.completed_at,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobListResponseDto {
    pub jobs: Vec<JobResponseDto>,
    pub total: u64,
}
