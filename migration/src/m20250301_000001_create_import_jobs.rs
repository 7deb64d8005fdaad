use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create import_jobs table
        manager
            .create_table(
                Table::create()
                    .table(ImportJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ImportJobs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ImportJobs::OperatorId).uuid().not_null())
                    .col(ColumnDef::new(ImportJobs::Platform).string().not_null())
                    .col(ColumnDef::new(ImportJobs::TargetUrl).string().not_null())
                    .col(
                        ColumnDef::new(ImportJobs::Status)
                            .string()
                            .not_null()
                            .default("queued"),
                    )
                    .col(ColumnDef::new(ImportJobs::Cursor).json())
                    .col(
                        ColumnDef::new(ImportJobs::ImportedCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ImportJobs::TotalAvailable)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ImportJobs::ProgressPercentage)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ImportJobs::Error).text())
                    .col(
                        ColumnDef::new(ImportJobs::FullHistory)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ImportJobs::WebhookUrl).string())
                    .col(ColumnDef::new(ImportJobs::StartedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(ImportJobs::CompletedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ImportJobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ImportJobs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Create indexes
        manager
            .create_index(
                Index::create()
                    .name("idx_import_jobs_status_started")
                    .table(ImportJobs::Table)
                    .col(ImportJobs::Status)
                    .col(ImportJobs::StartedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_import_jobs_operator")
                    .table(ImportJobs::Table)
                    .col(ImportJobs::OperatorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ImportJobs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ImportJobs {
    Table,
    Id,
    OperatorId,
    Platform,
    TargetUrl,
    Status,
    Cursor,
    ImportedCount,
    TotalAvailable,
    ProgressPercentage,
    Error,
    FullHistory,
    WebhookUrl,
    StartedAt,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}
