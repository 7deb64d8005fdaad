use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create reviews table
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reviews::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reviews::OperatorId).uuid().not_null())
                    .col(ColumnDef::new(Reviews::Source).string().not_null())
                    .col(ColumnDef::new(Reviews::ExternalId).string().not_null())
                    .col(ColumnDef::new(Reviews::Author).string())
                    .col(ColumnDef::new(Reviews::Rating).double())
                    .col(ColumnDef::new(Reviews::Text).text())
                    .col(ColumnDef::new(Reviews::PostedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Reviews::ResponseText).text())
                    .col(ColumnDef::new(Reviews::ResponseAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Reviews::ReviewUrl).string())
                    .col(ColumnDef::new(Reviews::AuthorAvatarUrl).string())
                    .col(
                        ColumnDef::new(Reviews::HelpfulCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Reviews::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Reviews::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Natural key: re-importing the same provider results must upsert, never duplicate
        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_natural_key")
                    .table(Reviews::Table)
                    .col(Reviews::OperatorId)
                    .col(Reviews::Source)
                    .col(Reviews::ExternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_operator_posted")
                    .table(Reviews::Table)
                    .col(Reviews::OperatorId)
                    .col(Reviews::PostedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    OperatorId,
    Source,
    ExternalId,
    Author,
    Rating,
    Text,
    PostedAt,
    ResponseText,
    ResponseAt,
    ReviewUrl,
    AuthorAvatarUrl,
    HelpfulCount,
    CreatedAt,
    UpdatedAt,
}
