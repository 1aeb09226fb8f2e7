use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RareBooks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RareBooks::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(RareBooks::Title).string().not_null())
                    .col(ColumnDef::new(RareBooks::Description).text().not_null())
                    .col(
                        ColumnDef::new(RareBooks::Category)
                            .string()
                            .not_null()
                            .default("General"),
                    )
                    .col(ColumnDef::new(RareBooks::PdfPath).string().not_null())
                    .col(
                        ColumnDef::new(RareBooks::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(RareBooks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(RareBooks::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RareBooks::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RareBooks {
    Table,
    Id,
    Title,
    Description,
    Category,
    PdfPath,
    Status,
    CreatedAt,
    UpdatedAt,
}
