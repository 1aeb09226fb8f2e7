use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Donations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Donations::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Donations::DonorName).string().not_null())
                    .col(ColumnDef::new(Donations::Email).string())
                    .col(ColumnDef::new(Donations::BookTitle).string().not_null())
                    .col(ColumnDef::new(Donations::Author).string())
                    .col(
                        ColumnDef::new(Donations::Quantity)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Donations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Donations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Donations {
    Table,
    Id,
    DonorName,
    Email,
    BookTitle,
    Author,
    Quantity,
    CreatedAt,
}
