use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BookBorrows::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BookBorrows::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BookBorrows::UserId).string().not_null())
                    .col(ColumnDef::new(BookBorrows::BookTitle).string().not_null())
                    .col(ColumnDef::new(BookBorrows::Isbn).string().not_null())
                    .col(
                        ColumnDef::new(BookBorrows::BorrowDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BookBorrows::DueDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(BookBorrows::ReturnDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(BookBorrows::Status)
                            .string()
                            .not_null()
                            .default("borrowed"),
                    )
                    .col(
                        ColumnDef::new(BookBorrows::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(BookBorrows::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(BookBorrows::Table)
                    .col(BookBorrows::UserId)
                    .name("idx_book_borrows_user_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BookBorrows::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BookBorrows {
    Table,
    Id,
    UserId,
    BookTitle,
    Isbn,
    BorrowDate,
    DueDate,
    ReturnDate,
    Status,
    CreatedAt,
    UpdatedAt,
}
