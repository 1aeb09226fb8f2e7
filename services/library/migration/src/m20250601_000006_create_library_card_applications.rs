use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Applications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Applications::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Applications::UserId).string())
                    .col(ColumnDef::new(Applications::FirstName).string().not_null())
                    .col(ColumnDef::new(Applications::LastName).string().not_null())
                    .col(ColumnDef::new(Applications::FatherName).string())
                    .col(ColumnDef::new(Applications::Dob).date())
                    .col(ColumnDef::new(Applications::ClassName).string().not_null())
                    .col(ColumnDef::new(Applications::Field).string())
                    .col(ColumnDef::new(Applications::RollNo).string().not_null())
                    .col(ColumnDef::new(Applications::Email).string().not_null())
                    .col(ColumnDef::new(Applications::EmailLower).string().not_null())
                    .col(ColumnDef::new(Applications::Phone).string().not_null())
                    .col(ColumnDef::new(Applications::AddressStreet).string().not_null())
                    .col(ColumnDef::new(Applications::AddressCity).string().not_null())
                    .col(ColumnDef::new(Applications::AddressState).string().not_null())
                    .col(ColumnDef::new(Applications::AddressZip).string().not_null())
                    .col(
                        ColumnDef::new(Applications::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Applications::CardNumber).string().not_null())
                    .col(ColumnDef::new(Applications::StudentId).string().not_null())
                    .col(ColumnDef::new(Applications::IssueDate).date().not_null())
                    .col(ColumnDef::new(Applications::ValidThrough).date().not_null())
                    .col(
                        ColumnDef::new(Applications::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Applications::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Applications::Table)
                    .col(Applications::CardNumber)
                    .unique()
                    .name("idx_library_card_applications_card_number")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Applications::Table)
                    .col(Applications::UserId)
                    .name("idx_library_card_applications_user_id")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Applications::Table)
                    .col(Applications::EmailLower)
                    .unique()
                    .name("idx_library_card_applications_email_lower")
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Applications::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Applications {
    #[iden = "library_card_applications"]
    Table,
    Id,
    UserId,
    FirstName,
    LastName,
    FatherName,
    Dob,
    #[iden = "class"]
    ClassName,
    Field,
    RollNo,
    Email,
    EmailLower,
    Phone,
    AddressStreet,
    AddressCity,
    AddressState,
    AddressZip,
    Status,
    CardNumber,
    StudentId,
    IssueDate,
    ValidThrough,
    CreatedAt,
    UpdatedAt,
}
