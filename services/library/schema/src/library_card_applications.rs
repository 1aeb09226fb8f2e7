use sea_orm::entity::prelude::*;

/// Library card application.
///
/// `card_number` is unique. `email_lower` holds the Unicode-lowercased email
/// and carries its own unique index, so duplicates are caught the same way on
/// every backend.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "library_card_applications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub father_name: Option<String>,
    pub dob: Option<chrono::NaiveDate>,
    #[sea_orm(column_name = "class")]
    pub class_name: String,
    pub field: Option<String>,
    pub roll_no: String,
    pub email: String,
    pub email_lower: String,
    pub phone: String,
    pub address_street: String,
    pub address_city: String,
    pub address_state: String,
    pub address_zip: String,
    pub status: String,
    #[sea_orm(unique)]
    pub card_number: String,
    pub student_id: String,
    pub issue_date: chrono::NaiveDate,
    pub valid_through: chrono::NaiveDate,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
