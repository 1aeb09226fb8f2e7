use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use gcmn_domain::role::AppRole;
use gcmn_domain::status::{ApplicationStatus, BorrowStatus, PublishStatus, UserKind};

/// Current time at millisecond precision, the resolution every backend keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

// Records are serialized with camelCase names; the document store persists them
// in exactly this shape.

/// Registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub student_class: Option<String>,
    #[serde(rename = "type")]
    pub kind: UserKind,
    #[serde(serialize_with = "gcmn_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub student_class: Option<String>,
    pub kind: UserKind,
}

/// One-to-one extension of [`User`], created on first write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub student_class: Option<String>,
    #[serde(serialize_with = "gcmn_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "gcmn_core::serde::to_rfc3339_ms_opt"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Shallow merge applied to a profile; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub student_class: Option<String>,
}

impl ProfilePatch {
    pub fn apply(self, profile: &mut Profile) {
        if let Some(v) = self.full_name {
            profile.full_name = v;
        }
        if let Some(v) = self.phone {
            profile.phone = Some(v);
        }
        if let Some(v) = self.roll_number {
            profile.roll_number = Some(v);
        }
        if let Some(v) = self.department {
            profile.department = Some(v);
        }
        if let Some(v) = self.student_class {
            profile.student_class = Some(v);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    pub id: String,
    pub user_id: String,
    pub role: AppRole,
    #[serde(serialize_with = "gcmn_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub is_seen: bool,
    #[serde(serialize_with = "gcmn_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "gcmn_core::serde::to_rfc3339_ms_opt"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookBorrow {
    pub id: String,
    pub user_id: String,
    pub book_title: String,
    pub isbn: String,
    #[serde(serialize_with = "gcmn_core::serde::to_rfc3339_ms")]
    pub borrow_date: DateTime<Utc>,
    #[serde(default, serialize_with = "gcmn_core::serde::to_rfc3339_ms_opt")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, serialize_with = "gcmn_core::serde::to_rfc3339_ms_opt")]
    pub return_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
    #[serde(serialize_with = "gcmn_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "gcmn_core::serde::to_rfc3339_ms_opt"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewBookBorrow {
    pub user_id: String,
    pub book_title: String,
    pub isbn: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Library card application with its derived credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardApplication {
    pub id: String,
    pub user_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub father_name: Option<String>,
    pub dob: Option<NaiveDate>,
    #[serde(rename = "class")]
    pub class_name: String,
    pub field: Option<String>,
    pub roll_no: String,
    pub email: String,
    pub phone: String,
    pub address_street: String,
    pub address_city: String,
    pub address_state: String,
    pub address_zip: String,
    pub status: ApplicationStatus,
    pub card_number: String,
    pub student_id: String,
    pub issue_date: NaiveDate,
    pub valid_through: NaiveDate,
    #[serde(serialize_with = "gcmn_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "gcmn_core::serde::to_rfc3339_ms_opt"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CardApplication {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A fully composed application, ready for storage to assign id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCardApplication {
    pub user_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub father_name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub class_name: String,
    pub field: Option<String>,
    pub roll_no: String,
    pub email: String,
    pub phone: String,
    pub address_street: String,
    pub address_city: String,
    pub address_state: String,
    pub address_zip: String,
    pub status: ApplicationStatus,
    pub card_number: String,
    pub student_id: String,
    pub issue_date: NaiveDate,
    pub valid_through: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: String,
    pub donor_name: String,
    pub email: Option<String>,
    pub book_title: String,
    pub author: Option<String>,
    pub quantity: i32,
    #[serde(serialize_with = "gcmn_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDonation {
    pub donor_name: String,
    pub email: Option<String>,
    pub book_title: String,
    pub author: Option<String>,
    pub quantity: i32,
}

/// Study note PDF for a class and subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub subject: String,
    pub title: String,
    pub description: String,
    pub pdf_path: String,
    pub status: PublishStatus,
    #[serde(serialize_with = "gcmn_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "gcmn_core::serde::to_rfc3339_ms_opt"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewNote {
    pub class_name: String,
    pub subject: String,
    pub title: String,
    pub description: String,
    pub pdf_path: String,
    pub status: PublishStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    #[serde(rename = "class")]
    pub class_name: Option<String>,
    pub subject: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub pdf_path: Option<String>,
    pub status: Option<PublishStatus>,
}

impl NotePatch {
    pub fn apply(self, note: &mut Note) {
        if let Some(v) = self.class_name {
            note.class_name = v;
        }
        if let Some(v) = self.subject {
            note.subject = v;
        }
        if let Some(v) = self.title {
            note.title = v;
        }
        if let Some(v) = self.description {
            note.description = v;
        }
        if let Some(v) = self.pdf_path {
            note.pdf_path = v;
        }
        if let Some(v) = self.status {
            note.status = v;
        }
    }
}

/// Digitised rare book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RareBook {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub pdf_path: String,
    pub status: PublishStatus,
    #[serde(serialize_with = "gcmn_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "gcmn_core::serde::to_rfc3339_ms_opt"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewRareBook {
    pub title: String,
    pub description: String,
    pub category: String,
    pub pdf_path: String,
    pub status: PublishStatus,
}

/// Return `value` trimmed, or `MissingField(name)` when absent or blank.
pub fn require(
    value: Option<String>,
    name: &'static str,
) -> Result<String, crate::error::LibraryServiceError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_owned()),
        _ => Err(crate::error::LibraryServiceError::MissingField(name)),
    }
}
