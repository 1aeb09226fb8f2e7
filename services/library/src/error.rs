use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use gcmn_core::error::ErrorBody;

/// Library service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum LibraryServiceError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("{0}")]
    InvalidStatus(#[from] gcmn_domain::status::UnknownStatus),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("a library card application with this email already exists")]
    DuplicateApplication,
    #[error("card number already issued")]
    CardNumberTaken,
    #[error("email already registered")]
    EmailAlreadyRegistered,
    #[error("book already returned")]
    AlreadyReturned,
    #[error("not authenticated")]
    Unauthenticated,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid library card id")]
    InvalidCardNumber,
    #[error("library card is pending approval")]
    CardNotApproved,
    #[error("admin access required")]
    Forbidden,
    #[error("user not found")]
    UserNotFound,
    #[error("library card application not found")]
    ApplicationNotFound,
    #[error("book borrow not found")]
    BorrowNotFound,
    #[error("contact message not found")]
    MessageNotFound,
    #[error("donation not found")]
    DonationNotFound,
    #[error("note not found")]
    NoteNotFound,
    #[error("rare book not found")]
    RareBookNotFound,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl LibraryServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
            Self::DuplicateApplication => "DUPLICATE_APPLICATION",
            Self::CardNumberTaken => "CARD_NUMBER_TAKEN",
            Self::EmailAlreadyRegistered => "EMAIL_ALREADY_REGISTERED",
            Self::AlreadyReturned => "ALREADY_RETURNED",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidCardNumber => "INVALID_CARD_NUMBER",
            Self::CardNotApproved => "CARD_NOT_APPROVED",
            Self::Forbidden => "FORBIDDEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::ApplicationNotFound => "APPLICATION_NOT_FOUND",
            Self::BorrowNotFound => "BORROW_NOT_FOUND",
            Self::MessageNotFound => "MESSAGE_NOT_FOUND",
            Self::DonationNotFound => "DONATION_NOT_FOUND",
            Self::NoteNotFound => "NOTE_NOT_FOUND",
            Self::RareBookNotFound => "RARE_BOOK_NOT_FOUND",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingField(_) | Self::InvalidStatus(_) | Self::InvalidPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::DuplicateApplication
            | Self::CardNumberTaken
            | Self::EmailAlreadyRegistered
            | Self::AlreadyReturned => StatusCode::CONFLICT,
            Self::Unauthenticated
            | Self::InvalidCredentials
            | Self::InvalidCardNumber
            | Self::CardNotApproved => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::UserNotFound
            | Self::ApplicationNotFound
            | Self::BorrowNotFound
            | Self::MessageNotFound
            | Self::DonationNotFound
            | Self::NoteNotFound
            | Self::RareBookNotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LibraryServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are expected client errors and already visible in the trace layer.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        ErrorBody::new(self.kind(), self.to_string()).with_status(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn assert_error(
        error: LibraryServiceError,
        expected_status: StatusCode,
        expected_kind: &str,
        expected_message: &str,
    ) {
        let resp = error.into_response();
        assert_eq!(resp.status(), expected_status);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["kind"], expected_kind);
        assert_eq!(json["message"], expected_message);
    }

    #[tokio::test]
    async fn should_return_missing_field() {
        assert_error(
            LibraryServiceError::MissingField("email"),
            StatusCode::BAD_REQUEST,
            "MISSING_FIELD",
            "missing required field: email",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_invalid_status() {
        let err = "archived"
            .parse::<gcmn_domain::status::ApplicationStatus>()
            .unwrap_err();
        assert_error(
            err.into(),
            StatusCode::BAD_REQUEST,
            "INVALID_STATUS",
            "unknown application status `archived`",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_duplicate_application_as_conflict() {
        assert_error(
            LibraryServiceError::DuplicateApplication,
            StatusCode::CONFLICT,
            "DUPLICATE_APPLICATION",
            "a library card application with this email already exists",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_card_not_approved_as_unauthorized() {
        assert_error(
            LibraryServiceError::CardNotApproved,
            StatusCode::UNAUTHORIZED,
            "CARD_NOT_APPROVED",
            "library card is pending approval",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_forbidden() {
        assert_error(
            LibraryServiceError::Forbidden,
            StatusCode::FORBIDDEN,
            "FORBIDDEN",
            "admin access required",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_application_not_found() {
        assert_error(
            LibraryServiceError::ApplicationNotFound,
            StatusCode::NOT_FOUND,
            "APPLICATION_NOT_FOUND",
            "library card application not found",
        )
        .await;
    }

    #[tokio::test]
    async fn should_hide_internal_details() {
        assert_error(
            LibraryServiceError::Internal(anyhow::anyhow!("disk full")),
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL",
            "internal error",
        )
        .await;
    }
}
