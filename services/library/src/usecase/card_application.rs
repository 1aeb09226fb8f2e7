use std::sync::Arc;

use anyhow::Context as _;
use chrono::{Days, NaiveDate, Utc};
use tracing::{debug, info, warn};

use gcmn_domain::card::{CardNumberCandidates, base_card_number};
use gcmn_domain::id::new_student_id;
use gcmn_domain::status::ApplicationStatus;

use crate::domain::repository::CardApplicationRepository;
use crate::domain::types::{CardApplication, NewCardApplication, require};
use crate::error::LibraryServiceError;

/// Days a freshly issued card stays valid.
pub const CARD_VALIDITY_DAYS: u64 = 365;

/// Inserts attempted before giving up when the store keeps reporting the
/// chosen card number as taken.
pub const MAX_CARD_NUMBER_ATTEMPTS: usize = 8;

/// Admits one application submission at a time, process-wide.
///
/// The duplicate-email check and card-number search are only meaningful if no
/// other submission inserts in between.
#[derive(Clone, Default)]
pub struct SubmissionGate(Arc<tokio::sync::Mutex<()>>);

impl SubmissionGate {
    pub fn new() -> Self {
        Self::default()
    }
}

// ── SubmitApplication ────────────────────────────────────────────────────────

/// Raw applicant payload. Optional fields stay optional; required ones are
/// checked by the use case.
#[derive(Debug, Clone, Default)]
pub struct SubmitApplicationInput {
    pub user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub father_name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub class_name: Option<String>,
    pub field: Option<String>,
    pub roll_no: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address_street: Option<String>,
    pub address_city: Option<String>,
    pub address_state: Option<String>,
    pub address_zip: Option<String>,
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

pub struct SubmitApplicationUseCase<R: CardApplicationRepository> {
    pub repo: R,
    pub gate: SubmissionGate,
}

impl<R: CardApplicationRepository> SubmitApplicationUseCase<R> {
    pub async fn execute(
        &self,
        input: SubmitApplicationInput,
    ) -> Result<CardApplication, LibraryServiceError> {
        let mut draft = NewCardApplication {
            first_name: require(input.first_name, "firstName")?,
            last_name: require(input.last_name, "lastName")?,
            class_name: require(input.class_name, "class")?,
            roll_no: require(input.roll_no, "rollNo")?,
            email: require(input.email, "email")?,
            phone: require(input.phone, "phone")?,
            address_street: require(input.address_street, "addressStreet")?,
            address_city: require(input.address_city, "addressCity")?,
            address_state: require(input.address_state, "addressState")?,
            address_zip: require(input.address_zip, "addressZip")?,
            user_id: optional(input.user_id),
            father_name: optional(input.father_name),
            dob: input.dob,
            field: optional(input.field),
            status: ApplicationStatus::Pending,
            card_number: String::new(),
            student_id: String::new(),
            issue_date: NaiveDate::MIN,
            valid_through: NaiveDate::MIN,
        };

        let _turn = self.gate.0.lock().await;

        if self
            .repo
            .find_application_by_email(&draft.email)
            .await?
            .is_some()
        {
            info!(email = %draft.email, "rejected duplicate library card application");
            return Err(LibraryServiceError::DuplicateApplication);
        }

        draft.issue_date = Utc::now().date_naive();
        draft.valid_through = draft
            .issue_date
            .checked_add_days(Days::new(CARD_VALIDITY_DAYS))
            .context("card validity window overflows the calendar")?;

        let mut candidates = CardNumberCandidates::new(base_card_number(
            draft.field.as_deref(),
            &draft.roll_no,
            &draft.class_name,
        ));

        for attempt in 1..=MAX_CARD_NUMBER_ATTEMPTS {
            let card_number = self.next_free_card_number(&mut candidates).await?;
            let application = NewCardApplication {
                card_number: card_number.clone(),
                student_id: new_student_id(),
                ..draft.clone()
            };
            match self.repo.create_application(application).await {
                Ok(stored) => {
                    info!(
                        application_id = %stored.id,
                        card_number = %stored.card_number,
                        "library card application submitted"
                    );
                    return Ok(stored);
                }
                Err(LibraryServiceError::CardNumberTaken) => {
                    warn!(%card_number, attempt, "card number taken at insert, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Err(LibraryServiceError::CardNumberTaken)
    }

    /// Advance `candidates` to the first card number not already stored.
    async fn next_free_card_number(
        &self,
        candidates: &mut CardNumberCandidates,
    ) -> Result<String, LibraryServiceError> {
        for candidate in candidates.by_ref() {
            if self
                .repo
                .find_application_by_card_number(&candidate)
                .await?
                .is_none()
            {
                return Ok(candidate);
            }
            debug!(%candidate, "card number in use, trying next suffix");
        }
        Err(anyhow::anyhow!("card number suffixes exhausted").into())
    }
}

// ── TransitionApplication ────────────────────────────────────────────────────

/// Set an application's status. Any status may follow any other.
pub struct TransitionApplicationUseCase<R: CardApplicationRepository> {
    pub repo: R,
}

impl<R: CardApplicationRepository> TransitionApplicationUseCase<R> {
    pub async fn execute(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<CardApplication, LibraryServiceError> {
        let application = self
            .repo
            .update_application_status(id, status)
            .await?
            .ok_or(LibraryServiceError::ApplicationNotFound)?;
        info!(application_id = %id, %status, "library card application status changed");
        Ok(application)
    }
}

// ── LookupByCardNumber ───────────────────────────────────────────────────────

/// Find the application holding `card_number`, whatever its status.
///
/// Callers that authenticate with the card must check for `Approved`
/// themselves.
pub struct LookupByCardNumberUseCase<R: CardApplicationRepository> {
    pub repo: R,
}

impl<R: CardApplicationRepository> LookupByCardNumberUseCase<R> {
    pub async fn execute(
        &self,
        card_number: &str,
    ) -> Result<Option<CardApplication>, LibraryServiceError> {
        self.repo
            .find_application_by_card_number(card_number.trim())
            .await
    }
}

// ── List / Get / Delete ──────────────────────────────────────────────────────

pub struct ListApplicationsUseCase<R: CardApplicationRepository> {
    pub repo: R,
}

impl<R: CardApplicationRepository> ListApplicationsUseCase<R> {
    /// All applications, or only those filed by `user_id`.
    pub async fn execute(
        &self,
        user_id: Option<&str>,
    ) -> Result<Vec<CardApplication>, LibraryServiceError> {
        match user_id {
            Some(user_id) => self.repo.list_applications_by_user(user_id).await,
            None => self.repo.list_applications().await,
        }
    }
}

pub struct GetApplicationUseCase<R: CardApplicationRepository> {
    pub repo: R,
}

impl<R: CardApplicationRepository> GetApplicationUseCase<R> {
    pub async fn execute(&self, id: &str) -> Result<CardApplication, LibraryServiceError> {
        self.repo
            .find_application(id)
            .await?
            .ok_or(LibraryServiceError::ApplicationNotFound)
    }
}

pub struct DeleteApplicationUseCase<R: CardApplicationRepository> {
    pub repo: R,
}

impl<R: CardApplicationRepository> DeleteApplicationUseCase<R> {
    pub async fn execute(&self, id: &str) -> Result<(), LibraryServiceError> {
        self.repo.delete_application(id).await?;
        info!(application_id = %id, "library card application deleted");
        Ok(())
    }
}
