use anyhow::Context as _;
use tracing::{debug, info};

use gcmn_auth_types::token::Principal;
use gcmn_domain::role::AppRole;
use gcmn_domain::status::{ApplicationStatus, UserKind};

use crate::domain::repository::{
    CardApplicationRepository, ProfileRepository, UserRepository, UserRoleRepository,
};
use crate::domain::types::{CardApplication, NewUser, Profile, ProfilePatch, User, require};
use crate::error::LibraryServiceError;
use crate::usecase::card_application::LookupByCardNumberUseCase;

/// The fixed administrator configured for the deployment.
#[derive(Clone)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
    pub secret_key: String,
}

impl AdminCredentials {
    fn matches(&self, email: &str, password: &str, secret_key: &str) -> bool {
        self.email == email && self.password == password && self.secret_key == secret_key
    }
}

// Hashing is deliberately slow; keep it off the async workers.
async fn hash_password(password: String) -> Result<String, LibraryServiceError> {
    let hash = tokio::task::spawn_blocking(move || password_auth::generate_hash(password))
        .await
        .context("password hashing task failed")?;
    Ok(hash)
}

async fn password_matches(password: String, hash: String) -> Result<bool, LibraryServiceError> {
    let ok = tokio::task::spawn_blocking(move || {
        password_auth::verify_password(password, &hash).is_ok()
    })
    .await
    .context("password verification task failed")?;
    Ok(ok)
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

// ── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RegisterInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub student_class: Option<String>,
}

pub struct RegisterUseCase<R> {
    pub repo: R,
}

impl<R> RegisterUseCase<R>
where
    R: UserRepository + ProfileRepository + UserRoleRepository,
{
    /// Create the account, grant it the `user` role and write its profile.
    pub async fn execute(&self, input: RegisterInput) -> Result<User, LibraryServiceError> {
        let email = require(input.email, "email")?;
        let password = input
            .password
            .filter(|p| !p.is_empty())
            .ok_or(LibraryServiceError::MissingField("password"))?;
        let full_name = require(input.full_name, "fullName")?;
        let student_class = optional(input.student_class);

        if self.repo.find_user_by_email(&email).await?.is_some() {
            return Err(LibraryServiceError::EmailAlreadyRegistered);
        }

        let user = self
            .repo
            .create_user(NewUser {
                email,
                password_hash: hash_password(password).await?,
                full_name,
                phone: optional(input.phone),
                roll_number: optional(input.roll_number),
                department: optional(input.department),
                kind: if student_class.is_some() {
                    UserKind::Student
                } else {
                    UserKind::User
                },
                student_class,
            })
            .await?;

        self.repo.grant_role(&user.id, AppRole::User).await?;
        self.repo
            .upsert_profile(
                &user.id,
                ProfilePatch {
                    full_name: Some(user.full_name.clone()),
                    phone: user.phone.clone(),
                    roll_number: user.roll_number.clone(),
                    department: user.department.clone(),
                    student_class: user.student_class.clone(),
                },
            )
            .await?;

        info!(user_id = %user.id, kind = %user.kind, "user registered");
        Ok(user)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub secret_key: Option<String>,
    pub library_card_id: Option<String>,
}

#[derive(Debug)]
pub enum LoginOutcome {
    Admin { email: String },
    Card(CardApplication),
    User { user: User, is_admin: bool },
}

impl LoginOutcome {
    pub fn principal(&self) -> Principal {
        match self {
            Self::Admin { .. } => Principal::Admin,
            Self::Card(application) => Principal::Card {
                application_id: application.id.clone(),
            },
            Self::User { user, .. } => Principal::User {
                user_id: user.id.clone(),
            },
        }
    }
}

pub struct LoginUseCase<R> {
    pub repo: R,
    pub admin: AdminCredentials,
}

impl<R> LoginUseCase<R>
where
    R: UserRepository + UserRoleRepository + CardApplicationRepository + Clone,
{
    /// Try the admin credentials, then a library card number, then email and
    /// password, in that order.
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutcome, LibraryServiceError> {
        if let (Some(email), Some(password), Some(secret_key)) =
            (&input.email, &input.password, &input.secret_key)
        {
            if self.admin.matches(email.trim(), password, secret_key) {
                info!("admin logged in");
                return Ok(LoginOutcome::Admin {
                    email: self.admin.email.clone(),
                });
            }
            debug!("admin credentials did not match, trying other methods");
        }

        if let Some(card_number) = optional(input.library_card_id) {
            let lookup = LookupByCardNumberUseCase {
                repo: self.repo.clone(),
            };
            let application = lookup
                .execute(&card_number)
                .await?
                .ok_or(LibraryServiceError::InvalidCardNumber)?;
            if application.status != ApplicationStatus::Approved {
                return Err(LibraryServiceError::CardNotApproved);
            }
            info!(application_id = %application.id, "card holder logged in");
            return Ok(LoginOutcome::Card(application));
        }

        let email = require(input.email, "email")?;
        let password = input
            .password
            .filter(|p| !p.is_empty())
            .ok_or(LibraryServiceError::MissingField("password"))?;

        let user = self
            .repo
            .find_user_by_email(&email)
            .await?
            .ok_or(LibraryServiceError::InvalidCredentials)?;
        if !password_matches(password, user.password_hash.clone()).await? {
            return Err(LibraryServiceError::InvalidCredentials);
        }
        let is_admin = self.repo.has_role(&user.id, AppRole::Admin).await?;
        info!(user_id = %user.id, is_admin, "user logged in");
        Ok(LoginOutcome::User { user, is_admin })
    }
}

// ── Me ───────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum Me {
    Admin {
        email: String,
    },
    Card(CardApplication),
    User {
        user: User,
        profile: Option<Profile>,
        roles: Vec<AppRole>,
    },
}

/// Describe the session's principal. A session whose user or card has since
/// been deleted is treated as unauthenticated.
pub struct MeUseCase<R> {
    pub repo: R,
    pub admin_email: String,
}

impl<R> MeUseCase<R>
where
    R: UserRepository + ProfileRepository + UserRoleRepository + CardApplicationRepository,
{
    pub async fn execute(&self, principal: &Principal) -> Result<Me, LibraryServiceError> {
        match principal {
            Principal::Admin => Ok(Me::Admin {
                email: self.admin_email.clone(),
            }),
            Principal::Card { application_id } => self
                .repo
                .find_application(application_id)
                .await?
                .map(Me::Card)
                .ok_or(LibraryServiceError::Unauthenticated),
            Principal::User { user_id } => {
                let user = self
                    .repo
                    .find_user(user_id)
                    .await?
                    .ok_or(LibraryServiceError::Unauthenticated)?;
                let profile = self.repo.find_profile(user_id).await?;
                let roles = self
                    .repo
                    .list_roles(user_id)
                    .await?
                    .into_iter()
                    .map(|r| r.role)
                    .collect();
                Ok(Me::User {
                    user,
                    profile,
                    roles,
                })
            }
        }
    }
}

// ── Profile ──────────────────────────────────────────────────────────────────

pub struct GetProfileUseCase<R: ProfileRepository> {
    pub repo: R,
}

impl<R: ProfileRepository> GetProfileUseCase<R> {
    pub async fn execute(&self, user_id: &str) -> Result<Option<Profile>, LibraryServiceError> {
        self.repo.find_profile(user_id).await
    }
}

pub struct UpdateProfileUseCase<R: ProfileRepository> {
    pub repo: R,
}

impl<R: ProfileRepository> UpdateProfileUseCase<R> {
    /// Merge `patch` into the profile, creating it if the user has none yet.
    pub async fn execute(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> Result<Profile, LibraryServiceError> {
        let profile = self.repo.upsert_profile(user_id, patch).await?;
        debug!(%user_id, "profile updated");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gcmn_testing::fixture::DataDir;

    use crate::domain::types::NewCardApplication;
    use crate::infra::json::JsonStore;

    async fn store() -> (DataDir, JsonStore) {
        let dir = DataDir::new();
        let store = JsonStore::open(dir.data_file()).await.unwrap();
        (dir, store)
    }

    fn admin() -> AdminCredentials {
        AdminCredentials {
            email: "admin@gcmn.edu".into(),
            password: "admin-pass".into(),
            secret_key: "s3cret".into(),
        }
    }

    fn registration(email: &str, class: Option<&str>) -> RegisterInput {
        RegisterInput {
            email: Some(email.into()),
            password: Some("hunter22".into()),
            full_name: Some("Bilal Ahmed".into()),
            phone: Some("0301-0000000".into()),
            student_class: class.map(Into::into),
            ..Default::default()
        }
    }

    fn application(card_number: &str, status: ApplicationStatus) -> NewCardApplication {
        let today = Utc::now().date_naive();
        NewCardApplication {
            user_id: None,
            first_name: "Sana".into(),
            last_name: "Iqbal".into(),
            father_name: None,
            dob: None,
            class_name: "Class 11".into(),
            field: Some("Commerce".into()),
            roll_no: "3".into(),
            email: format!("{card_number}@example.com"),
            phone: "0302".into(),
            address_street: "1 Road".into(),
            address_city: "Multan".into(),
            address_state: "Punjab".into(),
            address_zip: "60000".into(),
            status,
            card_number: card_number.into(),
            student_id: "GCMN-000001".into(),
            issue_date: today,
            valid_through: today,
        }
    }

    #[tokio::test]
    async fn should_register_student_with_role_and_profile() {
        let (_dir, store) = store().await;
        let usecase = RegisterUseCase { repo: store.clone() };

        let user = usecase
            .execute(registration("bilal@example.com", Some("Class 12")))
            .await
            .unwrap();
        assert_eq!(user.kind, UserKind::Student);
        assert_ne!(user.password_hash, "hunter22");
        assert!(store.has_role(&user.id, AppRole::User).await.unwrap());
        assert!(!store.has_role(&user.id, AppRole::Admin).await.unwrap());

        let profile = store.find_profile(&user.id).await.unwrap().unwrap();
        assert_eq!(profile.full_name, "Bilal Ahmed");
        assert_eq!(profile.student_class.as_deref(), Some("Class 12"));
    }

    #[tokio::test]
    async fn should_register_plain_user_without_class() {
        let (_dir, store) = store().await;
        let usecase = RegisterUseCase { repo: store };
        let user = usecase
            .execute(registration("visitor@example.com", None))
            .await
            .unwrap();
        assert_eq!(user.kind, UserKind::User);
    }

    #[tokio::test]
    async fn should_reject_second_registration_with_same_email() {
        let (_dir, store) = store().await;
        let usecase = RegisterUseCase { repo: store.clone() };
        usecase
            .execute(registration("bilal@example.com", None))
            .await
            .unwrap();

        let err = usecase
            .execute(registration("bilal@example.com", None))
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryServiceError::EmailAlreadyRegistered));
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_require_password_on_register() {
        let (_dir, store) = store().await;
        let usecase = RegisterUseCase { repo: store };
        let mut input = registration("bilal@example.com", None);
        input.password = None;
        let err = usecase.execute(input).await.unwrap_err();
        assert!(matches!(err, LibraryServiceError::MissingField("password")));
    }

    #[tokio::test]
    async fn should_log_in_with_email_and_password() {
        let (_dir, store) = store().await;
        let user = RegisterUseCase { repo: store.clone() }
            .execute(registration("bilal@example.com", None))
            .await
            .unwrap();
        let usecase = LoginUseCase {
            repo: store,
            admin: admin(),
        };

        let outcome = usecase
            .execute(LoginInput {
                email: Some("bilal@example.com".into()),
                password: Some("hunter22".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(
            outcome.principal(),
            Principal::User {
                user_id: user.id.clone()
            }
        );
        assert!(matches!(outcome, LoginOutcome::User { is_admin: false, .. }));

        let err = usecase
            .execute(LoginInput {
                email: Some("bilal@example.com".into()),
                password: Some("wrong".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn should_report_admin_role_on_login() {
        let (_dir, store) = store().await;
        let user = RegisterUseCase { repo: store.clone() }
            .execute(registration("staff@example.com", None))
            .await
            .unwrap();
        store.grant_role(&user.id, AppRole::Admin).await.unwrap();

        let outcome = LoginUseCase {
            repo: store,
            admin: admin(),
        }
        .execute(LoginInput {
            email: Some("staff@example.com".into()),
            password: Some("hunter22".into()),
            ..Default::default()
        })
        .await
        .unwrap();
        assert!(matches!(outcome, LoginOutcome::User { is_admin: true, .. }));
    }

    #[tokio::test]
    async fn should_log_in_fixed_admin_only_with_all_three_credentials() {
        let (_dir, store) = store().await;
        let usecase = LoginUseCase {
            repo: store,
            admin: admin(),
        };

        let outcome = usecase
            .execute(LoginInput {
                email: Some("admin@gcmn.edu".into()),
                password: Some("admin-pass".into()),
                secret_key: Some("s3cret".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(outcome.principal(), Principal::Admin);

        let err = usecase
            .execute(LoginInput {
                email: Some("admin@gcmn.edu".into()),
                password: Some("admin-pass".into()),
                secret_key: Some("guess".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn should_log_in_with_approved_card_only() {
        let (_dir, store) = store().await;
        let approved = store
            .create_application(application("COM-3-11", ApplicationStatus::Approved))
            .await
            .unwrap();
        store
            .create_application(application("COM-4-11", ApplicationStatus::Pending))
            .await
            .unwrap();
        let usecase = LoginUseCase {
            repo: store,
            admin: admin(),
        };

        let card = |id: &str| LoginInput {
            library_card_id: Some(id.into()),
            ..Default::default()
        };

        let outcome = usecase.execute(card("COM-3-11")).await.unwrap();
        assert_eq!(
            outcome.principal(),
            Principal::Card {
                application_id: approved.id
            }
        );
        assert!(matches!(
            usecase.execute(card("COM-4-11")).await.unwrap_err(),
            LibraryServiceError::CardNotApproved
        ));
        assert!(matches!(
            usecase.execute(card("COM-9-11")).await.unwrap_err(),
            LibraryServiceError::InvalidCardNumber
        ));
    }

    #[tokio::test]
    async fn should_describe_each_principal() {
        let (_dir, store) = store().await;
        let user = RegisterUseCase { repo: store.clone() }
            .execute(registration("bilal@example.com", Some("Class 11")))
            .await
            .unwrap();
        let card = store
            .create_application(application("COM-3-11", ApplicationStatus::Approved))
            .await
            .unwrap();
        let usecase = MeUseCase {
            repo: store,
            admin_email: "admin@gcmn.edu".into(),
        };

        match usecase.execute(&Principal::Admin).await.unwrap() {
            Me::Admin { email } => assert_eq!(email, "admin@gcmn.edu"),
            other => panic!("expected admin, got {other:?}"),
        }
        match usecase
            .execute(&Principal::Card {
                application_id: card.id.clone(),
            })
            .await
            .unwrap()
        {
            Me::Card(app) => assert_eq!(app.card_number, "COM-3-11"),
            other => panic!("expected card, got {other:?}"),
        }
        match usecase
            .execute(&Principal::User {
                user_id: user.id.clone(),
            })
            .await
            .unwrap()
        {
            Me::User { user: u, profile, roles } => {
                assert_eq!(u.id, user.id);
                assert!(profile.is_some());
                assert_eq!(roles, vec![AppRole::User]);
            }
            other => panic!("expected user, got {other:?}"),
        }

        let err = usecase
            .execute(&Principal::User {
                user_id: "gone".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryServiceError::Unauthenticated));
    }

    #[tokio::test]
    async fn should_create_profile_lazily_then_merge() {
        let (_dir, store) = store().await;
        let get = GetProfileUseCase { repo: store.clone() };
        let update = UpdateProfileUseCase { repo: store };

        assert!(get.execute("u-1").await.unwrap().is_none());

        let created = update
            .execute(
                "u-1",
                ProfilePatch {
                    full_name: Some("Hina".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(created.updated_at.is_none());

        let merged = update
            .execute(
                "u-1",
                ProfilePatch {
                    department: Some("Arts".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(merged.id, created.id);
        assert_eq!(merged.full_name, "Hina");
        assert_eq!(merged.department.as_deref(), Some("Arts"));
        assert!(merged.updated_at.is_some());
    }
}
