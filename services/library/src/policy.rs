//! Access decisions derived from the session principal and stored roles.

use gcmn_auth_types::token::Principal;
use gcmn_domain::role::AppRole;

use crate::domain::repository::UserRoleRepository;
use crate::error::LibraryServiceError;

/// The principal of an optional session, or `Unauthenticated`.
pub fn require_authenticated(
    principal: Option<Principal>,
) -> Result<Principal, LibraryServiceError> {
    principal.ok_or(LibraryServiceError::Unauthenticated)
}

/// True for the fixed administrator and for any user holding the `admin` role.
pub async fn is_admin<R: UserRoleRepository>(
    repo: &R,
    principal: &Principal,
) -> Result<bool, LibraryServiceError> {
    match principal {
        Principal::Admin => Ok(true),
        Principal::User { user_id } => repo.has_role(user_id, AppRole::Admin).await,
        Principal::Card { .. } => Ok(false),
    }
}

/// Admit administrators; everyone else gets `Forbidden`.
pub async fn require_admin<R: UserRoleRepository>(
    repo: &R,
    principal: &Principal,
) -> Result<(), LibraryServiceError> {
    if is_admin(repo, principal).await? {
        Ok(())
    } else {
        tracing::debug!(?principal, "admin route refused");
        Err(LibraryServiceError::Forbidden)
    }
}

/// Whose records a listing is scoped to: `None` for admins (everything),
/// otherwise the caller's own id.
pub async fn owner_scope<R: UserRoleRepository>(
    repo: &R,
    principal: &Principal,
) -> Result<Option<String>, LibraryServiceError> {
    match principal {
        Principal::Admin => Ok(None),
        Principal::User { user_id } => {
            if repo.has_role(user_id, AppRole::Admin).await? {
                Ok(None)
            } else {
                Ok(Some(user_id.clone()))
            }
        }
        Principal::Card { application_id } => Ok(Some(application_id.clone())),
    }
}
