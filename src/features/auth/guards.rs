//! Role-based authorization guards.
//!
//! Club-level permissions (club admin) depend on membership data and are
//! checked by the clubs feature; this module only covers platform roles.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Guard for checking if user is super admin.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireSuperAdmin(user): RequireSuperAdmin) { ... }
/// ```
pub struct RequireSuperAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireSuperAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        if !user.is_super_admin() {
            return Err(AppError::Forbidden(
                "Super admin access required".to_string(),
            ));
        }

        Ok(RequireSuperAdmin(user.clone()))
    }
}
