use axum::Json;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::types::ApiResponse;

/// Return the identity resolved from the bearer token
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<AuthenticatedUser>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn get_me(user: AuthenticatedUser) -> Result<Json<ApiResponse<AuthenticatedUser>>> {
    Ok(Json(ApiResponse::success(Some(user), None, None)))
}
