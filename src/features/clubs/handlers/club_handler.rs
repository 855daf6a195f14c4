use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::guards::RequireSuperAdmin;
use crate::features::clubs::dtos::{
    ClubResponseDto, GrantClubAdminDto, NearbyClubDto, NearbyClubsQuery,
};
use crate::features::clubs::services::{ClubService, NearbySearch};
use crate::shared::types::{ApiResponse, Meta};

/// Find active clubs near a point
///
/// Results are sorted nearest first and annotated with the great-circle
/// distance in kilometers.
#[utoipa::path(
    get,
    path = "/api/clubs/nearby",
    params(NearbyClubsQuery),
    responses(
        (status = 200, description = "Clubs within the radius", body = ApiResponse<Vec<NearbyClubDto>>),
        (status = 400, description = "Invalid coordinate, radius or limit")
    ),
    tag = "clubs"
)]
pub async fn search_nearby(
    State(service): State<Arc<ClubService>>,
    AppQuery(query): AppQuery<NearbyClubsQuery>,
) -> Result<Json<ApiResponse<Vec<NearbyClubDto>>>> {
    query.validate()?;
    let search = NearbySearch::try_from(query)?;

    let hits = service.search_nearby(&search).await?;
    let dtos: Vec<NearbyClubDto> = hits.into_iter().map(Into::into).collect();
    let meta = Meta::total(dtos.len());

    Ok(Json(ApiResponse::success(Some(dtos), None, Some(meta))))
}

/// Get a club by ID
#[utoipa::path(
    get,
    path = "/api/clubs/{id}",
    params(
        ("id" = Uuid, Path, description = "Club ID")
    ),
    responses(
        (status = 200, description = "Club details", body = ApiResponse<ClubResponseDto>),
        (status = 404, description = "Club not found")
    ),
    tag = "clubs"
)]
pub async fn get_club(
    State(service): State<Arc<ClubService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ClubResponseDto>>> {
    let club = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(club.into()), None, None)))
}

/// Promote a user to club admin (super admin only)
#[utoipa::path(
    put,
    path = "/api/admin/clubs/{id}/admins",
    params(
        ("id" = Uuid, Path, description = "Club ID")
    ),
    request_body = GrantClubAdminDto,
    responses(
        (status = 200, description = "User is now a club admin"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Super admin access required"),
        (status = 404, description = "Club not found")
    ),
    tag = "clubs",
    security(("bearer_auth" = []))
)]
pub async fn grant_club_admin(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(service): State<Arc<ClubService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<GrantClubAdminDto>,
) -> Result<Json<ApiResponse<()>>> {
    dto.validate()?;

    service.grant_admin(id, &dto.user_id).await?;
    tracing::info!("Club admin granted by {}", admin.user_id);

    Ok(Json(ApiResponse::success(
        None,
        Some("Club admin granted".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;

    use super::*;
    use crate::features::clubs::routes;
    use crate::shared::test_helpers::{club_at, with_user, member, InMemoryClubStore};

    async fn server_with_clubs(coords: &[(f64, f64)]) -> TestServer {
        let store = InMemoryClubStore::default();
        for &(lat, lng) in coords {
            store.insert(club_at(lat, lng)).await;
        }
        let service = Arc::new(ClubService::new(Arc::new(store)));
        TestServer::new(routes::routes(service)).unwrap()
    }

    #[tokio::test]
    async fn test_nearby_endpoint_returns_sorted_distances() {
        let server = server_with_clubs(&[(-33.8, 151.2), (-33.8688, 151.2093), (-37.8136, 144.9631)])
            .await;

        let response = server
            .get("/api/clubs/nearby")
            .add_query_param("lat", -33.8688)
            .add_query_param("lng", 151.2093)
            .add_query_param("radiusKm", 10)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["distanceKm"], 0.0);
        assert!(data[1]["distanceKm"].as_f64().unwrap() <= 10.0);
        assert_eq!(body["meta"]["total"], 2);
    }

    #[tokio::test]
    async fn test_nearby_endpoint_rejects_invalid_center() {
        let server = server_with_clubs(&[]).await;

        let response = server
            .get("/api/clubs/nearby")
            .add_query_param("lat", 95.0)
            .add_query_param("lng", 0.0)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_nearby_endpoint_rejects_oversized_radius() {
        let server = server_with_clubs(&[]).await;

        let response = server
            .get("/api/clubs/nearby")
            .add_query_param("lat", 0.0)
            .add_query_param("lng", 0.0)
            .add_query_param("radiusKm", 501)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_nearby_endpoint_rejects_missing_center() {
        let server = server_with_clubs(&[]).await;

        let response = server.get("/api/clubs/nearby").await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_club_not_found_code() {
        let server = server_with_clubs(&[]).await;

        let response = server.get(&format!("/api/clubs/{}", Uuid::new_v4())).await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["errors"][0], "CLUB_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_grant_admin_requires_super_admin() {
        let store = Arc::new(InMemoryClubStore::default());
        let club_id = store.insert(club_at(0.0, 0.0)).await;
        let service = Arc::new(ClubService::new(store));
        let server =
            TestServer::new(with_user(routes::admin_routes(service), member("bob"))).unwrap();

        let response = server
            .put(&format!("/api/admin/clubs/{}/admins", club_id))
            .json(&serde_json::json!({ "userId": "bob" }))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }
}
