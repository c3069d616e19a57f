//! Recommendation REST endpoints.

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ErrorResponse};
use crate::rest::AppState;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use shelf_core::types::PreferenceModel;
use shelf_core::ShelfError;
use shelf_recommendations::RecommendationResponse;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecommendationQuery {
    /// Number of results, capped at 50.
    #[param(value_type = Option<u32>)]
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GenreRecommendationQuery {
    /// Only books tagged with this genre are returned.
    pub genre: Option<String>,
    /// Number of results, capped at 50.
    #[param(value_type = Option<u32>)]
    pub limit: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub success: bool,
    pub preferences: PreferenceModel,
}

/// `limit` arrives as raw text so malformed values get the same JSON error
/// body as every other rejected argument.
fn parse_limit(raw: Option<&str>) -> Result<Option<usize>, ShelfError> {
    raw.map(|s| {
        s.trim().parse::<usize>().map_err(|_| {
            ShelfError::InvalidArgument(format!("limit must be a positive integer, got {s:?}"))
        })
    })
    .transpose()
}

/// GET /recommendations — Personalized recommendations.
#[utoipa::path(
    get,
    path = "/recommendations",
    tag = "Recommendations",
    params(
        RecommendationQuery,
        ("x-user-id" = String, Header, description = "Authenticated user id (UUID)"),
    ),
    responses(
        (status = 200, description = "Ranked recommendations", body = RecommendationResponse),
        (status = 400, description = "Invalid limit", body = ErrorResponse),
        (status = 401, description = "Missing user identity", body = ErrorResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse),
    )
)]
pub async fn handle_recommendations(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let limit = parse_limit(query.limit.as_deref())?;
    let response = state.engine.recommend(user_id, limit, None)?;
    Ok(Json(response))
}

/// GET /recommendations/genres — Recommendations within one genre.
#[utoipa::path(
    get,
    path = "/recommendations/genres",
    tag = "Recommendations",
    params(
        GenreRecommendationQuery,
        ("x-user-id" = String, Header, description = "Authenticated user id (UUID)"),
    ),
    responses(
        (status = 200, description = "Ranked genre picks", body = RecommendationResponse),
        (status = 400, description = "Bad genre or limit", body = ErrorResponse),
        (status = 401, description = "Missing user identity", body = ErrorResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse),
    )
)]
pub async fn handle_genre_recommendations(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Query(query): Query<GenreRecommendationQuery>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let genre = query
        .genre
        .ok_or_else(|| ShelfError::InvalidArgument("genre is required".to_string()))?;
    let limit = parse_limit(query.limit.as_deref())?;
    let response = state
        .engine
        .recommend(user_id, limit, Some(genre.as_str()))?;
    Ok(Json(response))
}

/// POST /recommendations/refresh — Recompute preferences synchronously.
#[utoipa::path(
    post,
    path = "/recommendations/refresh",
    tag = "Recommendations",
    params(("x-user-id" = String, Header, description = "Authenticated user id (UUID)")),
    responses(
        (status = 200, description = "Preferences recomputed", body = RefreshResponse),
        (status = 401, description = "Missing user identity", body = ErrorResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse),
        (status = 500, description = "Recomputation failed", body = ErrorResponse),
    )
)]
pub async fn handle_refresh(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<RefreshResponse>, ApiError> {
    let preferences = state.recomputer.recompute(user_id)?;
    info!(user_id = %user_id, "Preferences refreshed on request");
    Ok(Json(RefreshResponse {
        success: true,
        preferences,
    }))
}
