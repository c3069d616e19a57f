//! OpenAPI specification and Swagger UI configuration.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shelf API",
        version = "0.1.0",
        description = "Personal reading library with preference-based book recommendations.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Recommendations", description = "Personalized and genre-scoped recommendations"),
        (name = "Library", description = "Library membership, ratings and favorites"),
        (name = "Operations", description = "Health, readiness, and liveness probes"),
    ),
    paths(
        // Recommendations
        crate::recommendation_rest::handle_recommendations,
        crate::recommendation_rest::handle_genre_recommendations,
        crate::recommendation_rest::handle_refresh,
        // Library
        crate::library_rest::handle_add_book,
        crate::library_rest::handle_update_entry,
        crate::library_rest::handle_remove_book,
        crate::library_rest::handle_add_favorite,
        crate::library_rest::handle_remove_favorite,
        // Operations
        crate::rest::health_check,
        crate::rest::readiness,
        crate::rest::liveness,
    ),
    components(schemas(
        shelf_core::types::Book,
        shelf_core::types::ReadingStatus,
        shelf_core::types::Rating,
        shelf_core::types::UserBook,
        shelf_core::types::PreferenceModel,
        shelf_recommendations::Recommendation,
        shelf_recommendations::BasedOn,
        shelf_recommendations::RecommendationResponse,
        shelf_library::AddBookRequest,
        shelf_library::UpdateEntryRequest,
        crate::recommendation_rest::RefreshResponse,
        crate::error::ErrorResponse,
        crate::rest::HealthResponse,
    ))
)]
pub struct ApiDoc;
