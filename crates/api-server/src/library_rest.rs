//! Library and favorites endpoints. Each mutation schedules a background
//! preference refresh and returns without waiting for it.

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ErrorResponse};
use crate::rest::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use shelf_core::types::UserBook;
use shelf_library::{AddBookRequest, UpdateEntryRequest};
use uuid::Uuid;

/// POST /library — Add a book to the caller's library.
#[utoipa::path(
    post,
    path = "/library",
    tag = "Library",
    request_body = AddBookRequest,
    params(("x-user-id" = Uuid, Header, description = "Authenticated user id")),
    responses(
        (status = 201, description = "Book added", body = UserBook),
        (status = 404, description = "Unknown user or book", body = ErrorResponse),
        (status = 409, description = "Book already in library", body = ErrorResponse),
    )
)]
pub async fn handle_add_book(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(request): Json<AddBookRequest>,
) -> Result<(StatusCode, Json<UserBook>), ApiError> {
    let entry = state.library.add_book(user_id, &request)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PATCH /library/{book_id} — Update status and/or rating.
#[utoipa::path(
    patch,
    path = "/library/{book_id}",
    tag = "Library",
    request_body = UpdateEntryRequest,
    params(
        ("book_id" = Uuid, Path, description = "Book id"),
        ("x-user-id" = Uuid, Header, description = "Authenticated user id"),
    ),
    responses(
        (status = 200, description = "Entry updated", body = UserBook),
        (status = 404, description = "Book not in library", body = ErrorResponse),
    )
)]
pub async fn handle_update_entry(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(book_id): Path<Uuid>,
    Json(request): Json<UpdateEntryRequest>,
) -> Result<Json<UserBook>, ApiError> {
    let entry = state.library.update_entry(user_id, book_id, &request)?;
    Ok(Json(entry))
}

/// DELETE /library/{book_id} — Remove a book from the library.
#[utoipa::path(
    delete,
    path = "/library/{book_id}",
    tag = "Library",
    params(
        ("book_id" = Uuid, Path, description = "Book id"),
        ("x-user-id" = Uuid, Header, description = "Authenticated user id"),
    ),
    responses(
        (status = 204, description = "Book removed"),
        (status = 404, description = "Book not in library", body = ErrorResponse),
    )
)]
pub async fn handle_remove_book(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(book_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.library.remove_book(user_id, book_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /favorites/{book_id} — Mark a book as favorite.
#[utoipa::path(
    post,
    path = "/favorites/{book_id}",
    tag = "Library",
    params(
        ("book_id" = Uuid, Path, description = "Book id"),
        ("x-user-id" = Uuid, Header, description = "Authenticated user id"),
    ),
    responses(
        (status = 204, description = "Book is a favorite"),
        (status = 404, description = "Unknown user or book", body = ErrorResponse),
    )
)]
pub async fn handle_add_favorite(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(book_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.library.set_favorite(user_id, book_id, true)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /favorites/{book_id} — Unmark a favorite.
#[utoipa::path(
    delete,
    path = "/favorites/{book_id}",
    tag = "Library",
    params(
        ("book_id" = Uuid, Path, description = "Book id"),
        ("x-user-id" = Uuid, Header, description = "Authenticated user id"),
    ),
    responses(
        (status = 204, description = "Book is not a favorite"),
        (status = 404, description = "Unknown user", body = ErrorResponse),
    )
)]
pub async fn handle_remove_favorite(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(book_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.library.set_favorite(user_id, book_id, false)?;
    Ok(StatusCode::NO_CONTENT)
}
