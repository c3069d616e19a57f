//! Caller identity. Authentication itself happens upstream; the gateway
//! forwards the verified user id in the `x-user-id` header.

use crate::error::ApiError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Uuid);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or(ApiError::Unauthorized("missing authenticated user"))?;
        let user_id = value
            .to_str()
            .ok()
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .ok_or(ApiError::Unauthorized("malformed authenticated user"))?;
        Ok(Self(user_id))
    }
}
