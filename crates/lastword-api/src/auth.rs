//! Request identity extraction.
//!
//! The upstream auth collaborator verifies credentials and forwards the
//! caller's identity as `x-user-id` / `x-user-role` headers. This extractor
//! trusts those headers; anything missing or malformed reads as 401.

use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use lastword_core::identity::{Identity, Role};
use uuid::Uuid;

use crate::error::ErrorBody;

/// Extracted caller identity.
#[derive(Debug, Clone, Copy)]
pub struct AuthIdentity(pub Identity);

/// Rejection for missing or malformed identity headers.
#[derive(Debug)]
pub struct AuthRejection(String);

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: "unauthorized",
            message: self.0,
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for AuthIdentity
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AuthRejection("missing x-user-id header".to_owned()))?;
        let user_id = Uuid::parse_str(user_id)
            .map_err(|_| AuthRejection("x-user-id is not a valid uuid".to_owned()))?;

        let role = match parts.headers.get("x-user-role") {
            None => Role::Player,
            Some(value) => value
                .to_str()
                .ok()
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| AuthRejection("x-user-role is not a known role".to_owned()))?,
        };

        Ok(Self(Identity { user_id, role }))
    }
}
