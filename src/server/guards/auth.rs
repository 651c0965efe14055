use crate::server::router::AppState;
use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use serde_json::json;
use subtle::ConstantTimeEq;

/// Admin routes require the session token issued by `POST /api/login`.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .map(|auth| auth.token().to_string());

        match token {
            Some(token) => {
                let expected = state.admin_token.as_ref();
                if token.as_bytes().ct_eq(expected.as_bytes()).into() {
                    Ok(RequireAdmin)
                } else {
                    Err(AuthError::InvalidToken)
                }
            }
            None => Err(AuthError::MissingToken),
        }
    }
}

pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let reason = match self {
            AuthError::MissingToken => "Missing admin token",
            AuthError::InvalidToken => "Invalid admin token",
        };
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized", "reason": reason })),
        )
            .into_response()
    }
}
