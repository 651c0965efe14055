use crate::error::HelperError;
use crate::server::router::AppState;
use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub token: String,
}

/// POST /api/login
pub async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<AdminLoginRequest>,
) -> Result<Json<AdminLoginResponse>, HelperError> {
    let expected = state.admin_password.as_ref();
    let ok = !expected.is_empty() && bool::from(req.password.as_bytes().ct_eq(expected.as_bytes()));
    if !ok {
        warn!("admin login rejected");
        return Err(HelperError::wrong_credentials());
    }
    info!("admin login accepted");
    Ok(Json(AdminLoginResponse {
        token: state.admin_token.to_string(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/login", post(admin_login))
}
