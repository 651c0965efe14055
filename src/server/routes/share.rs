use crate::db::Share;
use crate::error::HelperError;
use crate::server::router::AppState;
use crate::server::routes::{AccountIdRequest, IdRequest};
use crate::service::ShareAccountList;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShareSearchRequest {
    pub email: String,
    pub unique_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ShareLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResetPasswordRequest {
    pub unique_name: String,
    pub password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareAccountLoginRequest {
    pub id: i64,
    pub unique_name: String,
    #[serde(default)]
    pub select_type: String,
}

#[derive(Debug, Serialize)]
pub struct LoginUrlResponse {
    pub url: String,
}

pub async fn share_search(
    State(state): State<AppState>,
    Json(req): Json<ShareSearchRequest>,
) -> Result<Json<Vec<Share>>, HelperError> {
    let shares = state
        .services
        .shares
        .search(&req.email, &req.unique_name)
        .await?;
    Ok(Json(shares))
}

pub async fn share_get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Share>, HelperError> {
    Ok(Json(state.services.shares.get(id).await?))
}

pub async fn share_by_account(
    State(state): State<AppState>,
    Json(req): Json<AccountIdRequest>,
) -> Result<Json<Vec<Share>>, HelperError> {
    let shares = state
        .services
        .shares
        .shares_by_account(req.account_id)
        .await?;
    Ok(Json(shares))
}

pub async fn share_add(
    State(state): State<AppState>,
    Json(share): Json<Share>,
) -> Result<Json<Share>, HelperError> {
    Ok(Json(state.services.shares.create(share).await?))
}

pub async fn share_update(
    State(state): State<AppState>,
    Json(share): Json<Share>,
) -> Result<Json<Share>, HelperError> {
    Ok(Json(state.services.shares.update(share).await?))
}

pub async fn share_delete(
    State(state): State<AppState>,
    Json(req): Json<IdRequest>,
) -> Result<StatusCode, HelperError> {
    state.services.shares.delete(req.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn share_reset_limit(
    State(state): State<AppState>,
    Json(req): Json<IdRequest>,
) -> Result<StatusCode, HelperError> {
    state.services.shares.reset_limit(req.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/share/login
pub async fn share_login(
    State(state): State<AppState>,
    Json(req): Json<ShareLoginRequest>,
) -> Result<Json<LoginUrlResponse>, HelperError> {
    let url = state
        .services
        .shares
        .login_by_password(&req.username, &req.password)
        .await?;
    Ok(Json(LoginUrlResponse { url }))
}

/// POST /api/share/reset-password
pub async fn share_reset_password(
    State(state): State<AppState>,
    Json(req): Json<ShareResetPasswordRequest>,
) -> Result<StatusCode, HelperError> {
    state
        .services
        .shares
        .reset_password(
            &req.unique_name,
            &req.password,
            &req.new_password,
            &req.confirm_new_password,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/share/accounts
pub async fn share_accounts(
    State(state): State<AppState>,
) -> Result<Json<ShareAccountList>, HelperError> {
    Ok(Json(state.services.accounts.share_account_list().await?))
}

/// POST /api/share/account-login
pub async fn share_account_login(
    State(state): State<AppState>,
    Json(req): Json<ShareAccountLoginRequest>,
) -> Result<Json<LoginUrlResponse>, HelperError> {
    let url = state
        .services
        .accounts
        .login_share_account(req.id, &req.unique_name, &req.select_type)
        .await?;
    Ok(Json(LoginUrlResponse { url }))
}

/// End-user routes; no admin token required.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/api/share/login", post(share_login))
        .route("/api/share/reset-password", post(share_reset_password))
        .route("/api/share/accounts", get(share_accounts))
        .route("/api/share/account-login", post(share_account_login))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/api/share/search", post(share_search))
        .route("/api/share/{id}", get(share_get))
        .route("/api/share/by-account", post(share_by_account))
        .route("/api/share/add", post(share_add))
        .route("/api/share/update", post(share_update))
        .route("/api/share/delete", post(share_delete))
        .route("/api/share/reset-limit", post(share_reset_limit))
}
