use crate::db::Account;
use crate::error::HelperError;
use crate::server::router::AppState;
use crate::server::routes::{AccountIdRequest, IdRequest};
use crate::service::ShareStatistic;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use pandora_schema::OneApiChannel;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountSearchRequest {
    pub account_type: String,
    pub keyword: String,
}

pub async fn account_search(
    State(state): State<AppState>,
    Json(req): Json<AccountSearchRequest>,
) -> Result<Json<Vec<Account>>, HelperError> {
    let accounts = state
        .services
        .accounts
        .search(&req.account_type, &req.keyword)
        .await?;
    Ok(Json(accounts))
}

pub async fn account_get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Account>, HelperError> {
    Ok(Json(state.services.accounts.get(id).await?))
}

pub async fn account_add(
    State(state): State<AppState>,
    Json(account): Json<Account>,
) -> Result<Json<Account>, HelperError> {
    Ok(Json(state.services.accounts.create(account).await?))
}

pub async fn account_update(
    State(state): State<AppState>,
    Json(account): Json<Account>,
) -> Result<StatusCode, HelperError> {
    state.services.accounts.update(account).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn account_delete(
    State(state): State<AppState>,
    Json(req): Json<IdRequest>,
) -> Result<StatusCode, HelperError> {
    state.services.accounts.delete(req.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn account_refresh(
    State(state): State<AppState>,
    Json(req): Json<IdRequest>,
) -> Result<StatusCode, HelperError> {
    state.services.accounts.refresh(req.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn account_statistic(
    State(state): State<AppState>,
    Json(req): Json<AccountIdRequest>,
) -> Result<Json<ShareStatistic>, HelperError> {
    Ok(Json(state.services.shares.statistic(req.account_id).await?))
}

pub async fn oneapi_channels(
    State(state): State<AppState>,
) -> Result<Json<Vec<OneApiChannel>>, HelperError> {
    Ok(Json(state.services.accounts.oneapi_channels().await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/account/search", post(account_search))
        .route("/api/account/{id}", get(account_get))
        .route("/api/account/add", post(account_add))
        .route("/api/account/update", post(account_update))
        .route("/api/account/delete", post(account_delete))
        .route("/api/account/refresh", post(account_refresh))
        .route("/api/account/statistic", post(account_statistic))
        .route("/api/account/channels", get(oneapi_channels))
}
