use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum HelperError {
    /// Missing share/account, or an account with no way to obtain a token.
    #[error("Record not found")]
    NotFound,

    #[error("Refresh-token exchange failed: {0}")]
    CredentialExchange(String),

    #[error("Access token expiry could not be decoded: {0}")]
    TokenDecode(String),

    #[error("Invalid expiration date: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Share token registration failed: {0}")]
    UpstreamRegistration(String),

    #[error("{0}")]
    Validation(String),

    /// The primary write went through, but the follow-up refresh did not.
    #[error("updated successfully, but refresh reported a problem: {0}")]
    UpdatedWithIssues(Box<HelperError>),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for HelperError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => HelperError::NotFound,
            other => HelperError::DatabaseError(other),
        }
    }
}

impl HelperError {
    pub fn validation(message: impl Into<String>) -> Self {
        HelperError::Validation(message.into())
    }

    pub(crate) fn wrong_credentials() -> Self {
        HelperError::validation("wrong username or password")
    }
}

impl IntoResponse for HelperError {
    fn into_response(self) -> axum::response::Response {
        let message = self.to_string();
        let (status, code) = match &self {
            HelperError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            HelperError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            HelperError::TokenDecode(_) => (StatusCode::UNPROCESSABLE_ENTITY, "TOKEN_DECODE_ERROR"),
            HelperError::DateParse(_) => (StatusCode::UNPROCESSABLE_ENTITY, "DATE_PARSE_ERROR"),
            HelperError::CredentialExchange(_) => {
                (StatusCode::BAD_GATEWAY, "CREDENTIAL_EXCHANGE_ERROR")
            }
            HelperError::UpstreamRegistration(_) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_REGISTRATION_ERROR")
            }
            HelperError::UpdatedWithIssues(_) => (StatusCode::BAD_GATEWAY, "UPDATED_WITH_ISSUES"),
            HelperError::UpstreamStatus(_)
            | HelperError::ReqwestError(_)
            | HelperError::UrlError(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            HelperError::JsonError(_) => (StatusCode::BAD_GATEWAY, "BAD_UPSTREAM_PAYLOAD"),
            HelperError::DatabaseError(_) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiErrorBody {
                        inner: ApiErrorObject {
                            code: "INTERNAL_ERROR".to_string(),
                            message: "An internal server error occurred.".to_string(),
                        },
                    }),
                )
                    .into_response();
            }
        };
        (
            status,
            Json(ApiErrorBody {
                inner: ApiErrorObject {
                    code: code.to_string(),
                    message,
                },
            }),
        )
            .into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
