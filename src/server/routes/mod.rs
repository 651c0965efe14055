pub mod account;
pub mod admin;
pub mod share;

use serde::Deserialize;

/// `{"id": ...}` body shared by the by-id admin actions.
#[derive(Debug, Deserialize)]
pub struct IdRequest {
    pub id: i64,
}

/// `{"accountId": ...}` body of the per-account queries.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountIdRequest {
    pub account_id: i64,
}
