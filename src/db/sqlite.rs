use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

use crate::db::models::{Account, Share};
use crate::db::schema::SQLITE_INIT;
use crate::db::traits::Repository;
use crate::error::HelperError;

const ACCOUNT_COLUMNS: &str = "id, account_type, email, password, access_token, refresh_token, \
     session_key, shared, one_api_channel_id, created_at, updated_at";

// Aliased so the row names stay unqualified when the account table is joined in.
const SHARE_COLUMNS: &str = "share.id AS id, share.account_id AS account_id, \
     share.unique_name AS unique_name, share.share_token AS share_token, \
     share.share_type AS share_type, share.expires_in AS expires_in, \
     share.expires_at AS expires_at, share.site_limit AS site_limit, \
     share.gpt35_limit AS gpt35_limit, share.gpt4_limit AS gpt4_limit, \
     share.gpt4o_limit AS gpt4o_limit, share.gpt4o_mini_limit AS gpt4o_mini_limit, \
     share.o1_limit AS o1_limit, share.o1_mini_limit AS o1_mini_limit, \
     share.show_conversations AS show_conversations, share.show_userinfo AS show_userinfo, \
     share.temporary_chat AS temporary_chat, share.comment AS comment, \
     share.password AS password, share.created_at AS created_at, \
     share.updated_at AS updated_at";

/// SQLite-backed [`Repository`].
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Opens (creating if missing) the database and applies the schema.
    pub async fn connect(database_url: &str) -> Result<Self, HelperError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        apply_schema(&pool).await?;

        info!("SQLite repository initialized");
        Ok(Self { pool })
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn get_account(&self, id: i64) -> Result<Account, HelperError> {
        let row = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account WHERE id = ?"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_account(&self, account: &Account) -> Result<i64, HelperError> {
        let now = Utc::now();
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO account (
                account_type, email, password, access_token, refresh_token, session_key,
                shared, one_api_channel_id, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&account.account_type)
        .bind(&account.email)
        .bind(&account.password)
        .bind(&account.access_token)
        .bind(&account.refresh_token)
        .bind(&account.session_key)
        .bind(account.shared)
        .bind(&account.one_api_channel_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        debug!(table = "account", id, "row created");
        Ok(id)
    }

    async fn update_account(&self, account: &Account) -> Result<(), HelperError> {
        let updated_at = Utc::now();
        // A blank password means "unchanged": responses never carry it back.
        let res = sqlx::query(
            r#"
            UPDATE account
            SET
                account_type = ?,
                email = ?,
                password = CASE WHEN ? = '' THEN password ELSE ? END,
                access_token = ?,
                refresh_token = ?,
                session_key = ?,
                shared = ?,
                one_api_channel_id = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&account.account_type)
        .bind(&account.email)
        .bind(&account.password)
        .bind(&account.password)
        .bind(&account.access_token)
        .bind(&account.refresh_token)
        .bind(&account.session_key)
        .bind(account.shared)
        .bind(&account.one_api_channel_id)
        .bind(updated_at)
        .bind(account.id)
        .execute(&self.pool)
        .await?;

        let affected = res.rows_affected();
        debug!(table = "account", id = account.id, affected, "row updated");
        if affected == 0 {
            return Err(HelperError::NotFound);
        }
        Ok(())
    }

    async fn delete_account(&self, id: i64) -> Result<(), HelperError> {
        let res = sqlx::query("DELETE FROM account WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(HelperError::NotFound);
        }
        Ok(())
    }

    async fn search_accounts(
        &self,
        account_type: &str,
        keyword: &str,
    ) -> Result<Vec<Account>, HelperError> {
        let rows = sqlx::query_as::<_, Account>(&format!(
            r#"
            SELECT {ACCOUNT_COLUMNS}
            FROM account
            WHERE (? = '' OR account_type = ? OR (? = 'chatgpt' AND account_type = ''))
              AND email LIKE '%' || ? || '%'
            ORDER BY id
            "#
        ))
        .bind(account_type)
        .bind(account_type)
        .bind(account_type)
        .bind(keyword)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_shared_accounts(&self) -> Result<Vec<Account>, HelperError> {
        let rows = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account WHERE shared = 1 ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_share(&self, id: i64) -> Result<Share, HelperError> {
        let row = sqlx::query_as::<_, Share>(&format!(
            "SELECT {SHARE_COLUMNS} FROM share WHERE share.id = ?"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_share_by_unique_name(&self, unique_name: &str) -> Result<Share, HelperError> {
        let row = sqlx::query_as::<_, Share>(&format!(
            "SELECT {SHARE_COLUMNS} FROM share WHERE share.unique_name = ?"
        ))
        .bind(unique_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_share(&self, share: &Share) -> Result<i64, HelperError> {
        let now = Utc::now();
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO share (
                account_id, unique_name, share_token, share_type, expires_in, expires_at,
                site_limit, gpt35_limit, gpt4_limit, gpt4o_limit, gpt4o_mini_limit, o1_limit,
                o1_mini_limit, show_conversations, show_userinfo, temporary_chat, comment,
                password, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(share.account_id)
        .bind(&share.unique_name)
        .bind(&share.share_token)
        .bind(&share.share_type)
        .bind(share.expires_in)
        .bind(&share.expires_at)
        .bind(&share.site_limit)
        .bind(share.gpt35_limit)
        .bind(share.gpt4_limit)
        .bind(share.gpt4o_limit)
        .bind(share.gpt4o_mini_limit)
        .bind(share.o1_limit)
        .bind(share.o1_mini_limit)
        .bind(share.show_conversations)
        .bind(share.show_userinfo)
        .bind(share.temporary_chat)
        .bind(&share.comment)
        .bind(&share.password)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        debug!(table = "share", id, "row created");
        Ok(id)
    }

    async fn update_share(&self, share: &Share) -> Result<(), HelperError> {
        let updated_at = Utc::now();
        let res = sqlx::query(
            r#"
            UPDATE share
            SET
                account_id = ?,
                unique_name = ?,
                share_token = ?,
                share_type = ?,
                expires_in = ?,
                expires_at = ?,
                site_limit = ?,
                gpt35_limit = ?,
                gpt4_limit = ?,
                gpt4o_limit = ?,
                gpt4o_mini_limit = ?,
                o1_limit = ?,
                o1_mini_limit = ?,
                show_conversations = ?,
                show_userinfo = ?,
                temporary_chat = ?,
                comment = ?,
                password = CASE WHEN ? = '' THEN password ELSE ? END,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(share.account_id)
        .bind(&share.unique_name)
        .bind(&share.share_token)
        .bind(&share.share_type)
        .bind(share.expires_in)
        .bind(&share.expires_at)
        .bind(&share.site_limit)
        .bind(share.gpt35_limit)
        .bind(share.gpt4_limit)
        .bind(share.gpt4o_limit)
        .bind(share.gpt4o_mini_limit)
        .bind(share.o1_limit)
        .bind(share.o1_mini_limit)
        .bind(share.show_conversations)
        .bind(share.show_userinfo)
        .bind(share.temporary_chat)
        .bind(&share.comment)
        .bind(&share.password)
        .bind(&share.password)
        .bind(updated_at)
        .bind(share.id)
        .execute(&self.pool)
        .await?;

        let affected = res.rows_affected();
        debug!(table = "share", id = share.id, affected, "row updated");
        if affected == 0 {
            return Err(HelperError::NotFound);
        }
        Ok(())
    }

    async fn delete_share(&self, id: i64) -> Result<(), HelperError> {
        let res = sqlx::query("DELETE FROM share WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(HelperError::NotFound);
        }
        Ok(())
    }

    async fn search_shares(
        &self,
        email: &str,
        unique_name: &str,
    ) -> Result<Vec<Share>, HelperError> {
        let rows = sqlx::query_as::<_, Share>(&format!(
            r#"
            SELECT {SHARE_COLUMNS}
            FROM share
            LEFT JOIN account ON account.id = share.account_id
            WHERE COALESCE(account.email, '') LIKE '%' || ? || '%'
              AND share.unique_name LIKE '%' || ? || '%'
            ORDER BY share.id
            "#
        ))
        .bind(email)
        .bind(unique_name)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_shares_by_account_id(&self, account_id: i64) -> Result<Vec<Share>, HelperError> {
        let rows = sqlx::query_as::<_, Share>(&format!(
            "SELECT {SHARE_COLUMNS} FROM share WHERE share.account_id = ? ORDER BY share.id"
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), HelperError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
