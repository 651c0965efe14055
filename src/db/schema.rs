//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `account` table (one upstream credential set per row)
/// - `share` table (one end-user grant per row, owned by an account)
///
/// `share.account_id` is deliberately not a cascading foreign key: deleting an
/// account leaves its shares in place until they are deleted explicitly.
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Upstream accounts
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS account (
    id INTEGER PRIMARY KEY NOT NULL,
    account_type TEXT NOT NULL DEFAULT 'chatgpt',
    email TEXT NOT NULL DEFAULT '',
    password TEXT NOT NULL DEFAULT '',
    access_token TEXT NOT NULL DEFAULT '',
    refresh_token TEXT NOT NULL DEFAULT '',
    session_key TEXT NOT NULL DEFAULT '',
    shared INTEGER NOT NULL DEFAULT 0,
    one_api_channel_id TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_account_type ON account(account_type);

-- ---------------------------------------------------------------------------
-- Shares (one unique_name per row)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS share (
    id INTEGER PRIMARY KEY NOT NULL,
    account_id INTEGER NOT NULL,
    unique_name TEXT NOT NULL,
    share_token TEXT NOT NULL DEFAULT '',
    share_type TEXT NOT NULL DEFAULT '',
    expires_in INTEGER NOT NULL DEFAULT 0,
    expires_at TEXT NOT NULL DEFAULT '', -- YYYY-MM-DD or empty
    site_limit TEXT NOT NULL DEFAULT '',
    gpt35_limit INTEGER NOT NULL DEFAULT -1,
    gpt4_limit INTEGER NOT NULL DEFAULT -1,
    gpt4o_limit INTEGER NOT NULL DEFAULT -1,
    gpt4o_mini_limit INTEGER NOT NULL DEFAULT -1,
    o1_limit INTEGER NOT NULL DEFAULT -1,
    o1_mini_limit INTEGER NOT NULL DEFAULT -1,
    show_conversations INTEGER NOT NULL DEFAULT 0,
    show_userinfo INTEGER NOT NULL DEFAULT 0,
    temporary_chat INTEGER NOT NULL DEFAULT 0,
    comment TEXT NOT NULL DEFAULT '',
    password TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL, -- RFC3339
    UNIQUE(unique_name)
);

CREATE INDEX IF NOT EXISTS idx_share_account_id ON share(account_id);
"#;
