//! Database module: models, schema and the repository used by the services.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `traits.rs`: the `Repository` boundary
//! - `sqlite.rs`: `SqliteRepository`, the only implementation

pub mod models;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use models::{Account, AccountType, EXPIRED_MARKER, Share, UNLIMITED};
pub use schema::SQLITE_INIT;
pub use sqlite::SqliteRepository;
pub use traits::Repository;
