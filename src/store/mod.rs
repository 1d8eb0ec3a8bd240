//! Key-value store for vendor tokens, backed by SQLite.

pub mod kv;
pub mod refresh;
pub mod tokens;

pub use kv::KvStore;
pub use refresh::{refresh_cycle, refresh_daemon};
pub use tokens::{TokenKey, TokenRecord, TokenStore, TOKEN_TTL};
