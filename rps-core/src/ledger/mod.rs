//! Key/value ledger the game state lives in.
//!
//! The ledger is an injected collaborator: the game layer only ever reads and
//! writes whole records by key. Durability and atomicity of a single `put`
//! are the backend's responsibility.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;

use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Read the current value under `key`, `None` if the key was never written.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Current value together with its version.
    async fn get_versioned(&self, key: &str) -> Result<Option<(Vec<u8>, u64)>>;

    /// Write `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Compare-and-swap write. `expected: None` only succeeds if the key is
    /// absent, `Some(v)` only if the key is still at version `v`. Returns
    /// `false` without writing when the check fails.
    async fn put_if_version(
        &self,
        key: &str,
        value: &[u8],
        expected: Option<u64>,
    ) -> Result<bool>;

    /// Number of writes the key has seen, `None` if absent.
    async fn version(&self, key: &str) -> Result<Option<u64>>;

    /// All entries ordered by key.
    async fn scan(&self) -> Result<Vec<(String, Vec<u8>)>>;
}
