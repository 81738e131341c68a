use crate::error::{CoreError, Result};
use crate::ledger::Ledger;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;
use tokio::sync::Mutex;

/// How long a writer waits on another connection's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Ledger backed by a single sqlite table. Every write bumps the key's version.
pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    pub async fn open(db_path: &Path) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::storage(format!("Failed to create directory: {}", e)))?;
        }

        let conn = Connection::open(db_path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let ledger = Self {
            conn: Mutex::new(conn),
        };

        ledger.init_schema().await?;
        tracing::debug!("Opened ledger at {}", db_path.display());
        Ok(ledger)
    }

    async fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().await;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS ledger (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL,
                version INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }
}

#[async_trait]
impl Ledger for SqliteLedger {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.conn.lock().await;

        let value = conn
            .query_row(
                "SELECT value FROM ledger WHERE key = ?1",
                params![key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;

        Ok(value)
    }

    async fn get_versioned(&self, key: &str) -> Result<Option<(Vec<u8>, u64)>> {
        let conn = self.conn.lock().await;

        let entry = conn
            .query_row(
                "SELECT value, version FROM ledger WHERE key = ?1",
                params![key],
                |row| Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        Ok(entry.map(|(value, version)| (value, version as u64)))
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let conn = self.conn.lock().await;

        conn.execute(
            "INSERT INTO ledger (key, value, version, updated_at)
             VALUES (?1, ?2, 1, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                version = ledger.version + 1,
                updated_at = excluded.updated_at",
            params![key, value, Utc::now().timestamp()],
        )?;

        Ok(())
    }

    async fn put_if_version(
        &self,
        key: &str,
        value: &[u8],
        expected: Option<u64>,
    ) -> Result<bool> {
        let conn = self.conn.lock().await;
        let now = Utc::now().timestamp();

        // Single statements, so the check and the write are atomic even
        // against other connections on the same file.
        let changed = match expected {
            None => conn.execute(
                "INSERT OR IGNORE INTO ledger (key, value, version, updated_at)
                 VALUES (?1, ?2, 1, ?3)",
                params![key, value, now],
            )?,
            Some(version) => conn.execute(
                "UPDATE ledger SET value = ?2, version = version + 1, updated_at = ?3
                 WHERE key = ?1 AND version = ?4",
                params![key, value, now, version as i64],
            )?,
        };

        Ok(changed == 1)
    }

    async fn version(&self, key: &str) -> Result<Option<u64>> {
        let conn = self.conn.lock().await;

        let version = conn
            .query_row(
                "SELECT version FROM ledger WHERE key = ?1",
                params![key],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        Ok(version.map(|v| v as u64))
    }

    async fn scan(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare("SELECT key, value FROM ledger ORDER BY key")?;
        let entry_iter = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?))
        })?;

        let mut entries = Vec::new();
        for entry in entry_iter {
            entries.push(entry?);
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_key_reads_none() {
        let temp_dir = tempdir().unwrap();
        let ledger = SqliteLedger::open(&temp_dir.path().join("ledger.db"))
            .await
            .unwrap();

        assert!(ledger.get("nope").await.unwrap().is_none());
        assert!(ledger.version("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_bumps_version_and_survives_reopen() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("ledger.db");

        {
            let ledger = SqliteLedger::open(&db_path).await.unwrap();
            ledger.put("g1", b"first").await.unwrap();
            ledger.put("g1", b"second").await.unwrap();
            ledger.put("g2", b"other").await.unwrap();
            assert_eq!(ledger.version("g1").await.unwrap(), Some(2));
        }

        let reopened = SqliteLedger::open(&db_path).await.unwrap();
        assert_eq!(reopened.get("g1").await.unwrap(), Some(b"second".to_vec()));
        assert_eq!(reopened.version("g2").await.unwrap(), Some(1));

        assert_eq!(
            reopened.get_versioned("g1").await.unwrap(),
            Some((b"second".to_vec(), 2))
        );

        let keys: Vec<String> = reopened
            .scan()
            .await
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["g1".to_string(), "g2".to_string()]);
    }

    #[tokio::test]
    async fn test_put_if_version_across_connections() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("ledger.db");
        let first = SqliteLedger::open(&db_path).await.unwrap();
        let second = SqliteLedger::open(&db_path).await.unwrap();

        assert!(first.put_if_version("g1", b"a", None).await.unwrap());
        assert!(!second.put_if_version("g1", b"b", None).await.unwrap());

        assert!(second.put_if_version("g1", b"b", Some(1)).await.unwrap());
        assert!(!first.put_if_version("g1", b"c", Some(1)).await.unwrap());

        assert_eq!(first.get_versioned("g1").await.unwrap(), Some((b"b".to_vec(), 2)));
        assert!(!first.put_if_version("ghost", b"x", Some(1)).await.unwrap());
        assert!(first.get("ghost").await.unwrap().is_none());
    }
}
