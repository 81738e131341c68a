use crate::error::Result;
use crate::ledger::Ledger;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    version: u64,
}

/// In-memory ledger, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: RwLock<BTreeMap<String, Entry>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).map(|e| e.value.clone()))
    }

    async fn get_versioned(&self, key: &str) -> Result<Option<(Vec<u8>, u64)>> {
        Ok(self
            .entries
            .read()
            .get(key)
            .map(|e| (e.value.clone(), e.version)))
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self.entries.write();
        let version = entries.get(key).map_or(0, |e| e.version) + 1;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                version,
            },
        );
        Ok(())
    }

    async fn put_if_version(
        &self,
        key: &str,
        value: &[u8],
        expected: Option<u64>,
    ) -> Result<bool> {
        let mut entries = self.entries.write();
        let current = entries.get(key).map(|e| e.version);
        if current != expected {
            return Ok(false);
        }

        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                version: current.unwrap_or(0) + 1,
            },
        );
        Ok(true)
    }

    async fn version(&self, key: &str) -> Result<Option<u64>> {
        Ok(self.entries.read().get(key).map(|e| e.version))
    }

    async fn scan(&self) -> Result<Vec<(String, Vec<u8>)>> {
        Ok(self
            .entries
            .read()
            .iter()
            .map(|(k, e)| (k.clone(), e.value.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_versions_and_ordering() {
        let ledger = MemoryLedger::new();
        assert!(ledger.is_empty());

        ledger.put("b", b"1").await.unwrap();
        ledger.put("a", b"1").await.unwrap();
        ledger.put("b", b"2").await.unwrap();

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.version("b").await.unwrap(), Some(2));
        assert_eq!(ledger.get("b").await.unwrap(), Some(b"2".to_vec()));

        let keys: Vec<String> = ledger.scan().await.unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn test_put_if_version() {
        let ledger = MemoryLedger::new();

        assert!(ledger.put_if_version("g1", b"a", None).await.unwrap());
        assert!(!ledger.put_if_version("g1", b"b", None).await.unwrap());
        assert!(!ledger.put_if_version("g1", b"b", Some(2)).await.unwrap());
        assert!(ledger.put_if_version("g1", b"b", Some(1)).await.unwrap());

        assert_eq!(ledger.get_versioned("g1").await.unwrap(), Some((b"b".to_vec(), 2)));
    }
}
