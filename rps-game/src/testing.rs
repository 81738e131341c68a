//! Ledger doubles shared by the unit tests.

use async_trait::async_trait;
use rps_core::{CoreError, Ledger, MemoryLedger};
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory ledger whose reads or writes can be switched to fail.
#[derive(Default)]
pub(crate) struct FaultyLedger {
    inner: MemoryLedger,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FaultyLedger {
    pub(crate) fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool) -> rps_core::Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(CoreError::storage("ledger unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl Ledger for FaultyLedger {
    async fn get(&self, key: &str) -> rps_core::Result<Option<Vec<u8>>> {
        Self::check(&self.fail_reads)?;
        self.inner.get(key).await
    }

    async fn get_versioned(&self, key: &str) -> rps_core::Result<Option<(Vec<u8>, u64)>> {
        Self::check(&self.fail_reads)?;
        self.inner.get_versioned(key).await
    }

    async fn put(&self, key: &str, value: &[u8]) -> rps_core::Result<()> {
        Self::check(&self.fail_writes)?;
        self.inner.put(key, value).await
    }

    async fn put_if_version(
        &self,
        key: &str,
        value: &[u8],
        expected: Option<u64>,
    ) -> rps_core::Result<bool> {
        Self::check(&self.fail_writes)?;
        self.inner.put_if_version(key, value, expected).await
    }

    async fn version(&self, key: &str) -> rps_core::Result<Option<u64>> {
        Self::check(&self.fail_reads)?;
        self.inner.version(key).await
    }

    async fn scan(&self) -> rps_core::Result<Vec<(String, Vec<u8>)>> {
        Self::check(&self.fail_reads)?;
        self.inner.scan().await
    }
}
