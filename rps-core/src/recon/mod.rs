//! Client side of the secret-reconstruction service.
//!
//! Reconstruction is fire-and-forget: the [`ReconDispatcher`] spawns each call
//! on its own task, bounds it with a timeout and only logs the outcome. Callers
//! never see a reconstruction failure.

pub mod http;
pub mod log_only;

pub use http::HttpReconClient;
pub use log_only::LogOnlyReconClient;

use crate::error::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const INIT_RECON: &str = "initRecon";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconRequest {
    pub function: String,
    pub reference: String,
    pub namespace: String,
}

impl ReconRequest {
    pub fn init_recon(reference: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            function: INIT_RECON.to_string(),
            reference: reference.into(),
            namespace: namespace.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconResponse {
    pub status: u16,
    #[serde(default)]
    pub message: String,
}

impl ReconResponse {
    pub const OK: u16 = 200;

    pub fn ok() -> Self {
        Self {
            status: Self::OK,
            message: String::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Self::OK
    }
}

#[async_trait]
pub trait ReconstructionClient: Send + Sync {
    async fn init_recon(&self, request: &ReconRequest) -> Result<ReconResponse>;
}

pub struct ReconDispatcher {
    client: Arc<dyn ReconstructionClient>,
    timeout: Duration,
    inflight: Mutex<Vec<JoinHandle<()>>>,
}

impl ReconDispatcher {
    pub fn new(client: Arc<dyn ReconstructionClient>, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            inflight: Mutex::new(Vec::new()),
        }
    }

    /// Spawn the call and return immediately. Must be called inside a tokio runtime.
    pub fn dispatch(&self, request: ReconRequest) {
        let client = self.client.clone();
        let timeout = self.timeout;

        let handle = tokio::spawn(async move {
            match tokio::time::timeout(timeout, client.init_recon(&request)).await {
                Ok(Ok(response)) if response.is_ok() => {
                    tracing::info!(
                        "Reconstruction started for {} in namespace {}",
                        request.reference,
                        request.namespace
                    );
                }
                Ok(Ok(response)) => {
                    tracing::warn!(
                        "Reconstruction for {} rejected with status {}: {}",
                        request.reference,
                        response.status,
                        response.message
                    );
                }
                Ok(Err(e)) => {
                    tracing::warn!("Reconstruction for {} failed: {}", request.reference, e);
                }
                Err(_) => {
                    tracing::warn!(
                        "Reconstruction for {} timed out after {:?}",
                        request.reference,
                        timeout
                    );
                }
            }
        });

        let mut inflight = self.inflight.lock();
        inflight.retain(|h| !h.is_finished());
        inflight.push(handle);
    }

    pub fn in_flight(&self) -> usize {
        self.inflight.lock().iter().filter(|h| !h.is_finished()).count()
    }

    /// Wait for every call dispatched so far.
    pub async fn drain(&self) {
        let handles = std::mem::take(&mut *self.inflight.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!("Reconstruction task aborted: {}", e);
            }
        }
    }
}
