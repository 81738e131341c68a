use crate::error::Result;
use crate::recon::{ReconRequest, ReconResponse, ReconstructionClient};
use async_trait::async_trait;

/// Stand-in used when no reconstruction endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyReconClient;

#[async_trait]
impl ReconstructionClient for LogOnlyReconClient {
    async fn init_recon(&self, request: &ReconRequest) -> Result<ReconResponse> {
        tracing::info!(
            "No reconstruction endpoint; would call {}({}, {})",
            request.function,
            request.reference,
            request.namespace
        );
        Ok(ReconResponse::ok())
    }
}
