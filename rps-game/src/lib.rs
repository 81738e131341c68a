//! Rock-paper-scissors over a versioned ledger
//!
//! Two players take the seats of a named game, each receiving a move-cell
//! reference under which their move is deposited out-of-band. Once the game's
//! duration has elapsed, ending it asks the reconstruction service to open
//! both cells. Outcome computation happens downstream.

pub mod cell;
pub mod contract;
pub mod error;
pub mod record;
pub mod service;

#[cfg(test)]
mod testing;

pub use cell::derive_cell_ref;
pub use contract::{GameContract, Operation, Response, Status};
pub use error::{GameError, Result};
pub use record::{Game, GamePhase};
pub use service::{EndOutcome, GameService};

use rps_core::{
    Clock, HttpReconClient, Ledger, LogOnlyReconClient, ReconDispatcher, ReconstructionClient,
    RpsConfig,
};
use std::sync::Arc;

/// Build a service wired the way `config` says.
pub fn build_service(
    config: &RpsConfig,
    ledger: Arc<dyn Ledger>,
    clock: Arc<dyn Clock>,
) -> Result<GameService> {
    config.validate()?;

    let client: Arc<dyn ReconstructionClient> = match config.recon.endpoint {
        Some(_) => Arc::new(HttpReconClient::from_config(&config.recon)?),
        None => Arc::new(LogOnlyReconClient),
    };
    let recon = ReconDispatcher::new(client, config.recon.timeout());

    Ok(GameService::new(ledger, recon, clock)
        .with_cell_scheme(config.cell_scheme)
        .with_namespace(config.namespace.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rps_core::{CellScheme, MemoryLedger, SystemClock};

    #[tokio::test]
    async fn test_build_from_config() {
        let mut config = RpsConfig::default();
        config.cell_scheme = CellScheme::Deterministic;

        let service = build_service(
            &config,
            Arc::new(MemoryLedger::new()),
            Arc::new(SystemClock),
        )
        .unwrap();

        assert_eq!(
            service.create_game("g1", "0", "alice").await.unwrap(),
            "rpsalicecell"
        );
        assert!(matches!(
            service.end_game("g1").await.unwrap(),
            EndOutcome::Settled { .. }
        ));
        service.drain_reconstructions().await;
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = RpsConfig::default();
        config.recon.timeout_secs = 0;

        let result = build_service(
            &config,
            Arc::new(MemoryLedger::new()),
            Arc::new(SystemClock),
        );
        assert!(matches!(result, Err(GameError::Core(_))));
    }
}
