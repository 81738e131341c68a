//! RPS core - ledger and reconstruction-service plumbing
//!
//! This library provides the collaborators the game logic is written against:
//! a versioned key/value ledger, a fire-and-forget client for the
//! secret-reconstruction service, a clock and the shared configuration.

pub mod clock;
pub mod config;
pub mod error;
pub mod ledger;
pub mod recon;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CellScheme, ReconConfig, RpsConfig};
pub use error::{CoreError, Result};
pub use ledger::{Ledger, MemoryLedger, SqliteLedger};
pub use recon::{
    HttpReconClient, LogOnlyReconClient, ReconDispatcher, ReconRequest, ReconResponse,
    ReconstructionClient,
};
