use crate::cell::derive_cell_ref;
use crate::record::Game;
use crate::{GameError, Result};
use parking_lot::Mutex;
use rps_core::config::DEFAULT_NAMESPACE;
use rps_core::{CellScheme, Clock, Ledger, ReconDispatcher, ReconRequest};
use std::collections::HashMap;
use std::sync::Arc;

/// What `end_game` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndOutcome {
    /// Deadline passed; reconstruction was requested for both move cells.
    Settled { references: [String; 2] },
    /// Deadline not reached yet.
    Pending { remaining_secs: i64 },
}

impl EndOutcome {
    /// Host-facing payload: `"None"` once settled, otherwise the seconds left.
    pub fn payload(&self) -> String {
        match self {
            Self::Settled { .. } => crate::record::NONE.to_string(),
            Self::Pending { remaining_secs } => remaining_secs.to_string(),
        }
    }
}

/// The game lifecycle: create, join, settle.
///
/// Writes to one game name are serialised in-process, and every write is
/// conditional on the version that was read, so a writer in another process
/// holding its own ledger handle cannot be silently overwritten.
pub struct GameService {
    ledger: Arc<dyn Ledger>,
    recon: ReconDispatcher,
    clock: Arc<dyn Clock>,
    scheme: CellScheme,
    namespace: String,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl GameService {
    pub fn new(ledger: Arc<dyn Ledger>, recon: ReconDispatcher, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger,
            recon,
            clock,
            scheme: CellScheme::default(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_cell_scheme(mut self, scheme: CellScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    fn key_lock(&self, name: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    async fn load_versioned(&self, name: &str) -> Result<(Game, u64)> {
        let (bytes, version) = self
            .ledger
            .get_versioned(name)
            .await?
            .ok_or_else(|| GameError::NotFound(name.to_string()))?;

        if !Game::is_game_record(&bytes) {
            return Err(GameError::NotFound(name.to_string()));
        }
        Ok((Game::from_bytes(&bytes)?, version))
    }

    async fn load(&self, name: &str) -> Result<Game> {
        Ok(self.load_versioned(name).await?.0)
    }

    /// Create a game and return the creator's move-cell reference.
    pub async fn create_game(&self, name: &str, duration: &str, creator: &str) -> Result<String> {
        if name.is_empty() {
            return Err(GameError::invalid_argument("game name cannot be empty"));
        }
        if creator.is_empty() {
            return Err(GameError::invalid_argument("player id cannot be empty"));
        }

        let end_offset: i64 = duration.parse().map_err(|e| {
            GameError::invalid_argument(format!("duration {:?}: {}", duration, e))
        })?;
        if end_offset < 0 {
            return Err(GameError::invalid_argument(format!(
                "duration {:?} must not be negative",
                duration
            )));
        }

        let lock = self.key_lock(name);
        let _guard = lock.lock().await;

        let move1_ref = derive_cell_ref(self.scheme, creator);
        let game = Game::new(name, end_offset, creator, move1_ref.clone(), self.now());

        if !self
            .ledger
            .put_if_version(name, &game.to_bytes()?, None)
            .await?
        {
            return Err(GameError::AlreadyExists(name.to_string()));
        }

        tracing::info!(
            "Game {} created by {}, settleable in {}s",
            name,
            creator,
            end_offset
        );
        Ok(move1_ref)
    }

    /// Take the second seat and return the joiner's move-cell reference.
    pub async fn join_game(&self, name: &str, joiner: &str) -> Result<String> {
        if joiner.is_empty() {
            return Err(GameError::invalid_argument("player id cannot be empty"));
        }

        let lock = self.key_lock(name);
        let _guard = lock.lock().await;

        let (mut game, version) = self.load_versioned(name).await?;
        if game.is_joined() {
            return Err(GameError::AlreadyJoined {
                name: name.to_string(),
                player: game.player2,
            });
        }

        let move2_ref = derive_cell_ref(self.scheme, joiner);
        game.player2 = joiner.to_string();
        game.move2_ref = move2_ref.clone();

        if !self
            .ledger
            .put_if_version(name, &game.to_bytes()?, Some(version))
            .await?
        {
            // Another process wrote the record since we read it.
            let current = self.load(name).await?;
            return Err(GameError::AlreadyJoined {
                name: name.to_string(),
                player: current.player2,
            });
        }

        tracing::info!("Player {} joined game {}", joiner, name);
        Ok(move2_ref)
    }

    /// Settle the game if its deadline has passed.
    ///
    /// Settling dispatches one reconstruction request per move cell and returns
    /// without waiting for them. Their failures are logged, never returned.
    pub async fn end_game(&self, name: &str) -> Result<EndOutcome> {
        let game = self.load(name).await?;
        let now = self.now();

        if !game.is_settleable(now) {
            let remaining_secs = game.remaining_secs(now);
            tracing::info!("Game {} not settleable for another {}s", name, remaining_secs);
            return Ok(EndOutcome::Pending { remaining_secs });
        }

        tracing::info!("Game {} settling, starting reconstruction", name);
        for reference in [&game.move1_ref, &game.move2_ref] {
            self.recon
                .dispatch(ReconRequest::init_recon(reference.as_str(), self.namespace.as_str()));
        }

        Ok(EndOutcome::Settled {
            references: [game.move1_ref, game.move2_ref],
        })
    }

    pub async fn game(&self, name: &str) -> Result<Game> {
        self.load(name).await
    }

    /// Every game record in the ledger, skipping other record kinds.
    pub async fn list_games(&self) -> Result<Vec<Game>> {
        let mut games = Vec::new();
        for (key, bytes) in self.ledger.scan().await? {
            if !Game::is_game_record(&bytes) {
                continue;
            }
            match Game::from_bytes(&bytes) {
                Ok(game) => games.push(game),
                Err(e) => tracing::warn!("Skipping unreadable game record {}: {}", key, e),
            }
        }
        Ok(games)
    }

    pub async fn version(&self, name: &str) -> Result<Option<u64>> {
        Ok(self.ledger.version(name).await?)
    }

    /// Wait for outstanding reconstruction calls.
    pub async fn drain_reconstructions(&self) {
        self.recon.drain().await;
    }
}
