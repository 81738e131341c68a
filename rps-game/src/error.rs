use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Ledger error: {0}")]
    Core(#[from] rps_core::CoreError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Game not found: {0}")]
    NotFound(String),

    #[error("Game already exists: {0}")]
    AlreadyExists(String),

    #[error("Game {name} already joined by {player}")]
    AlreadyJoined { name: String, player: String },

    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl GameError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_storage())
    }
}
