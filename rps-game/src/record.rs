use serde::{Deserialize, Serialize};

/// Discriminator stored in `docType`.
pub const GAME_DOC_TYPE: &str = "game";

/// Placeholder for fields that have no value yet.
pub const NONE: &str = "None";

/// A game as persisted in the ledger, keyed by `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    #[serde(rename = "docType")]
    pub doc_type: String,
    pub name: String,
    /// Seconds after `created_at` at which the game becomes settleable.
    #[serde(rename = "end")]
    pub end_offset: i64,
    #[serde(rename = "m1")]
    pub move1_ref: String,
    #[serde(rename = "m2")]
    pub move2_ref: String,
    #[serde(rename = "u1")]
    pub player1: String,
    #[serde(rename = "u2")]
    pub player2: String,
    #[serde(rename = "time")]
    pub created_at: i64,
    pub result: String,
}

/// Where a game stands at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Created,
    Joined,
    Settleable,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Joined => "joined",
            Self::Settleable => "settleable",
        }
    }
}

impl Game {
    pub fn new(name: &str, end_offset: i64, player1: &str, move1_ref: String, now: i64) -> Self {
        Self {
            doc_type: GAME_DOC_TYPE.to_string(),
            name: name.to_string(),
            end_offset,
            move1_ref,
            move2_ref: NONE.to_string(),
            player1: player1.to_string(),
            player2: NONE.to_string(),
            created_at: now,
            result: NONE.to_string(),
        }
    }

    pub fn is_joined(&self) -> bool {
        self.player2 != NONE
    }

    pub fn deadline(&self) -> i64 {
        self.created_at.saturating_add(self.end_offset)
    }

    pub fn is_settleable(&self, now: i64) -> bool {
        now >= self.deadline()
    }

    /// Seconds until settleable, zero once the deadline has passed.
    pub fn remaining_secs(&self, now: i64) -> i64 {
        (self.deadline() - now).max(0)
    }

    pub fn phase(&self, now: i64) -> GamePhase {
        if self.is_settleable(now) {
            GamePhase::Settleable
        } else if self.is_joined() {
            GamePhase::Joined
        } else {
            GamePhase::Created
        }
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// True if `bytes` is a JSON object tagged as a game, whatever else it holds.
    pub fn is_game_record(bytes: &[u8]) -> bool {
        #[derive(Deserialize)]
        struct Tag {
            #[serde(rename = "docType")]
            doc_type: String,
        }

        serde_json::from_slice::<Tag>(bytes)
            .map(|t| t.doc_type == GAME_DOC_TYPE)
            .unwrap_or(false)
    }
}
