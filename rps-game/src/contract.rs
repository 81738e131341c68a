//! Host-facing entry point: operation name plus positional arguments in,
//! status and payload out.

use crate::service::GameService;
use crate::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

pub const INVALID_ENDPOINT: &str = "Invalid endpoint";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    CreateGame {
        name: String,
        duration: String,
        creator: String,
    },
    JoinGame {
        name: String,
        joiner: String,
    },
    EndGame {
        name: String,
    },
    Unknown(String),
}

fn expect_args(function: &str, args: &[String], needed: usize) -> Result<()> {
    if args.len() < needed {
        return Err(GameError::invalid_argument(format!(
            "{} expects {} arguments, got {}",
            function,
            needed,
            args.len()
        )));
    }
    Ok(())
}

impl Operation {
    /// Extra arguments are ignored; too few for a known operation is an error.
    pub fn parse(function: &str, args: &[String]) -> Result<Self> {
        let op = match function {
            "createGame" => {
                expect_args(function, args, 3)?;
                Self::CreateGame {
                    name: args[0].clone(),
                    duration: args[1].clone(),
                    creator: args[2].clone(),
                }
            }
            "joinGame" => {
                expect_args(function, args, 2)?;
                Self::JoinGame {
                    name: args[0].clone(),
                    joiner: args[1].clone(),
                }
            }
            "endGame" => {
                expect_args(function, args, 1)?;
                Self::EndGame {
                    name: args[0].clone(),
                }
            }
            other => Self::Unknown(other.to_string()),
        };
        Ok(op)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::CreateGame { .. } => "createGame",
            Self::JoinGame { .. } => "joinGame",
            Self::EndGame { .. } => "endGame",
            Self::Unknown(function) => function,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    pub payload: Vec<u8>,
    pub message: String,
}

impl Response {
    pub fn success(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload: payload.into(),
            message: String::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            payload: Vec::new(),
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    pub fn payload_str(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

pub struct GameContract {
    service: Arc<GameService>,
}

impl GameContract {
    pub fn new(service: Arc<GameService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &GameService {
        &self.service
    }

    pub async fn invoke(&self, function: &str, args: &[String]) -> Response {
        let tx_id = Uuid::new_v4();
        let span = tracing::info_span!("invoke", %tx_id, function);

        match self.execute(function, args).instrument(span).await {
            Ok(payload) => Response::success(payload),
            Err(e) => {
                if e.is_storage() {
                    tracing::error!("{} failed: {}", function, e);
                } else {
                    tracing::warn!("{} failed: {}", function, e);
                }
                Response::error(e.to_string())
            }
        }
    }

    async fn execute(&self, function: &str, args: &[String]) -> Result<String> {
        let op = Operation::parse(function, args)?;
        tracing::debug!("In {} endpoint", op.name());

        match op {
            Operation::CreateGame {
                name,
                duration,
                creator,
            } => self.service.create_game(&name, &duration, &creator).await,
            Operation::JoinGame { name, joiner } => self.service.join_game(&name, &joiner).await,
            Operation::EndGame { name } => Ok(self.service.end_game(&name).await?.payload()),
            Operation::Unknown(_) => Ok(INVALID_ENDPOINT.to_string()),
        }
    }
}
