// Error types for the simulation
//
// The simulation has no external I/O beyond loading its config, so most
// failures are bookkeeping problems (a handle that no longer resolves) that
// callers log and skip rather than abort on.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::physics::EntityId;

pub type GameResult<T> = Result<T, GameError>;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("entity {0:?} is not registered with the physics world")]
    UnknownEntity(EntityId),

    #[error("player body is missing from the physics world")]
    PlayerMissing,
}
