use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::RoomId;
use crate::game::ConfigError;

/// Failures reaching or creating a room. Game rule rejections are not errors at this level;
/// they come back inside [`RoomResponse`](super::RoomResponse).
#[derive(Clone, Debug, Deserialize, Error, PartialEq, Serialize)]
pub enum RoomError {
    #[error("room {0} not found")]
    NotFound(RoomId),
    #[error("room {0} is closed")]
    Closed(RoomId),
    #[error("room {0} dropped the request")]
    NoResponse(RoomId),
    #[error("invalid room name: {0}")]
    InvalidName(String),
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}
