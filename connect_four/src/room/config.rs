//! Room configuration.

use serde::{Deserialize, Serialize};

use super::errors::RoomError;
use crate::game::GameConfig;

pub const MAX_ROOM_NAME_LEN: usize = 64;

/// Room configuration
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RoomConfig {
    /// Display name shown in room listings
    pub name: String,

    /// Rules for every match played in this room, rematches included
    #[serde(default)]
    pub game: GameConfig,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            name: "Connect Four".to_string(),
            game: GameConfig::default(),
        }
    }
}

impl RoomConfig {
    pub fn new(name: impl Into<String>, game: GameConfig) -> Self {
        Self {
            name: name.into(),
            game,
        }
    }

    /// Strict validation used when a room is created on request.
    pub fn validate(&self) -> Result<(), RoomError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(RoomError::InvalidName("name is empty".to_string()));
        }
        if name.chars().count() > MAX_ROOM_NAME_LEN {
            return Err(RoomError::InvalidName(format!(
                "name is longer than {MAX_ROOM_NAME_LEN} characters"
            )));
        }

        self.game.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ConfigError;

    #[test]
    fn default_config_is_valid() {
        assert!(RoomConfig::default().validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let config = RoomConfig::new("   ", GameConfig::default());
        assert!(matches!(config.validate(), Err(RoomError::InvalidName(_))));
    }

    #[test]
    fn game_config_errors_pass_through() {
        let config = RoomConfig::new(
            "tiny",
            GameConfig {
                rows: 2,
                ..GameConfig::default()
            },
        );
        assert_eq!(
            config.validate(),
            Err(RoomError::InvalidConfig(ConfigError::RowsOutOfRange(2)))
        );
    }

    #[test]
    fn game_section_is_optional_in_json() {
        let config: RoomConfig = serde_json::from_str(r#"{"name":"lobby"}"#).unwrap();
        assert_eq!(config.game, GameConfig::default());
    }
}
