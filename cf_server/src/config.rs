//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use connect_four::game::{
    GameConfig,
    config::{
        DEFAULT_COLUMNS, DEFAULT_DROP_SPEED, DEFAULT_PIECES_TO_WIN, DEFAULT_ROWS, MAX_DIMENSION,
        MIN_DIMENSION, MIN_PIECES_TO_WIN,
    },
};
use std::net::SocketAddr;

pub const DEFAULT_BIND: &str = "127.0.0.1:6969";

/// Upper bound on rooms created at startup
pub const MAX_STARTUP_ROOMS: usize = 1000;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Prometheus exporter address; metrics are off when unset
    pub metrics_bind: Option<SocketAddr>,
    /// Rules for rooms created at startup
    pub game: GameConfig,
    /// Number of rooms to create on startup
    pub num_rooms: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `num_rooms_override` - Optional number of rooms override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        num_rooms_override: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_env_strict("SERVER_BIND")?.unwrap_or(default_bind()?),
        };

        let metrics_bind = parse_env_strict("METRICS_BIND")?;

        let game = GameConfig {
            rows: parse_env_strict("BOARD_ROWS")?.unwrap_or(DEFAULT_ROWS),
            columns: parse_env_strict("BOARD_COLUMNS")?.unwrap_or(DEFAULT_COLUMNS),
            pieces_to_win: parse_env_strict("PIECES_TO_WIN")?.unwrap_or(DEFAULT_PIECES_TO_WIN),
            allow_diagonal: parse_env_strict("ALLOW_DIAGONAL")?.unwrap_or(true),
            drop_speed: parse_env_strict("DROP_SPEED")?.unwrap_or(DEFAULT_DROP_SPEED),
            starting_player: parse_env_strict("STARTING_PLAYER")?.unwrap_or_default(),
        };

        let num_rooms = match num_rooms_override {
            Some(num_rooms) => num_rooms,
            None => parse_env_strict("MAX_ROOMS")?.unwrap_or(1),
        };

        Ok(ServerConfig {
            bind,
            metrics_bind,
            game,
            num_rooms,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let range = MIN_DIMENSION..=MAX_DIMENSION;

        if !range.contains(&self.game.rows) {
            return Err(ConfigError::Invalid {
                var: "BOARD_ROWS".to_string(),
                reason: format!("Must be between {MIN_DIMENSION} and {MAX_DIMENSION}"),
            });
        }

        if !range.contains(&self.game.columns) {
            return Err(ConfigError::Invalid {
                var: "BOARD_COLUMNS".to_string(),
                reason: format!("Must be between {MIN_DIMENSION} and {MAX_DIMENSION}"),
            });
        }

        let max_line = self.game.max_line();
        if !(MIN_PIECES_TO_WIN..=max_line).contains(&self.game.pieces_to_win) {
            return Err(ConfigError::Invalid {
                var: "PIECES_TO_WIN".to_string(),
                reason: format!(
                    "Must be between {MIN_PIECES_TO_WIN} and the longest board side ({max_line})"
                ),
            });
        }

        if !(self.game.drop_speed.is_finite() && self.game.drop_speed > 0.0) {
            return Err(ConfigError::Invalid {
                var: "DROP_SPEED".to_string(),
                reason: "Must be a positive number".to_string(),
            });
        }

        if self.num_rooms == 0 || self.num_rooms > MAX_STARTUP_ROOMS {
            return Err(ConfigError::Invalid {
                var: "MAX_ROOMS".to_string(),
                reason: format!("Must be between 1 and {MAX_STARTUP_ROOMS}"),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn default_bind() -> Result<SocketAddr, ConfigError> {
    DEFAULT_BIND.parse().map_err(|_| ConfigError::Invalid {
        var: "SERVER_BIND".to_string(),
        reason: format!("Default {DEFAULT_BIND} is not a socket address"),
    })
}

/// Parse an environment variable if it is set. A set-but-unparseable value is an error, never
/// a silent fallback to the default.
fn parse_env_strict<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value.parse().map(Some).map_err(|e: T::Err| ConfigError::Invalid {
            var: key.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connect_four::game::StartingPlayer;
    use serial_test::serial;

    const VARS: [&str; 9] = [
        "SERVER_BIND",
        "METRICS_BIND",
        "MAX_ROOMS",
        "BOARD_ROWS",
        "BOARD_COLUMNS",
        "PIECES_TO_WIN",
        "ALLOW_DIAGONAL",
        "DROP_SPEED",
        "STARTING_PLAYER",
    ];

    fn clear_env() {
        for var in VARS {
            // SAFETY: env-mutating tests are serialized with #[serial]
            unsafe { std::env::remove_var(var) };
        }
    }

    fn set_env(key: &str, value: &str) {
        // SAFETY: env-mutating tests are serialized with #[serial]
        unsafe { std::env::set_var(key, value) };
    }

    fn valid_config() -> ServerConfig {
        ServerConfig {
            bind: "127.0.0.1:8080".parse().unwrap(),
            metrics_bind: None,
            game: GameConfig::default(),
            num_rooms: 1,
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            var: "BOARD_ROWS".to_string(),
            reason: "Must be between 3 and 8".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("BOARD_ROWS"));
        assert!(msg.contains("between 3 and 8"));
    }

    #[test]
    #[serial]
    fn test_defaults_when_env_empty() {
        clear_env();
        let config = ServerConfig::from_env(None, None).unwrap();

        assert_eq!(config.bind, DEFAULT_BIND.parse::<SocketAddr>().unwrap());
        assert_eq!(config.metrics_bind, None);
        assert_eq!(config.game, GameConfig::default());
        assert_eq!(config.num_rooms, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        set_env("BOARD_ROWS", "5");
        set_env("BOARD_COLUMNS", "8");
        set_env("PIECES_TO_WIN", "5");
        set_env("ALLOW_DIAGONAL", "false");
        set_env("STARTING_PLAYER", "random");
        set_env("MAX_ROOMS", "3");

        let config = ServerConfig::from_env(None, Some(4)).unwrap();
        clear_env();

        assert_eq!(config.game.rows, 5);
        assert_eq!(config.game.columns, 8);
        assert_eq!(config.game.pieces_to_win, 5);
        assert!(!config.game.allow_diagonal);
        assert_eq!(config.game.starting_player, StartingPlayer::Random);
        // CLI wins over env
        assert_eq!(config.num_rooms, 4);
    }

    #[test]
    #[serial]
    fn test_unparseable_bind_is_error() {
        clear_env();
        set_env("SERVER_BIND", "not-an-address");
        let err = ServerConfig::from_env(None, None).unwrap_err();
        clear_env();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == "SERVER_BIND"));
    }

    #[test]
    #[serial]
    fn test_unknown_starting_player_is_error() {
        clear_env();
        set_env("STARTING_PLAYER", "player_c");
        let err = ServerConfig::from_env(None, None).unwrap_err();
        clear_env();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == "STARTING_PLAYER"));
    }

    #[test]
    #[serial]
    fn test_unparseable_game_settings_are_errors() {
        for (var, value) in [
            ("BOARD_ROWS", "abc"),
            ("BOARD_COLUMNS", "-1"),
            ("PIECES_TO_WIN", "four"),
            ("ALLOW_DIAGONAL", "yes"),
            ("DROP_SPEED", "fast"),
            ("MAX_ROOMS", "many"),
        ] {
            clear_env();
            set_env(var, value);
            let err = ServerConfig::from_env(None, None).unwrap_err();
            clear_env();
            assert!(
                matches!(&err, ConfigError::Invalid { var: bad, .. } if bad == var),
                "{var}={value} gave {err}"
            );
        }
    }

    #[test]
    #[serial]
    fn test_rooms_flag_skips_max_rooms_env() {
        clear_env();
        set_env("MAX_ROOMS", "many");
        let config = ServerConfig::from_env(None, Some(2));
        clear_env();
        assert_eq!(config.unwrap().num_rooms, 2);
    }

    #[test]
    fn test_config_validation_rows_out_of_range() {
        let mut config = valid_config();
        config.game.rows = 9;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == "BOARD_ROWS"));
    }

    #[test]
    fn test_config_validation_pieces_longer_than_board() {
        let mut config = valid_config();
        config.game.rows = 4;
        config.game.columns = 4;
        config.game.pieces_to_win = 5;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == "PIECES_TO_WIN"));
    }

    #[test]
    fn test_config_validation_zero_rooms() {
        let mut config = valid_config();
        config.num_rooms = 0;
        assert!(config.validate().is_err());
    }
}
