//! Structured logging configuration.
//!
//! The library crate logs through the `log` facade; `init` installs a `tracing` subscriber that
//! also picks those records up, so room and authority logs land in the same stream as request
//! logs.

use connect_four::{
    game::{DropOutcome, OutcomeStatus},
    room::RoomId,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging.
///
/// Log levels are configurable via the `RUST_LOG` env var and default to `info`.
///
/// # Example
///
/// ```no_run
/// use cf_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=warn,hyper=warn"));

    // Console layer for development
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log the end of a match with structured data.
///
/// Outcomes that don't finish the match are ignored.
///
/// # Example
///
/// ```
/// use cf_server::logging::log_match_finished;
/// use connect_four::{GameConfig, PlayerId, TurnAuthority};
///
/// let mut authority = TurnAuthority::with_first_player(GameConfig::default(), PlayerId::PlayerA);
/// let outcome = authority.request_drop(PlayerId::PlayerA, 0);
/// // Nothing is logged, the match goes on
/// log_match_finished(1, &outcome);
/// ```
pub fn log_match_finished(room_id: RoomId, outcome: &DropOutcome) {
    if !outcome.is_terminal() {
        return;
    }

    match outcome.status {
        OutcomeStatus::Won { player } => tracing::info!(
            room_id = room_id,
            winner = %player,
            column = outcome.column,
            "MATCH: won"
        ),
        OutcomeStatus::Draw => tracing::info!(
            room_id = room_id,
            column = outcome.column,
            "MATCH: draw"
        ),
        OutcomeStatus::Continue { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connect_four::{GameConfig, PlayerId, TurnAuthority};

    #[test]
    fn test_log_match_finished() {
        let mut authority =
            TurnAuthority::with_first_player(GameConfig::default(), PlayerId::PlayerA);
        let mut last = None;
        for column in [0, 1, 0, 1, 0, 1, 0] {
            let player = authority.current_player();
            last = Some(authority.request_drop(player, column));
        }
        let outcome = last.unwrap();
        assert!(outcome.is_terminal());

        // Just ensure it doesn't panic
        log_match_finished(1, &outcome);
    }
}
