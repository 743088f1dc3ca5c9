//! Replay binary for Gridfall.
//!
//! Loads a game file, rebuilds the game's state at a query instant, and
//! prints that state to stdout as JSON.
//!
//! ```text
//! gridfall-engine [GAME_FILE] [QUERY_INSTANT]
//! ```
//!
//! `GAME_FILE` defaults to `gridfall-game.yaml` in the working directory.
//! `QUERY_INSTANT` is an RFC 3339 timestamp and defaults to now.
//!
//! # Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load the game file
//! 3. Validate the configuration and build the opening state
//! 4. Append the submitted events to a fresh process
//! 5. Replay to the query instant
//! 6. Print the resulting state

mod error;

use std::env;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use gridfall_core::{GameFile, calculate_state, init_game, init_process, process_events};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Game file used when no path is given.
const DEFAULT_GAME_FILE: &str = "gridfall-game.yaml";

/// Application entry point for the replay binary.
///
/// # Errors
///
/// Returns an error if the game file cannot be loaded, the configuration
/// is rejected, or any event fails during replay.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let mut args = env::args().skip(1);
    let path = args.next().map_or_else(|| PathBuf::from(DEFAULT_GAME_FILE), PathBuf::from);
    let query = args.next().map_or_else(|| Ok(Utc::now()), |raw| parse_query(&raw))?;

    info!(path = %path.display(), %query, "gridfall-engine starting");

    // 2. Load the game file.
    let game = GameFile::from_file(&path).map_err(EngineError::from)?;
    info!(
        players = game.config.player_count(),
        events = game.events.len(),
        "Game file loaded"
    );

    // 3-4. Build the process and append the log.
    let state = init_game(game.config).map_err(EngineError::from)?;
    let process = process_events(&init_process(state), &game.events).map_err(EngineError::from)?;

    // 5. Replay.
    let state = calculate_state(query, &process).map_err(EngineError::from)?;
    info!(outcome = ?state.outcome, alive = state.alive_players().count(), "Replay complete");

    // 6. Print.
    let rendered = serde_json::to_string_pretty(&state).map_err(EngineError::from)?;
    println!("{rendered}");

    Ok(())
}

/// Parse the query instant argument.
fn parse_query(raw: &str) -> Result<DateTime<Utc>, EngineError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|source| EngineError::Query {
            value: raw.to_owned(),
            source,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn query_accepts_offsets() {
        let at = parse_query("2026-03-01T09:30:00+02:00").unwrap();
        assert_eq!(at.to_rfc3339(), "2026-03-01T07:30:00+00:00");
    }

    #[test]
    fn query_rejects_garbage() {
        let err = parse_query("next tuesday").unwrap_err();
        assert!(matches!(err, EngineError::Query { ref value, .. } if value == "next tuesday"));
    }
}
