//! Game and process construction, and event log appends.
//!
//! A [`Process`] is created once per game and then only ever extended:
//! submitted events are appended to its log, never inserted before the
//! last replayed instant. Callers that serve more than one writer must
//! serialize [`process_events`] per game, since the retroactivity check
//! assumes nothing else is appending concurrently.

use chrono::{DateTime, Utc};
use gridfall_types::{GameConfig, GameEvent, GameState, Process};
use tracing::{debug, info};

use crate::config::{self, ConfigError};

/// Errors that can occur when appending to a process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessError {
    /// An incoming event lies in the already-replayed part of the timeline.
    #[error("event at {submitted_at} is not after the last processed instant {updated_at}")]
    Retroactive {
        /// Earliest incoming instant.
        submitted_at: DateTime<Utc>,
        /// The process's checkpoint.
        updated_at: DateTime<Utc>,
    },
}

/// Validate `config` and build the game's opening state.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] listing every violation if the
/// configuration is rejected. No state is created in that case.
pub fn init_game(config: GameConfig) -> Result<GameState, ConfigError> {
    config::ensure_valid(&config)?;
    info!(
        players = config.player_count(),
        height = config.height,
        width = config.width,
        start_at = %config.start_at,
        schedule = config.schedule,
        timezone = config.timezone,
        rules = ?config.rules,
        "Game initialized"
    );
    Ok(GameState::from_config(config))
}

/// Wrap an opening state in a fresh process with an empty log, checkpointed
/// at the game start.
pub const fn init_process(state: GameState) -> Process {
    let updated_at = state.config.start_at;
    Process {
        state,
        events: Vec::new(),
        updated_at,
    }
}

/// Append submitted events to a process's log.
///
/// The incoming batch may be in any order; it is stably sorted by instant
/// before being merged into the log, so events sharing an instant keep
/// their submission order. An empty batch returns an unchanged copy.
///
/// # Errors
///
/// Returns [`ProcessError::Retroactive`] if any incoming event is at or
/// before the process's `updated_at`. Nothing is appended in that case.
pub fn process_events(process: &Process, events: &[GameEvent]) -> Result<Process, ProcessError> {
    let Some(earliest) = events.iter().map(|e| e.submitted_at).min() else {
        return Ok(process.clone());
    };
    if earliest <= process.updated_at {
        return Err(ProcessError::Retroactive {
            submitted_at: earliest,
            updated_at: process.updated_at,
        });
    }

    let mut log = process.events.clone();
    log.extend_from_slice(events);
    // Stable: the existing log is already ordered, and equal instants keep
    // insertion order.
    log.sort_by_key(|e| e.submitted_at);

    debug!(appended = events.len(), total = log.len(), "Events appended");
    Ok(Process {
        state: process.state.clone(),
        events: log,
        updated_at: process.updated_at,
    })
}
