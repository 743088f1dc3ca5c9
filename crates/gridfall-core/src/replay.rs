//! Replay driver: rebuild a game's state at any instant.
//!
//! The submitted event log and the schedule's tick sequence are merged with
//! a two-pointer walk into one time-ordered stream and folded through
//! [`rules::apply`] starting from the process's checkpoint.
//!
//! # Ordering
//!
//! - Submitted events keep their log order (sorted by instant, ties in
//!   insertion order).
//! - A scheduled tick goes first whenever the next submitted event is not
//!   strictly earlier than it.
//!
//! # Stopping
//!
//! The walk stops, without applying the event in hand, once that event is
//! later than the query instant or the game is decided. Events at or before
//! the checkpoint's `updated_at` are skipped, so replaying a checkpointed
//! process resumes exactly where the checkpoint left off.

use std::iter::Peekable;
use std::slice;

use chrono::{DateTime, Utc};
use gridfall_types::{GameEvent, GameState, Process};
use tracing::{debug, info};

use crate::rules::{self, TransitionError};
use crate::schedule::{ScheduleCursor, ScheduleError};

/// Errors that can occur during replay.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// The configured schedule could not be opened.
    #[error("schedule error: {source}")]
    Schedule {
        /// The underlying schedule error.
        #[from]
        source: ScheduleError,
    },

    /// An event was rejected; the whole replay is abandoned.
    #[error("{kind} event at {submitted_at} rejected: {source}")]
    Transition {
        /// Kind of the rejected event.
        kind: &'static str,
        /// Instant of the rejected event.
        submitted_at: DateTime<Utc>,
        /// Why it was rejected.
        source: TransitionError,
    },
}

/// Two-pointer merge of the event log with the tick schedule.
struct MergedEvents<'a> {
    logged: Peekable<slice::Iter<'a, GameEvent>>,
    ticks: ScheduleCursor,
}

impl Iterator for MergedEvents<'_> {
    type Item = GameEvent;

    fn next(&mut self) -> Option<GameEvent> {
        let logged_first = match (self.logged.peek(), self.ticks.peek()) {
            (Some(event), Some(tick)) => event.submitted_at < tick,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if logged_first {
            self.logged.next().cloned()
        } else {
            self.ticks.next().map(GameEvent::tick)
        }
    }
}

/// Compute the state of `process`'s game at `query`.
///
/// The stored process is only read; the returned state is an independent
/// value.
///
/// # Errors
///
/// Returns [`ReplayError::Schedule`] if the configured schedule cannot be
/// opened, or [`ReplayError::Transition`] for the first event that is
/// rejected. No partial result is returned.
pub fn calculate_state(query: DateTime<Utc>, process: &Process) -> Result<GameState, ReplayError> {
    let config = &process.state.config;
    let events = MergedEvents {
        logged: process.events.iter().peekable(),
        ticks: ScheduleCursor::open(&config.schedule, &config.timezone, config.start_at)?,
    };

    let mut state = process.state.clone();
    let mut applied: u64 = 0;
    for event in events {
        if state.is_over() || event.submitted_at > query {
            break;
        }
        if event.submitted_at <= process.updated_at {
            continue;
        }
        state = rules::apply(&event, &state).map_err(|source| ReplayError::Transition {
            kind: event.action.kind(),
            submitted_at: event.submitted_at,
            source,
        })?;
        applied = applied.saturating_add(1);
    }

    debug!(%query, applied, outcome = ?state.outcome, "Replay finished");
    Ok(state)
}

/// Advance `process`'s checkpoint to `query`.
///
/// Returns a process with the same log whose `state` is the replayed state
/// at `query` and whose `updated_at` is `query`. A query at or before the
/// current checkpoint returns an unchanged copy.
///
/// # Errors
///
/// Returns [`ReplayError`] under the same conditions as
/// [`calculate_state`].
pub fn checkpoint(query: DateTime<Utc>, process: &Process) -> Result<Process, ReplayError> {
    if query <= process.updated_at {
        return Ok(process.clone());
    }
    let state = calculate_state(query, process)?;
    info!(from = %process.updated_at, to = %query, "Checkpoint advanced");
    Ok(Process {
        state,
        events: process.events.clone(),
        updated_at: query,
    })
}
