//! The durable replay unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::GameEvent;
use crate::structs::GameState;

/// A game's state as of `updated_at`, together with the full event log.
///
/// The log is append-only and kept sorted by `submitted_at` (stable for
/// equal instants). Replay resumes from `state` and skips every logged
/// event at or before `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    /// State as of `updated_at`.
    pub state: GameState,
    /// Every submitted event, ordered by instant.
    pub events: Vec<GameEvent>,
    /// Last instant already folded into `state`.
    pub updated_at: DateTime<Utc>,
}
