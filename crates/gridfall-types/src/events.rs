//! The event log vocabulary.
//!
//! A [`GameEvent`] pairs a submission instant with an [`Action`]. Actions
//! form a closed sum type: adding a kind is a compile error until every
//! `match` over [`Action`] handles it. On the wire, events use an internal
//! `type` tag:
//!
//! ```json
//! { "type": "FIRE", "submittedAt": "2026-01-01T10:00:00Z", "player": 0, "target": 1 }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::Direction;
use crate::ids::PlayerIndex;

/// What an event does. Every variant except [`Action::Tick`] is submitted
/// by a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Occupy a starting cell.
    Place {
        /// Acting player.
        player: PlayerIndex,
        /// Target row. Signed so that malformed submissions can be
        /// represented and rejected as out of bounds.
        row: i64,
        /// Target column.
        col: i64,
    },
    /// Move one cell.
    Move {
        /// Acting player.
        player: PlayerIndex,
        /// Direction of travel.
        direction: Direction,
    },
    /// Shoot another player for one HP.
    Fire {
        /// Acting player.
        player: PlayerIndex,
        /// Player being shot.
        target: PlayerIndex,
    },
    /// Cast a jury vote (dead players only).
    Vote {
        /// Acting player.
        player: PlayerIndex,
        /// Living player voted for.
        target: PlayerIndex,
    },
    /// Give one action point away.
    GiftAp {
        /// Acting player.
        player: PlayerIndex,
        /// Recipient.
        target: PlayerIndex,
    },
    /// Give one health point away.
    GiftHp {
        /// Acting player.
        player: PlayerIndex,
        /// Recipient.
        target: PlayerIndex,
    },
    /// Spend action points to extend range.
    Upgrade {
        /// Acting player.
        player: PlayerIndex,
    },
    /// Schedule-generated turn boundary.
    Tick,
}

impl Action {
    /// The acting player, or `None` for ticks.
    pub const fn actor(&self) -> Option<PlayerIndex> {
        match self {
            Self::Place { player, .. }
            | Self::Move { player, .. }
            | Self::Fire { player, .. }
            | Self::Vote { player, .. }
            | Self::GiftAp { player, .. }
            | Self::GiftHp { player, .. }
            | Self::Upgrade { player } => Some(*player),
            Self::Tick => None,
        }
    }

    /// Wire name of the action kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Place { .. } => "PLACE",
            Self::Move { .. } => "MOVE",
            Self::Fire { .. } => "FIRE",
            Self::Vote { .. } => "VOTE",
            Self::GiftAp { .. } => "GIFT_AP",
            Self::GiftHp { .. } => "GIFT_HP",
            Self::Upgrade { .. } => "UPGRADE",
            Self::Tick => "TICK",
        }
    }
}

/// A timestamped action, the unit of the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEvent {
    /// When the event was submitted (or, for ticks, scheduled).
    pub submitted_at: DateTime<Utc>,
    /// The action itself.
    #[serde(flatten)]
    pub action: Action,
}

impl GameEvent {
    /// Construct an event.
    pub const fn new(submitted_at: DateTime<Utc>, action: Action) -> Self {
        Self {
            submitted_at,
            action,
        }
    }

    /// A schedule tick at `at`.
    pub const fn tick(at: DateTime<Utc>) -> Self {
        Self::new(at, Action::Tick)
    }
}
