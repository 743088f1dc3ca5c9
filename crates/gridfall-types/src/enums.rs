//! Enumeration types shared by the state model and the event log.

use serde::{Deserialize, Serialize};

use crate::ids::PlayerIndex;

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

/// A direction a placed player may move in, one cell per action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Towards row 0.
    Up,
    /// Towards the last row.
    Down,
    /// Towards column 0.
    Left,
    /// Towards the last column (see [`RuleSet::Legacy`] for the historical
    /// mapping).
    Right,
}

// ---------------------------------------------------------------------------
// Rule set
// ---------------------------------------------------------------------------

/// Which rule interpretation the transition function applies.
///
/// Logs recorded by earlier deployments depend on a handful of quirks in
/// the original rules, so [`RuleSet::Legacy`] reproduces them exactly.
/// [`RuleSet::Corrected`] fixes them and must only be used for games that
/// were started under it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSet {
    /// Historical rules:
    ///
    /// - `RIGHT` moves the player up (same vector as `UP`).
    /// - Targeting distance is `max(|t.col - a.col|, |t.row - a.col|)`.
    /// - A vote target must satisfy `target < player_count - 1`.
    /// - Health gifts do not require a living target.
    #[default]
    Legacy,
    /// Rules with the quirks above fixed.
    Corrected,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Terminal result of a game. Once set, no further event is admissible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Exactly one player survived.
    Winner(PlayerIndex),
    /// Every player is dead or disqualified.
    NoSurvivors,
}

impl Outcome {
    /// The legacy numeric encoding: the winner's index, or `-1` when there
    /// were no survivors.
    pub fn as_legacy_code(self) -> i64 {
        match self {
            Self::Winner(index) => i64::try_from(index.get()).unwrap_or(i64::MAX),
            Self::NoSurvivors => -1,
        }
    }
}
