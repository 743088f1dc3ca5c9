//! Player identifier.
//!
//! Players are identified everywhere by their dense, 0-based position in
//! the configured player list. The external string ids only appear in
//! [`GameConfig::players`](crate::GameConfig::players).

use serde::{Deserialize, Serialize};

/// Index of a player within the configuration's player list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerIndex(pub usize);

impl PlayerIndex {
    /// Return the raw index.
    pub const fn get(self) -> usize {
        self.0
    }
}

impl core::fmt::Display for PlayerIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<usize> for PlayerIndex {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl From<PlayerIndex> for usize {
    fn from(index: PlayerIndex) -> Self {
        index.0
    }
}
