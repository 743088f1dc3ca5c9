//! Core state structs: configuration, players, board, and the full game
//! state snapshot.
//!
//! Every struct here is a plain value. The transition function clones a
//! [`GameState`] before changing it, so two snapshots never share storage.

use std::borrow::Cow;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::enums::{Outcome, RuleSet};
use crate::ids::PlayerIndex;

/// Action points a player starts with unless configured otherwise.
pub const DEFAULT_STARTING_ACTION_POINTS: u32 = 1;

/// Health points a player starts with unless configured otherwise.
pub const DEFAULT_STARTING_HEALTH_POINTS: i32 = 3;

/// Interaction radius a player starts with unless configured otherwise.
pub const DEFAULT_STARTING_RANGE: u32 = 2;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Immutable game configuration, fixed once the game starts.
///
/// Structural constraints are declared with `validator` attributes. Checks
/// that need the schedule evaluator (expression syntax, timezone name) live
/// in `gridfall-core`'s config module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// External player ids. Position in this list is the player's
    /// [`PlayerIndex`].
    #[validate(
        length(min = 1, message = "at least one player is required"),
        custom(function = "unique_player_ids")
    )]
    pub players: Vec<String>,

    /// Number of board rows.
    #[validate(range(min = 1, message = "board height must be at least 1"))]
    pub height: u32,

    /// Number of board columns.
    #[validate(range(min = 1, message = "board width must be at least 1"))]
    pub width: u32,

    /// Instant the game starts. No event at or before it is admissible.
    pub start_at: DateTime<Utc>,

    /// Recurring tick schedule (cron expression).
    #[validate(length(min = 1, message = "schedule expression must not be empty"))]
    pub schedule: String,

    /// IANA timezone the schedule is evaluated in.
    #[validate(length(min = 1, message = "timezone must not be empty"))]
    pub timezone: String,

    /// Rule interpretation.
    #[serde(default)]
    pub rules: RuleSet,

    /// Action points each player starts with.
    #[serde(default = "default_starting_action_points")]
    pub starting_action_points: u32,

    /// Health points each player starts with.
    #[serde(default = "default_starting_health_points")]
    #[validate(range(min = 1, message = "players must start with at least 1 HP"))]
    pub starting_health_points: i32,

    /// Interaction radius each player starts with.
    #[serde(default = "default_starting_range")]
    pub starting_range: u32,
}

impl GameConfig {
    /// Number of configured players.
    pub const fn player_count(&self) -> usize {
        self.players.len()
    }
}

const fn default_starting_action_points() -> u32 {
    DEFAULT_STARTING_ACTION_POINTS
}

const fn default_starting_health_points() -> i32 {
    DEFAULT_STARTING_HEALTH_POINTS
}

const fn default_starting_range() -> u32 {
    DEFAULT_STARTING_RANGE
}

/// Reject player lists that name the same id twice.
fn unique_player_ids(players: &[String]) -> Result<(), ValidationError> {
    let mut seen = BTreeSet::new();
    for id in players {
        if !seen.insert(id.as_str()) {
            let mut err = ValidationError::new("duplicate_player");
            err.message = Some(Cow::Owned(format!("player id {id:?} appears more than once")));
            return Err(err);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Row, 0 at the top.
    pub row: u32,
    /// Column, 0 at the left.
    pub col: u32,
}

impl Cell {
    /// Construct a cell.
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// Per-player mutable state, index-aligned with [`GameConfig::players`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    /// Whether the player has occupied a cell.
    pub placed: bool,
    /// Whether the player is alive. Disqualified players are never alive.
    pub alive: bool,
    /// Permanently excluded for failing to place before the first tick.
    pub disqualified: bool,
    /// Current cell, `None` until placed.
    pub position: Option<Cell>,
    /// Interaction radius for fire and gift actions.
    pub range: u32,
    /// Action points.
    pub action_points: u32,
    /// Health points. Can drop below zero when a dead player is fired on.
    pub health_points: i32,
}

impl PlayerState {
    /// A fresh, unplaced, living player.
    pub const fn new(action_points: u32, health_points: i32, range: u32) -> Self {
        Self {
            placed: false,
            alive: true,
            disqualified: false,
            position: None,
            range,
            action_points,
            health_points,
        }
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// A `height x width` occupancy grid, stored row-major.
///
/// Each cell holds at most one player index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    height: u32,
    width: u32,
    cells: Vec<Option<PlayerIndex>>,
}

impl Board {
    /// Create an empty board.
    pub fn new(height: u32, width: u32) -> Self {
        let len = usize::try_from(height)
            .unwrap_or(usize::MAX)
            .saturating_mul(usize::try_from(width).unwrap_or(usize::MAX));
        Self {
            height,
            width,
            cells: vec![None; len],
        }
    }

    /// Number of rows.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of columns.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Whether `cell` lies on the board.
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    fn offset(&self, cell: Cell) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row).ok()?;
        let col = usize::try_from(cell.col).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(col)
    }

    /// The player occupying `cell`, if any. Off-board cells are empty.
    pub fn occupant(&self, cell: Cell) -> Option<PlayerIndex> {
        self.offset(cell)
            .and_then(|i| self.cells.get(i).copied())
            .flatten()
    }

    /// Whether `cell` is on the board and unoccupied.
    pub fn is_vacant(&self, cell: Cell) -> bool {
        self.offset(cell)
            .and_then(|i| self.cells.get(i))
            .is_some_and(Option::is_none)
    }

    /// Set the occupant of `cell`. Returns `false` if the cell is off the
    /// board.
    pub fn set(&mut self, cell: Cell, occupant: Option<PlayerIndex>) -> bool {
        match self.offset(cell).and_then(|i| self.cells.get_mut(i)) {
            Some(slot) => {
                *slot = occupant;
                true
            }
            None => false,
        }
    }

    /// Iterate over occupied cells in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (Cell, PlayerIndex)> + '_ {
        let width = self.width.max(1);
        self.cells
            .iter()
            .zip(0_u32..)
            .filter_map(move |(slot, i)| {
                let row = i.checked_div(width)?;
                let col = i.checked_rem(width)?;
                slot.map(|player| (Cell::new(row, col), player))
            })
    }
}

// ---------------------------------------------------------------------------
// Game state
// ---------------------------------------------------------------------------

/// A complete, self-contained snapshot of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Working copy of the configuration.
    pub config: GameConfig,
    /// One entry per configured player.
    pub players: Vec<PlayerState>,
    /// Board occupancy.
    pub board: Board,
    /// Jury votes for the current round, one slot per player.
    pub votes: Vec<Option<PlayerIndex>>,
    /// `None` while the game is undecided.
    pub outcome: Option<Outcome>,
}

impl GameState {
    /// Build the opening state for `config` without validating it.
    pub fn from_config(config: GameConfig) -> Self {
        let player = PlayerState::new(
            config.starting_action_points,
            config.starting_health_points,
            config.starting_range,
        );
        let count = config.player_count();
        Self {
            players: vec![player; count],
            board: Board::new(config.height, config.width),
            votes: vec![None; count],
            outcome: None,
            config,
        }
    }

    /// Look up a player.
    pub fn player(&self, index: PlayerIndex) -> Option<&PlayerState> {
        self.players.get(index.get())
    }

    /// Look up a player mutably.
    pub fn player_mut(&mut self, index: PlayerIndex) -> Option<&mut PlayerState> {
        self.players.get_mut(index.get())
    }

    /// The vote cast by `index` this round.
    pub fn vote_of(&self, index: PlayerIndex) -> Option<PlayerIndex> {
        self.votes.get(index.get()).copied().flatten()
    }

    /// Indices of living players, ascending.
    pub fn alive_players(&self) -> impl Iterator<Item = PlayerIndex> + '_ {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.alive)
            .map(|(i, _)| PlayerIndex(i))
    }

    /// Whether the game has been decided.
    pub const fn is_over(&self) -> bool {
        self.outcome.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    fn config(players: &[&str]) -> GameConfig {
        GameConfig {
            players: players.iter().map(|p| (*p).to_owned()).collect(),
            height: 4,
            width: 3,
            start_at: DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            schedule: "0 0 * * *".to_owned(),
            timezone: "UTC".to_owned(),
            rules: RuleSet::Legacy,
            starting_action_points: DEFAULT_STARTING_ACTION_POINTS,
            starting_health_points: DEFAULT_STARTING_HEALTH_POINTS,
            starting_range: DEFAULT_STARTING_RANGE,
        }
    }

    #[test]
    fn duplicate_player_ids_fail_validation() {
        let cfg = config(&["ana", "bo", "ana"]);
        let errors = cfg.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("players"));
    }

    #[test]
    fn zero_width_fails_validation() {
        let mut cfg = config(&["ana"]);
        cfg.width = 0;
        let errors = cfg.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("width"));
    }

    #[test]
    fn well_formed_config_validates() {
        assert!(config(&["ana", "bo"]).validate().is_ok());
    }

    #[test]
    fn opening_state_is_index_aligned() {
        let state = GameState::from_config(config(&["ana", "bo", "cy"]));
        assert_eq!(state.players.len(), 3);
        assert_eq!(state.votes.len(), 3);
        assert!(state.players.iter().all(|p| p.alive && !p.placed));
        assert_eq!(state.players.first().unwrap().range, DEFAULT_STARTING_RANGE);
        assert_eq!(state.alive_players().count(), 3);
        assert!(!state.is_over());
    }

    #[test]
    fn board_tracks_occupancy() {
        let mut board = Board::new(4, 3);
        let cell = Cell::new(2, 1);
        assert!(board.is_vacant(cell));
        assert!(board.set(cell, Some(PlayerIndex(0))));
        assert_eq!(board.occupant(cell), Some(PlayerIndex(0)));
        assert!(!board.is_vacant(cell));
        assert_eq!(board.occupied().collect::<Vec<_>>(), vec![(cell, PlayerIndex(0))]);
    }

    #[test]
    fn off_board_cells_are_neither_vacant_nor_settable() {
        let mut board = Board::new(2, 2);
        let outside = Cell::new(2, 0);
        assert!(!board.contains(outside));
        assert!(!board.is_vacant(outside));
        assert!(!board.set(outside, Some(PlayerIndex(1))));
    }
}
