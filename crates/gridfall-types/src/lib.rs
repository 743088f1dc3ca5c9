//! Shared type definitions for the Gridfall replay engine.
//!
//! Gridfall is a turn-based elimination game on a grid. Everything the
//! engine computes is a pure function of a [`GameConfig`], an event log, and
//! a query instant; this crate defines the values flowing through that
//! function.
//!
//! # Modules
//!
//! - [`ids`] -- [`PlayerIndex`], the sole player identifier
//! - [`enums`] -- Directions, rule sets, and game outcomes
//! - [`structs`] -- Configuration, player, board, and game state snapshots
//! - [`events`] -- The [`Action`] sum type and timestamped [`GameEvent`]
//! - [`process`] -- [`Process`], the persisted replay checkpoint

pub mod enums;
pub mod events;
pub mod ids;
pub mod process;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Direction, Outcome, RuleSet};
pub use events::{Action, GameEvent};
pub use ids::PlayerIndex;
pub use process::Process;
pub use structs::{
    Board, Cell, DEFAULT_STARTING_ACTION_POINTS, DEFAULT_STARTING_HEALTH_POINTS,
    DEFAULT_STARTING_RANGE, GameConfig, GameState, PlayerState,
};
