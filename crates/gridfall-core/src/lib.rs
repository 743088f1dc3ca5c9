//! Rules, schedule driver, and event replay for the Gridfall game engine.
//!
//! The engine is a pure function of `(configuration, event log, query
//! instant) -> state`. Player-submitted events are merged with ticks
//! generated from the game's recurring schedule and folded, in one total
//! order, through the transition function.
//!
//! # Modules
//!
//! - [`config`] -- Configuration validation and game file loading.
//! - [`schedule`] -- [`ScheduleCursor`], the lazy sequence of tick instants.
//! - [`rules`] -- The per-event transition function [`apply`].
//! - [`replay`] -- [`calculate_state`], the merge-and-fold replay driver.
//! - [`process`] -- Game and process construction, event log appends.
//! - [`setup`] -- Board sizing and random starting placements.
//!
//! # Lifecycle
//!
//! ```text
//! GameConfig --init_game--> GameState --init_process--> Process
//!     Process --process_events(events)--> Process (log appended)
//!     Process --calculate_state(query)--> GameState at `query`
//! ```
//!
//! [`ScheduleCursor`]: schedule::ScheduleCursor
//! [`apply`]: rules::apply
//! [`calculate_state`]: replay::calculate_state

pub mod config;
pub mod process;
pub mod replay;
pub mod rules;
pub mod schedule;
pub mod setup;

pub use config::{ConfigError, GameFile};
pub use process::{ProcessError, init_game, init_process, process_events};
pub use replay::{ReplayError, calculate_state, checkpoint};
pub use rules::{TransitionError, apply};
pub use schedule::{ScheduleCursor, ScheduleError};
pub use setup::{calc_dimensions, initial_placement, initial_placement_with};
