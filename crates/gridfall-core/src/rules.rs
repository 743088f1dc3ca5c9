//! The transition function: one event applied to one state.
//!
//! [`apply`] never mutates its input. It clones the previous state, checks
//! the event's preconditions against it, applies the effects to the clone,
//! re-evaluates the win condition, and returns the clone. A rejected event
//! leaves the caller's state exactly as it was.
//!
//! # Check order
//!
//! 1. The game must not be decided.
//! 2. The event must be strictly after the configured start.
//! 3. For player actions: the actor must exist and must not be
//!    disqualified.
//! 4. Kind-specific preconditions (see the per-kind functions).
//!
//! # Legacy quirks
//!
//! Under [`RuleSet::Legacy`] four historical behaviors are reproduced
//! exactly, because recorded games depend on them:
//!
//! - `RIGHT` moves up (same vector as `UP`).
//! - Targeting distance compares the target's row against the actor's
//!   column.
//! - A vote target must be below `player_count - 1`.
//! - Health gifts may go to dead players.
//!
//! [`RuleSet::Corrected`] fixes all four.

use gridfall_types::{
    Action, Cell, Direction, GameEvent, GameState, Outcome, PlayerIndex, PlayerState, RuleSet,
};
use tracing::{debug, info};

/// AP spent by a move, a shot, or a gift.
const ACTION_COST: u32 = 1;

/// AP spent on a range upgrade.
const UPGRADE_COST: u32 = 3;

/// Jury votes needed for one bonus AP at a tick.
const JURY_VOTES_PER_BONUS: u32 = 3;

/// Coordinate reported for an unplaced player in distance calculations.
const UNPLACED: i64 = -1;

/// Reasons an event can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The game already has an outcome.
    #[error("game is already complete")]
    GameOver,

    /// The event is not after the game start.
    #[error("game has not started: event at {submitted_at} is not after start {start_at}")]
    NotStarted {
        /// Instant of the rejected event.
        submitted_at: chrono::DateTime<chrono::Utc>,
        /// Configured start.
        start_at: chrono::DateTime<chrono::Utc>,
    },

    /// The acting player does not exist.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerIndex),

    /// The acting player was disqualified.
    #[error("player {0} is disqualified")]
    Disqualified(PlayerIndex),

    /// The player already occupies a cell.
    #[error("player {0} is already placed")]
    AlreadyPlaced(PlayerIndex),

    /// The player has not occupied a cell yet.
    #[error("player {0} is not placed")]
    NotPlaced(PlayerIndex),

    /// The player is dead.
    #[error("player {0} is not alive")]
    NotAlive(PlayerIndex),

    /// The player cannot afford the action.
    #[error("player {player} has {available} AP but needs {required}")]
    InsufficientActionPoints {
        /// Acting player.
        player: PlayerIndex,
        /// AP held.
        available: u32,
        /// AP required.
        required: u32,
    },

    /// The player has no health to give.
    #[error("player {player} has {available} HP but needs at least 1")]
    InsufficientHealthPoints {
        /// Acting player.
        player: PlayerIndex,
        /// HP held.
        available: i32,
    },

    /// The destination is outside the playable area.
    #[error("cell ({row}, {col}) is out of bounds")]
    OutOfBounds {
        /// Requested row.
        row: i64,
        /// Requested column.
        col: i64,
    },

    /// The destination is taken.
    #[error("cell ({}, {}) is occupied by player {occupant}", cell.row, cell.col)]
    CellOccupied {
        /// Requested cell.
        cell: Cell,
        /// Current occupant.
        occupant: PlayerIndex,
    },

    /// The target is further away than the actor's range.
    #[error("target {target} is at distance {distance}, beyond range {range}")]
    OutOfRange {
        /// Targeted player.
        target: PlayerIndex,
        /// Computed distance.
        distance: i64,
        /// Actor's range.
        range: u32,
    },

    /// The target index is not acceptable for this action.
    #[error("invalid target {0}")]
    InvalidTarget(PlayerIndex),

    /// The target must be alive for this action.
    #[error("target {0} is not alive")]
    TargetNotAlive(PlayerIndex),

    /// Only dead players may vote.
    #[error("player {0} must be dead to vote")]
    VoterAlive(PlayerIndex),

    /// The player has already voted this round.
    #[error("player {0} has already voted this round")]
    AlreadyVoted(PlayerIndex),

    /// A counter left its representable range.
    #[error("arithmetic overflow while {context}")]
    ArithmeticOverflow {
        /// What was being computed.
        context: &'static str,
    },
}

/// Apply one event to `state`, returning the successor state.
///
/// # Errors
///
/// Returns [`TransitionError`] describing the first precondition the event
/// violates. `state` is unchanged either way.
pub fn apply(event: &GameEvent, state: &GameState) -> Result<GameState, TransitionError> {
    if state.is_over() {
        return Err(TransitionError::GameOver);
    }
    if event.submitted_at <= state.config.start_at {
        return Err(TransitionError::NotStarted {
            submitted_at: event.submitted_at,
            start_at: state.config.start_at,
        });
    }
    if let Some(actor) = event.action.actor() {
        let player = state
            .player(actor)
            .ok_or(TransitionError::UnknownPlayer(actor))?;
        if player.disqualified {
            return Err(TransitionError::Disqualified(actor));
        }
    }

    let mut next = state.clone();
    match event.action {
        Action::Tick => tick(&mut next)?,
        Action::Place { player, row, col } => place(&mut next, player, row, col)?,
        Action::Move { player, direction } => move_player(&mut next, player, direction)?,
        Action::Fire { player, target } => fire(&mut next, player, target)?,
        Action::Vote { player, target } => vote(&mut next, player, target)?,
        Action::GiftAp { player, target } => gift_action_point(&mut next, player, target)?,
        Action::GiftHp { player, target } => gift_health_point(&mut next, player, target)?,
        Action::Upgrade { player } => upgrade(&mut next, player)?,
    }

    next.outcome = evaluate_outcome(&next);
    debug!(
        kind = event.action.kind(),
        actor = ?event.action.actor(),
        at = %event.submitted_at,
        "Event applied"
    );
    if let Some(outcome) = next.outcome {
        info!(?outcome, at = %event.submitted_at, "Game decided");
    }
    Ok(next)
}

/// Decide the game from the number of living players.
///
/// Exactly one survivor wins; none means no winner; otherwise undecided.
pub fn evaluate_outcome(state: &GameState) -> Option<Outcome> {
    let mut alive = state.alive_players();
    match (alive.next(), alive.next()) {
        (None, _) => Some(Outcome::NoSurvivors),
        (Some(winner), None) => Some(Outcome::Winner(winner)),
        (Some(_), Some(_)) => None,
    }
}

// ---------------------------------------------------------------------------
// Tick
// ---------------------------------------------------------------------------

/// Turn boundary: disqualify unplaced players, resolve the jury, and hand
/// out action points.
///
/// A vote counts only if its voter is dead but not disqualified and its
/// target is alive. Every living, placed player gains one AP, plus one for
/// each full three jury votes received. All votes are then cleared.
fn tick(state: &mut GameState) -> Result<(), TransitionError> {
    for player in &mut state.players {
        if !player.placed {
            player.alive = false;
            player.disqualified = true;
        }
    }

    let mut tally = vec![0_u32; state.players.len()];
    for (voter, target) in state.votes.iter().enumerate() {
        let Some(target) = *target else { continue };
        let counts = state
            .players
            .get(voter)
            .is_some_and(|v| !v.alive && !v.disqualified)
            && state.player(target).is_some_and(|t| t.alive);
        if counts {
            if let Some(slot) = tally.get_mut(target.get()) {
                *slot = slot.checked_add(1).ok_or(TransitionError::ArithmeticOverflow {
                    context: "tallying jury votes",
                })?;
            }
        }
    }

    for (player, votes) in state.players.iter_mut().zip(&tally) {
        if player.alive && player.placed {
            let bonus = votes.checked_div(JURY_VOTES_PER_BONUS).unwrap_or(0);
            let award = ACTION_COST
                .checked_add(bonus)
                .ok_or(TransitionError::ArithmeticOverflow {
                    context: "computing jury bonus",
                })?;
            gain_action_points(player, award)?;
            if bonus > 0 {
                debug!(votes, bonus, "Jury bonus awarded");
            }
        }
    }

    state.votes.iter_mut().for_each(|v| *v = None);
    Ok(())
}

// ---------------------------------------------------------------------------
// Board actions
// ---------------------------------------------------------------------------

/// Occupy a starting cell.
///
/// Requires the player to be unplaced and to hold at least one AP, although
/// no AP is spent. Rows are playable up to, but excluding, the last row.
fn place(
    state: &mut GameState,
    index: PlayerIndex,
    row: i64,
    col: i64,
) -> Result<(), TransitionError> {
    let player = player(state, index)?;
    if player.placed {
        return Err(TransitionError::AlreadyPlaced(index));
    }
    require_action_points(index, player, ACTION_COST)?;
    let cell = vacant_playable_cell(state, row, col)?;

    state.board.set(cell, Some(index));
    let player = player_mut(state, index)?;
    player.placed = true;
    player.position = Some(cell);
    Ok(())
}

/// Move one cell in `direction`, spending one AP.
fn move_player(
    state: &mut GameState,
    index: PlayerIndex,
    direction: Direction,
) -> Result<(), TransitionError> {
    let player = player(state, index)?;
    let from = match player.position {
        Some(cell) if player.placed => cell,
        _ => return Err(TransitionError::NotPlaced(index)),
    };
    if !player.alive {
        return Err(TransitionError::NotAlive(index));
    }
    require_action_points(index, player, ACTION_COST)?;

    let (d_row, d_col) = direction_offset(direction, state.config.rules);
    let row = i64::from(from.row).saturating_add(d_row);
    let col = i64::from(from.col).saturating_add(d_col);
    let to = vacant_playable_cell(state, row, col)?;

    spend_action_points(player_mut(state, index)?, ACTION_COST)?;
    state.board.set(from, None);
    state.board.set(to, Some(index));
    player_mut(state, index)?.position = Some(to);
    Ok(())
}

/// Unit vector for `direction` as `(row, col)` deltas.
const fn direction_offset(direction: Direction, rules: RuleSet) -> (i64, i64) {
    match (direction, rules) {
        (Direction::Up, _) | (Direction::Right, RuleSet::Legacy) => (-1, 0),
        (Direction::Down, _) => (1, 0),
        (Direction::Left, _) => (0, -1),
        (Direction::Right, RuleSet::Corrected) => (0, 1),
    }
}

/// Resolve `(row, col)` to a cell that is inside the playable area and
/// unoccupied.
fn vacant_playable_cell(state: &GameState, row: i64, col: i64) -> Result<Cell, TransitionError> {
    let last_row = i64::from(state.board.height()).saturating_sub(1);
    let width = i64::from(state.board.width());
    let in_bounds = (0..last_row).contains(&row) && (0..width).contains(&col);
    let cell = match (u32::try_from(row), u32::try_from(col)) {
        (Ok(r), Ok(c)) if in_bounds => Cell::new(r, c),
        _ => return Err(TransitionError::OutOfBounds { row, col }),
    };
    match state.board.occupant(cell) {
        Some(occupant) => Err(TransitionError::CellOccupied { cell, occupant }),
        None => Ok(cell),
    }
}

// ---------------------------------------------------------------------------
// Player-to-player actions
// ---------------------------------------------------------------------------

/// Shoot `target` for one HP at the cost of one AP.
///
/// A target brought to zero HP or below dies: its votes (cast and
/// received) are voided and its AP passes to the shooter.
fn fire(
    state: &mut GameState,
    index: PlayerIndex,
    target: PlayerIndex,
) -> Result<(), TransitionError> {
    let shooter = player(state, index)?;
    require_action_points(index, shooter, ACTION_COST)?;
    let victim = state.player(target).ok_or(TransitionError::InvalidTarget(target))?;
    require_in_range(state.config.rules, shooter, victim, target)?;

    let victim = player_mut(state, target)?;
    victim.health_points = victim
        .health_points
        .checked_sub(1)
        .ok_or(TransitionError::ArithmeticOverflow {
            context: "applying damage",
        })?;
    spend_action_points(player_mut(state, index)?, ACTION_COST)?;

    let victim = player_mut(state, target)?;
    if victim.health_points <= 0 {
        victim.alive = false;
        let loot = core::mem::take(&mut victim.action_points);
        for (voter, vote) in state.votes.iter_mut().enumerate() {
            if voter == target.get() || *vote == Some(target) {
                *vote = None;
            }
        }
        gain_action_points(player_mut(state, index)?, loot)?;
        // The shooter may have targeted itself; its AP was just taken above.
        if index == target {
            player_mut(state, target)?.action_points = 0;
        }
        debug!(shooter = %index, victim = %target, loot, "Player eliminated");
    }
    Ok(())
}

/// Give one AP to a living player within range.
fn gift_action_point(
    state: &mut GameState,
    index: PlayerIndex,
    target: PlayerIndex,
) -> Result<(), TransitionError> {
    let giver = player(state, index)?;
    require_action_points(index, giver, ACTION_COST)?;
    let recipient = state.player(target).ok_or(TransitionError::InvalidTarget(target))?;
    if !recipient.alive {
        return Err(TransitionError::TargetNotAlive(target));
    }
    require_in_range(state.config.rules, giver, recipient, target)?;

    gain_action_points(player_mut(state, target)?, ACTION_COST)?;
    spend_action_points(player_mut(state, index)?, ACTION_COST)?;
    Ok(())
}

/// Give one HP to a player within range. A giver left with no HP dies.
fn gift_health_point(
    state: &mut GameState,
    index: PlayerIndex,
    target: PlayerIndex,
) -> Result<(), TransitionError> {
    let giver = player(state, index)?;
    if giver.health_points < 1 {
        return Err(TransitionError::InsufficientHealthPoints {
            player: index,
            available: giver.health_points,
        });
    }
    let recipient = state.player(target).ok_or(TransitionError::InvalidTarget(target))?;
    if state.config.rules == RuleSet::Corrected && !recipient.alive {
        return Err(TransitionError::TargetNotAlive(target));
    }
    require_in_range(state.config.rules, giver, recipient, target)?;

    let recipient = player_mut(state, target)?;
    recipient.health_points = recipient
        .health_points
        .checked_add(1)
        .ok_or(TransitionError::ArithmeticOverflow {
            context: "receiving health",
        })?;
    let giver = player_mut(state, index)?;
    giver.health_points = giver
        .health_points
        .checked_sub(1)
        .ok_or(TransitionError::ArithmeticOverflow {
            context: "giving health",
        })?;
    if giver.health_points <= 0 {
        giver.alive = false;
    }
    Ok(())
}

/// Spend three AP for one more point of range.
fn upgrade(state: &mut GameState, index: PlayerIndex) -> Result<(), TransitionError> {
    require_action_points(index, player(state, index)?, UPGRADE_COST)?;
    let player = player_mut(state, index)?;
    spend_action_points(player, UPGRADE_COST)?;
    player.range = player
        .range
        .checked_add(1)
        .ok_or(TransitionError::ArithmeticOverflow {
            context: "upgrading range",
        })?;
    Ok(())
}

/// Cast a jury vote. Only dead players may vote, once per round.
fn vote(
    state: &mut GameState,
    index: PlayerIndex,
    target: PlayerIndex,
) -> Result<(), TransitionError> {
    if player(state, index)?.alive {
        return Err(TransitionError::VoterAlive(index));
    }
    if state.vote_of(index).is_some() {
        return Err(TransitionError::AlreadyVoted(index));
    }
    let count = state.players.len();
    let bound = match state.config.rules {
        RuleSet::Legacy => count.saturating_sub(1),
        RuleSet::Corrected => count,
    };
    if target.get() >= bound {
        return Err(TransitionError::InvalidTarget(target));
    }
    if let Some(slot) = state.votes.get_mut(index.get()) {
        *slot = Some(target);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn player(state: &GameState, index: PlayerIndex) -> Result<&PlayerState, TransitionError> {
    state.player(index).ok_or(TransitionError::UnknownPlayer(index))
}

fn player_mut(
    state: &mut GameState,
    index: PlayerIndex,
) -> Result<&mut PlayerState, TransitionError> {
    state.player_mut(index).ok_or(TransitionError::UnknownPlayer(index))
}

const fn require_action_points(
    index: PlayerIndex,
    player: &PlayerState,
    required: u32,
) -> Result<(), TransitionError> {
    if player.action_points < required {
        return Err(TransitionError::InsufficientActionPoints {
            player: index,
            available: player.action_points,
            required,
        });
    }
    Ok(())
}

fn spend_action_points(player: &mut PlayerState, amount: u32) -> Result<(), TransitionError> {
    player.action_points = player
        .action_points
        .checked_sub(amount)
        .ok_or(TransitionError::ArithmeticOverflow {
            context: "spending action points",
        })?;
    Ok(())
}

fn gain_action_points(player: &mut PlayerState, amount: u32) -> Result<(), TransitionError> {
    player.action_points = player
        .action_points
        .checked_add(amount)
        .ok_or(TransitionError::ArithmeticOverflow {
            context: "granting action points",
        })?;
    Ok(())
}

/// Row and column of a player, `(-1, -1)` while unplaced.
fn coordinates(player: &PlayerState) -> (i64, i64) {
    player
        .position
        .map_or((UNPLACED, UNPLACED), |c| (i64::from(c.row), i64::from(c.col)))
}

/// Chebyshev-style distance between two players under `rules`.
pub fn distance(rules: RuleSet, actor: &PlayerState, target: &PlayerState) -> i64 {
    let (actor_row, actor_col) = coordinates(actor);
    let (target_row, target_col) = coordinates(target);
    let row_reference = match rules {
        RuleSet::Legacy => actor_col,
        RuleSet::Corrected => actor_row,
    };
    let d_col = target_col.saturating_sub(actor_col).saturating_abs();
    let d_row = target_row.saturating_sub(row_reference).saturating_abs();
    d_col.max(d_row)
}

fn require_in_range(
    rules: RuleSet,
    actor: &PlayerState,
    target: &PlayerState,
    target_index: PlayerIndex,
) -> Result<(), TransitionError> {
    let distance = distance(rules, actor, target);
    if distance > i64::from(actor.range) {
        return Err(TransitionError::OutOfRange {
            target: target_index,
            distance,
            range: actor.range,
        });
    }
    Ok(())
}
