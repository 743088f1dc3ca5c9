//! End-to-end replay scenarios for `gridfall-core`.
//!
//! Each test builds a game through the public lifecycle (`init_game`,
//! `init_process`, `process_events`, `calculate_state`) and checks an
//! observable property of the replayed state.

// Panicking on failure is the correct behavior in test code.
#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use chrono::{DateTime, Duration, Utc};
use gridfall_core::{
    ProcessError, ReplayError, TransitionError, calculate_state, init_game, init_process,
    process_events,
};
use gridfall_types::{
    Action, Cell, Direction, GameConfig, GameEvent, GameState, Outcome, PlayerIndex, Process,
    RuleSet,
};

// =============================================================================
// Helpers
// =============================================================================

fn start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-05-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn minutes(m: i64) -> DateTime<Utc> {
    start() + Duration::minutes(m)
}

/// Noon on day `d` (day 0 is the start date).
fn noon(d: i64) -> DateTime<Utc> {
    start() + Duration::days(d) + Duration::hours(12)
}

/// Minutes from the start to just after noon on day `d`.
fn after_noon(d: i64) -> i64 {
    (noon(d) - start()).num_minutes() + 1
}

/// A game with ticks every day at noon UTC.
fn new_process(players: usize, height: u32, width: u32) -> Process {
    let config = GameConfig {
        players: (0..players).map(|i| format!("player-{i}")).collect(),
        height,
        width,
        start_at: start(),
        schedule: "0 12 * * *".to_owned(),
        timezone: "UTC".to_owned(),
        rules: RuleSet::Legacy,
        starting_action_points: 1,
        starting_health_points: 3,
        starting_range: 2,
    };
    init_process(init_game(config).unwrap())
}

fn event(m: i64, action: Action) -> GameEvent {
    GameEvent::new(minutes(m), action)
}

const fn p(i: usize) -> PlayerIndex {
    PlayerIndex(i)
}

const fn place(player: usize, row: i64, col: i64) -> Action {
    Action::Place {
        player: p(player),
        row,
        col,
    }
}

const fn step(player: usize, direction: Direction) -> Action {
    Action::Move {
        player: p(player),
        direction,
    }
}

const fn fire(player: usize, target: usize) -> Action {
    Action::Fire {
        player: p(player),
        target: p(target),
    }
}

const fn gift_hp(player: usize, target: usize) -> Action {
    Action::GiftHp {
        player: p(player),
        target: p(target),
    }
}

const fn vote(player: usize, target: usize) -> Action {
    Action::Vote {
        player: p(player),
        target: p(target),
    }
}

// =============================================================================
// Determinism and immutability
// =============================================================================

#[test]
fn replay_is_deterministic() {
    let process = new_process(3, 8, 8);
    let process = process_events(
        &process,
        &[
            event(1, place(0, 0, 0)),
            event(2, place(1, 0, 2)),
            event(3, place(2, 5, 5)),
            event(4, fire(0, 1)),
        ],
    )
    .unwrap();

    let query = noon(3);
    let first = calculate_state(query, &process).unwrap();
    let second = calculate_state(query, &process).unwrap();
    assert_eq!(first, second);
}

#[test]
fn replay_never_mutates_the_stored_process() {
    let process = new_process(2, 6, 6);
    let process = process_events(
        &process,
        &[event(1, place(0, 0, 0)), event(2, place(1, 3, 3))],
    )
    .unwrap();
    let snapshot = process.clone();

    let mut first = calculate_state(noon(2), &process).unwrap();
    first.players[0].action_points = 99;
    let second = calculate_state(noon(2), &process).unwrap();

    assert_eq!(process, snapshot);
    // Ticks at noon on days 0, 1 and 2.
    assert_eq!(second.players[0].action_points, 4);
    assert!(!process.state.players[0].placed);
}

#[test]
fn replayed_state_survives_json() {
    let process = new_process(2, 6, 6);
    let process = process_events(
        &process,
        &[
            event(1, place(0, 1, 1)),
            event(2, place(1, 1, 2)),
            event(after_noon(0), fire(0, 1)),
        ],
    )
    .unwrap();
    let state = calculate_state(noon(1), &process).unwrap();

    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["players"][1]["healthPoints"], 2);
    assert_eq!(json["players"][0]["actionPoints"], 2);
    assert!(json["outcome"].is_null());

    let decoded: GameState = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, state);

    // A stored process decodes to one that replays identically.
    let stored = serde_json::to_string(&process).unwrap();
    let restored: Process = serde_json::from_str(&stored).unwrap();
    assert_eq!(restored, process);
    assert_eq!(calculate_state(noon(1), &restored).unwrap(), state);
}

// =============================================================================
// Append discipline
// =============================================================================

#[test]
fn appends_must_be_strictly_after_checkpoint() {
    let process = new_process(2, 6, 6);
    let upgrade = Action::Upgrade { player: p(0) };

    let at_start = process_events(&process, &[GameEvent::new(start(), upgrade.clone())]);
    assert!(matches!(at_start, Err(ProcessError::Retroactive { .. })));

    let after = process_events(&process, &[event(1, upgrade)]);
    assert!(after.is_ok());
}

// =============================================================================
// Win condition
// =============================================================================

#[test]
fn no_placements_means_no_survivors() {
    let process = new_process(4, 8, 8);
    let state = calculate_state(noon(0), &process).unwrap();
    assert!(state.players.iter().all(|pl| pl.disqualified && !pl.alive));
    assert_eq!(state.outcome, Some(Outcome::NoSurvivors));
    assert_eq!(state.outcome.map(Outcome::as_legacy_code), Some(-1));
}

#[test]
fn repeated_fire_eliminates_opponent() {
    let process = new_process(2, 6, 6);
    // Both place, then after three ticks player 0 holds 4 AP.
    let mut events = vec![event(1, place(0, 1, 1)), event(2, place(1, 1, 2))];
    for shot in 0..3 {
        events.push(event(after_noon(2) + shot, fire(0, 1)));
    }
    let process = process_events(&process, &events).unwrap();

    let state = calculate_state(noon(30), &process).unwrap();
    assert_eq!(state.outcome, Some(Outcome::Winner(p(0))));
    assert!(!state.players[1].alive);
    // 4 AP, minus 3 shots, plus the victim's 4 AP.
    assert_eq!(state.players[0].action_points, 4 - 3 + 4);
    assert_eq!(state.players[1].action_points, 0);
}

#[test]
fn decided_games_ignore_later_events() {
    let process = new_process(2, 6, 6);
    let process = process_events(
        &process,
        &[
            event(1, place(0, 1, 1)),
            // Player 1 never places and is disqualified at the first tick,
            // which decides the game. This later event would fail if applied.
            event(24 * 60, Action::Upgrade { player: p(0) }),
        ],
    )
    .unwrap();

    let at_decision = calculate_state(noon(0), &process).unwrap();
    let much_later = calculate_state(noon(10), &process).unwrap();
    assert_eq!(at_decision.outcome, Some(Outcome::Winner(p(0))));
    assert_eq!(at_decision, much_later);
}

// =============================================================================
// Board rules
// =============================================================================

#[test]
fn last_row_is_never_placeable() {
    for col in 0..4 {
        let process = new_process(2, 5, 4);
        let process = process_events(&process, &[event(1, place(0, 4, col))]).unwrap();
        let err = calculate_state(noon(0), &process).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::Transition {
                source: TransitionError::OutOfBounds { row: 4, .. },
                ..
            }
        ));
    }
}

#[test]
fn moving_right_goes_up() {
    let process = new_process(2, 6, 6);
    let process = process_events(
        &process,
        &[
            event(1, place(0, 3, 3)),
            event(2, place(1, 0, 0)),
            event(3, step(0, Direction::Right)),
        ],
    )
    .unwrap();
    let state = calculate_state(minutes(10), &process).unwrap();
    assert_eq!(state.players[0].position, Some(Cell::new(2, 3)));
}

#[test]
fn board_matches_player_positions() {
    let process = new_process(3, 7, 7);
    let after_tick = after_noon(0);
    let process = process_events(
        &process,
        &[
            event(1, place(0, 0, 0)),
            event(2, place(1, 2, 2)),
            event(3, place(2, 4, 4)),
            event(after_tick, step(0, Direction::Down)),
            event(after_tick + 1, step(1, Direction::Left)),
            event(after_tick + 2, step(2, Direction::Up)),
            event(after_tick + 3, step(0, Direction::Down)),
        ],
    )
    .unwrap();
    let state = calculate_state(noon(1) - Duration::minutes(1), &process).unwrap();

    let occupied: Vec<_> = state.board.occupied().collect();
    assert_eq!(occupied.len(), 3);
    for (cell, index) in occupied {
        assert_eq!(state.players[index.get()].position, Some(cell));
    }
    assert_eq!(state.players[0].position, Some(Cell::new(2, 0)));
    assert_eq!(state.players[1].position, Some(Cell::new(2, 1)));
    assert_eq!(state.players[2].position, Some(Cell::new(3, 4)));
}

// =============================================================================
// Jury
// =============================================================================

#[test]
fn jury_bonus_from_three_dead_voters() {
    // Players 0 and 1 survive; players 2..=4 give their health to player 0
    // and die, then vote for player 1.
    let process = new_process(5, 8, 8);
    let mut events = vec![
        event(1, place(0, 0, 0)),
        event(2, place(1, 6, 6)),
        event(3, place(2, 0, 1)),
        event(4, place(3, 1, 0)),
        event(5, place(4, 1, 1)),
    ];
    let mut m = 10;
    for donor in 2..=4 {
        for _ in 0..3 {
            events.push(event(m, gift_hp(donor, 0)));
            m += 1;
        }
    }
    for voter in 2..=4 {
        // Legacy rule: votes must target an index below player_count - 1.
        events.push(event(m, vote(voter, 1)));
        m += 1;
    }
    let process = process_events(&process, &events).unwrap();

    let before_tick = calculate_state(noon(0) - Duration::minutes(1), &process).unwrap();
    assert_eq!(before_tick.players[0].health_points, 3 + 9);
    assert!((2..=4).all(|i| !before_tick.players[i].alive));
    assert_eq!(before_tick.votes[2], Some(p(1)));

    let after_tick = calculate_state(noon(0), &process).unwrap();
    assert_eq!(after_tick.players[0].action_points, 2);
    assert_eq!(after_tick.players[1].action_points, 1 + 1 + 1);
    assert!(after_tick.votes.iter().all(Option::is_none));
    assert_eq!(after_tick.outcome, None);
}
