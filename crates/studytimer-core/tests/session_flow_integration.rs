//! Integration tests for the focus/break cycle.
//!
//! Drives the engine through full sessions against real stores and checks
//! the persisted timer state and stats along the way.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use studytimer_core::storage::{load_json, save_json, STATS_KEY, TIMER_KEY};
use studytimer_core::{
    Database, Event, FixedClock, LevelConfig, MemorySink, MemoryStore, StudyStats, TimerEngine,
    TimerMode, TimerState,
};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

fn running_focus() -> TimerState {
    TimerState {
        minutes_remaining: 25,
        seconds_remaining: 0,
        is_running: true,
        is_break: false,
        session_count: 0,
        interval_minutes: 25,
    }
}

#[test]
fn full_focus_session_rolls_into_break() {
    let store = Arc::new(MemoryStore::new());
    save_json(&store, TIMER_KEY, &running_focus()).unwrap();
    let sink = Arc::new(MemorySink::new());

    let mut engine = TimerEngine::initialize(
        LevelConfig::STANDARD,
        Arc::clone(&store),
        sink.clone(),
        Arc::new(FixedClock::on(day())),
    )
    .unwrap();

    for _ in 0..1500 {
        assert!(engine.tick().is_none());
    }
    assert_eq!(engine.state().display(), "00:00");
    assert!(engine.is_running());

    // The tick at 00:00 performs the switch.
    let event = engine.tick().expect("transition at zero");
    assert!(matches!(
        event,
        Event::ModeSwitched {
            completed_focus: true,
            is_long_break: false,
            ..
        }
    ));
    assert_eq!(
        *engine.state(),
        TimerState {
            minutes_remaining: 5,
            seconds_remaining: 0,
            is_running: false,
            is_break: true,
            session_count: 1,
            interval_minutes: 5,
        }
    );

    let stats: StudyStats = load_json(&store, STATS_KEY).unwrap().unwrap();
    assert_eq!(stats.total_sessions, 1);
    assert_eq!(stats.total_minutes, 25);
    assert_eq!(stats.current_streak, 1);
    assert_eq!(stats.last_study_date, Some(day()));

    let saved: TimerState = load_json(&store, TIMER_KEY).unwrap().unwrap();
    assert_eq!(saved, *engine.state());

    let notes = sink.received();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].body, "Time for a break.");
}

#[test]
fn fourth_session_earns_long_break() {
    let store = MemoryStore::new();
    save_json(
        &store,
        TIMER_KEY,
        &TimerState {
            minutes_remaining: 0,
            seconds_remaining: 0,
            session_count: 3,
            interval_minutes: 45,
            ..running_focus()
        },
    )
    .unwrap();
    let mut engine = TimerEngine::initialize(
        LevelConfig::EXAM_TRACK_A,
        store,
        Arc::new(MemorySink::new()),
        Arc::new(FixedClock::on(day())),
    )
    .unwrap();

    engine.tick();
    assert_eq!(engine.state().mode(), TimerMode::LongBreak);
    assert_eq!(engine.state().minutes_remaining, 30);
    assert_eq!(engine.state().session_count, 4);
    assert_eq!(engine.stats().total_minutes, 45);
}

#[test]
fn third_session_gets_short_break() {
    let store = MemoryStore::new();
    save_json(
        &store,
        TIMER_KEY,
        &TimerState {
            minutes_remaining: 0,
            seconds_remaining: 0,
            session_count: 2,
            ..running_focus()
        },
    )
    .unwrap();
    let mut engine = TimerEngine::initialize(
        LevelConfig::STANDARD,
        store,
        Arc::new(MemorySink::new()),
        Arc::new(FixedClock::on(day())),
    )
    .unwrap();

    engine.tick();
    assert_eq!(engine.state().mode(), TimerMode::Break);
    assert_eq!(engine.state().minutes_remaining, 5);
}

#[test]
fn state_and_stats_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studytimer.db");
    let clock = Arc::new(FixedClock::on(day()));

    {
        let db = Database::open_at(&path).unwrap();
        let mut engine = TimerEngine::initialize(
            LevelConfig::STANDARD,
            db,
            Arc::new(MemorySink::new()),
            clock.clone(),
        )
        .unwrap();
        engine.toggle_mode();
        engine.toggle_mode();
        engine.start();
        for _ in 0..30 {
            engine.tick();
        }
        engine.persist().unwrap();
    }

    clock.advance(Duration::days(1));
    let db = Database::open_at(&path).unwrap();
    let mut engine = TimerEngine::initialize(
        LevelConfig::STANDARD,
        db,
        Arc::new(MemorySink::new()),
        clock.clone(),
    )
    .unwrap();
    assert_eq!(engine.state().display(), "24:30");
    assert!(engine.is_running());
    assert_eq!(engine.state().session_count, 1);
    assert_eq!(engine.stats().total_sessions, 1);

    engine.toggle_mode();
    assert_eq!(engine.stats().total_sessions, 2);
    assert_eq!(engine.stats().current_streak, 2);
}

#[test]
fn level_change_between_runs_keeps_started_session_length() {
    let store = Arc::new(MemoryStore::new());
    {
        let mut engine = TimerEngine::initialize(
            LevelConfig::STANDARD,
            Arc::clone(&store),
            Arc::new(MemorySink::new()),
            Arc::new(FixedClock::on(day())),
        )
        .unwrap();
        engine.start();
        for _ in 0..100 {
            engine.tick();
        }
    }

    let mut engine = TimerEngine::initialize(
        LevelConfig::EXAM_TRACK_B,
        Arc::clone(&store),
        Arc::new(MemorySink::new()),
        Arc::new(FixedClock::on(day())),
    )
    .unwrap();
    assert!((engine.progress() - 100.0 / 1500.0).abs() < 1e-9);
    while engine.tick().is_none() {}

    assert_eq!(engine.stats().total_minutes, 25);
    assert_eq!(engine.state().minutes_remaining, 10);
}

#[test]
fn same_day_sessions_count_streak_once() {
    let mut engine = TimerEngine::initialize(
        LevelConfig::EXAM_TRACK_B,
        MemoryStore::new(),
        Arc::new(MemorySink::new()),
        Arc::new(FixedClock::on(day())),
    )
    .unwrap();
    for _ in 0..4 {
        engine.toggle_mode();
    }
    let stats = engine.stats();
    assert_eq!(stats.total_sessions, 2);
    assert_eq!(stats.total_minutes, 100);
    assert_eq!(stats.current_streak, 1);
}

#[test]
fn out_of_range_seconds_on_disk_are_replaced() {
    let store = MemoryStore::new();
    store_raw(
        &store,
        r#"{"minutesRemaining":10,"secondsRemaining":99,"isRunning":false,"isBreak":true,"sessionCount":2}"#,
    );
    let engine = TimerEngine::initialize(
        LevelConfig::STANDARD,
        store,
        Arc::new(MemorySink::new()),
        Arc::new(FixedClock::on(day())),
    )
    .unwrap();
    assert_eq!(*engine.state(), TimerState::seeded(&LevelConfig::STANDARD));
}

#[test]
fn wrong_types_on_disk_are_replaced() {
    let store = MemoryStore::new();
    store_raw(
        &store,
        r#"{"minutesRemaining":"ten","secondsRemaining":0,"isRunning":false,"isBreak":true,"sessionCount":2}"#,
    );
    let engine = TimerEngine::initialize(
        LevelConfig::STANDARD,
        store,
        Arc::new(MemorySink::new()),
        Arc::new(FixedClock::on(day())),
    )
    .unwrap();
    assert_eq!(engine.state().minutes_remaining, 25);
    assert!(!engine.state().is_break);
}

fn store_raw(store: &MemoryStore, raw: &str) {
    use studytimer_core::KeyValueStore;
    store.set(TIMER_KEY, raw).unwrap();
}

fn arb_state() -> impl Strategy<Value = TimerState> {
    (0u32..90, 0u32..60, any::<bool>(), any::<bool>(), 0u32..40).prop_map(
        |(minutes, seconds, is_running, is_break, sessions)| TimerState {
            minutes_remaining: minutes,
            seconds_remaining: seconds,
            is_running,
            is_break,
            session_count: sessions,
            interval_minutes: 0,
        },
    )
}

proptest! {
    #[test]
    fn ticks_keep_seconds_in_range(state in arb_state(), ticks in 0usize..400) {
        let store = MemoryStore::new();
        save_json(&store, TIMER_KEY, &state).unwrap();
        let mut engine = TimerEngine::initialize(
            LevelConfig::STANDARD,
            store,
            Arc::new(MemorySink::new()),
            Arc::new(FixedClock::on(day())),
        )
        .unwrap();

        for _ in 0..ticks {
            let before = *engine.state();
            let event = engine.tick();
            let after = *engine.state();
            prop_assert!(after.seconds_remaining <= 59);
            match event {
                Some(_) => {
                    prop_assert_eq!(before.seconds_left(), 0);
                    prop_assert!(!after.is_running);
                    prop_assert_ne!(before.is_break, after.is_break);
                }
                None if before.is_running => {
                    prop_assert_eq!(after.seconds_left() + 1, before.seconds_left());
                }
                None => {
                    prop_assert_eq!(before, after);
                }
            }
        }
    }

    #[test]
    fn toggling_twice_adds_one_session(state in arb_state()) {
        let focus = TimerState { is_break: false, ..state };
        let store = MemoryStore::new();
        save_json(&store, TIMER_KEY, &focus).unwrap();
        let mut engine = TimerEngine::initialize(
            LevelConfig::STANDARD,
            store,
            Arc::new(MemorySink::new()),
            Arc::new(FixedClock::on(day())),
        )
        .unwrap();
        engine.toggle_mode();
        engine.toggle_mode();
        prop_assert!(!engine.state().is_break);
        prop_assert_eq!(engine.state().session_count, focus.session_count + 1);
        prop_assert_eq!(engine.state().minutes_remaining, 25);
    }
}
