use std::{cell::RefCell, collections::HashSet, rc::Rc, time::Duration};

use anyhow::Result;
use gridfall_core::{CellCoord, CellState, Event};
use gridfall_level::{query, ClockState, GridLevel, LevelListener, LevelParams, TimedEvent};

#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
}

impl LevelListener for Recorder {
    fn name(&self) -> &'static str {
        "recorder"
    }

    fn on_level_time_changed(&mut self, elapsed: Duration) -> Result<()> {
        self.events.push(Event::LevelTimeChanged { elapsed });
        Ok(())
    }

    fn on_level_duration_reached(&mut self, duration: Duration) -> Result<()> {
        self.events.push(Event::LevelDurationReached { duration });
        Ok(())
    }

    fn on_cell_state_changed(
        &mut self,
        cell: CellCoord,
        old_state: CellState,
        new_state: CellState,
    ) -> Result<()> {
        self.events.push(Event::CellStateChanged {
            cell,
            old_state,
            new_state,
        });
        Ok(())
    }

    fn on_timed_event_started(&mut self, name: &str) -> Result<()> {
        self.events.push(Event::TimedEventStarted {
            name: name.to_owned(),
        });
        Ok(())
    }
}

fn recorded_level(params: LevelParams) -> (GridLevel, Rc<RefCell<Recorder>>) {
    let mut level = GridLevel::new(params).expect("level construction");
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    level.attach_listener(Box::new(Rc::clone(&recorder)));
    (level, recorder)
}

fn seeded_params(width: u32, height: u32, duration_secs: u64, seed: &str) -> LevelParams {
    let mut params = LevelParams::new(width, height, 1.0, Duration::from_secs(duration_secs));
    params.seed = Some(seed.to_owned());
    params
}

#[test]
fn fresh_level_marks_every_cell_usable() {
    let level = GridLevel::new(seeded_params(10, 5, 10, "fresh")).expect("level construction");

    let (width, height) = query::dimensions(&level);
    for y in 0..height {
        for x in 0..width {
            assert_eq!(
                level.cell_state(CellCoord::new(x, y)),
                Ok(CellState::Usable)
            );
        }
    }
}

#[test]
fn rewriting_the_current_state_is_silent() {
    let (mut level, recorder) = recorded_level(seeded_params(4, 4, 10, "idempotent"));
    let cell = CellCoord::new(1, 1);

    let old_state = level
        .set_cell_state(cell, CellState::Usable)
        .expect("in bounds");

    assert_eq!(old_state, CellState::Usable);
    assert_eq!(level.cell_state(cell), Ok(CellState::Usable));
    assert!(recorder.borrow().events.is_empty(), "no broadcast expected");
}

#[test]
fn state_changes_broadcast_exactly_once() {
    let (mut level, recorder) = recorded_level(seeded_params(4, 4, 10, "transition"));
    let cell = CellCoord::new(2, 3);

    let old_state = level
        .set_cell_state(cell, CellState::Anomaly)
        .expect("in bounds");

    assert_eq!(old_state, CellState::Usable);
    assert_eq!(level.cell_state(cell), Ok(CellState::Anomaly));
    assert_eq!(
        recorder.borrow().events,
        vec![Event::CellStateChanged {
            cell,
            old_state: CellState::Usable,
            new_state: CellState::Anomaly,
        }]
    );
}

#[test]
fn sampling_returns_distinct_matching_cells() {
    let mut level = GridLevel::new(seeded_params(10, 5, 10, "sampling")).expect("level");
    for x in 0..4 {
        let _ = level
            .set_cell_state(CellCoord::new(x, 0), CellState::Damaged)
            .expect("in bounds");
    }

    let drawn = level.random_cells_with_state(&[CellState::Damaged], 10);
    assert_eq!(
        drawn,
        vec![
            CellCoord::new(0, 0),
            CellCoord::new(1, 0),
            CellCoord::new(2, 0),
            CellCoord::new(3, 0)
        ],
        "small pools are returned whole, in row-major order"
    );

    let drawn = level.random_cells_with_state(&[CellState::Usable], 12);
    assert_eq!(drawn.len(), 12);
    let distinct: HashSet<CellCoord> = drawn.iter().copied().collect();
    assert_eq!(distinct.len(), 12, "draws must not repeat coordinates");
    for cell in &drawn {
        assert_eq!(
            level.cell_state(*cell),
            Ok(CellState::Usable),
            "draws must match the requested states"
        );
    }
}

#[test]
fn identical_seeds_reproduce_identical_call_sequences() {
    let run = |seed: &str| -> Vec<Vec<CellCoord>> {
        let mut level = GridLevel::new(seeded_params(8, 8, 10, seed)).expect("level");
        let mut draws = Vec::new();

        let first = level.random_cells_with_state(&[CellState::Usable], 6);
        for cell in &first {
            let _ = level.set_cell_state(*cell, CellState::Used).expect("draw");
        }
        draws.push(first);
        draws.push(level.random_cells_with_state(&[CellState::Usable], 6));
        draws.push(level.random_cells_with_state(&[CellState::Used], 3));
        draws
    };

    assert_eq!(run("alpha"), run("alpha"));
    assert_ne!(
        run("alpha"),
        run("omega"),
        "different seeds should diverge on an 8x8 pool"
    );
}

#[test]
fn time_broadcast_cadence_follows_the_clock_contract() {
    let (mut level, recorder) = recorded_level(seeded_params(10, 5, 10, "cadence"));

    for _ in 0..16 {
        level.tick(Duration::from_millis(500));
    }

    let expected: Vec<Event> = (1..=8)
        .map(|secs| Event::LevelTimeChanged {
            elapsed: Duration::from_secs(secs),
        })
        .collect();
    assert_eq!(recorder.borrow().events, expected);
    assert_eq!(query::elapsed(&level), Duration::from_secs(8));

    level.tick(Duration::from_millis(1500));
    level.tick(Duration::from_millis(1500));

    let events = recorder.borrow().events.clone();
    assert_eq!(events.len(), 11);
    assert_eq!(
        events[8],
        Event::LevelTimeChanged {
            elapsed: Duration::from_millis(9500),
        }
    );
    assert_eq!(
        events[9],
        Event::LevelTimeChanged {
            elapsed: Duration::from_secs(10),
        },
        "the boundary broadcast ignores the spacing rule"
    );
    assert_eq!(
        events[10],
        Event::LevelDurationReached {
            duration: Duration::from_secs(10),
        }
    );
    assert_eq!(query::elapsed(&level), Duration::from_secs(10));
    assert_eq!(query::clock_state(&level), ClockState::Ended);

    level.tick(Duration::from_secs(1));
    assert_eq!(
        recorder.borrow().events.len(),
        11,
        "an ended level broadcasts nothing further"
    );
}

#[test]
fn paused_levels_hold_time_and_stay_silent() {
    let (mut level, recorder) = recorded_level(seeded_params(4, 4, 10, "paused"));

    level.tick(Duration::from_millis(700));
    level.pause();
    assert_eq!(query::clock_state(&level), ClockState::Paused);

    for _ in 0..5 {
        level.tick(Duration::from_secs(1));
    }
    assert_eq!(query::elapsed(&level), Duration::from_millis(700));
    assert!(recorder.borrow().events.is_empty());

    level.resume();
    level.tick(Duration::from_millis(300));
    assert_eq!(
        recorder.borrow().events,
        vec![Event::LevelTimeChanged {
            elapsed: Duration::from_secs(1),
        }]
    );
}

#[test]
fn duration_reached_fires_once_even_across_pause_attempts() {
    let (mut level, recorder) = recorded_level(seeded_params(4, 4, 2, "edge"));

    level.tick(Duration::from_secs(3));
    assert_eq!(
        recorder.borrow().events,
        vec![
            Event::LevelTimeChanged {
                elapsed: Duration::from_secs(2),
            },
            Event::LevelDurationReached {
                duration: Duration::from_secs(2),
            },
        ]
    );

    level.pause();
    level.resume();
    level.tick(Duration::from_secs(1));
    assert_eq!(recorder.borrow().events.len(), 2);
}

#[test]
fn timed_events_start_between_time_and_duration_broadcasts() {
    let mut params = seeded_params(6, 6, 8, "events");
    params.timed_events = vec![
        TimedEvent::new("fog-bank".to_owned(), 25.0),
        TimedEvent::new("sirens".to_owned(), 50.0),
        TimedEvent::new("finale".to_owned(), 100.0),
    ];
    let (mut level, recorder) = recorded_level(params);

    assert_eq!(
        query::pending_timed_events(&level),
        vec!["fog-bank", "sirens", "finale"]
    );

    for _ in 0..8 {
        level.tick(Duration::from_secs(1));
    }

    let events = recorder.borrow().events.clone();
    let mut expected = Vec::new();
    for secs in 1..=8u64 {
        expected.push(Event::LevelTimeChanged {
            elapsed: Duration::from_secs(secs),
        });
        if secs == 2 {
            expected.push(Event::TimedEventStarted {
                name: "fog-bank".to_owned(),
            });
        }
        if secs == 4 {
            expected.push(Event::TimedEventStarted {
                name: "sirens".to_owned(),
            });
        }
        if secs == 8 {
            expected.push(Event::TimedEventStarted {
                name: "finale".to_owned(),
            });
        }
    }
    expected.push(Event::LevelDurationReached {
        duration: Duration::from_secs(8),
    });

    assert_eq!(events, expected);
    assert!(query::pending_timed_events(&level).is_empty());
}
