#![allow(dead_code)]

use retro64::mach::{Runtime, State};
use std::time::{Duration, Instant};

/// Tick a running machine to completion, fast-forwarding past sleeps.
pub fn run(r: &mut Runtime) {
    let mut now = Instant::now();
    for _ in 0..100_000 {
        match r.tick(now) {
            State::Idle => return,
            State::Running { .. } => now += Duration::from_millis(1),
            State::Sleeping { wake, .. } => now = wake + Duration::from_millis(1),
        }
    }
    panic!("program did not finish");
}

/// Every screen row as trimmed ASCII text.
pub fn rows(r: &mut Runtime) -> Vec<String> {
    (0..retro64::mach::ROWS)
        .map(|y| r.screen_mut().row_text(y).trim_end().to_string())
        .collect()
}

/// What the machine printed: non-empty rows, prompt noise dropped.
pub fn printed(r: &mut Runtime) -> Vec<String> {
    rows(r)
        .into_iter()
        .filter(|row| !row.is_empty() && row != "ready.")
        .collect()
}

/// A machine with a blank screen and no blinking cursor, ready for
/// output assertions.
pub fn fresh() -> Runtime {
    let mut r = Runtime::new();
    r.screen_mut().set_cursor_enabled(false);
    r.screen_mut().clear();
    r
}

/// Enter a program, clear the boot noise, and run it.
pub fn run_program(lines: &[&str]) -> Runtime {
    let mut r = fresh();
    for line in lines {
        r.enter(line);
    }
    r.screen_mut().clear();
    r.enter("run");
    run(&mut r);
    r
}
