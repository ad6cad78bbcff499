mod common;
use common::*;
use retro64::mach::{Runtime, State};
use std::time::{Duration, Instant};

#[test]
fn test_idle_machine_ticks_to_idle() {
    let mut r = fresh();
    assert_eq!(r.tick(Instant::now()), State::Idle);
    assert_eq!(r.tick(Instant::now()), State::Idle);
}

#[test]
fn test_run_executes_one_line_per_tick() {
    let mut r = fresh();
    r.enter("10 print 1");
    r.enter("20 print 2");
    r.screen_mut().clear();
    r.enter("run");
    assert_eq!(r.state(), State::Running { index: 0 });
    let now = Instant::now();
    assert_eq!(r.tick(now), State::Running { index: 1 });
    assert_eq!(printed(&mut r), vec![" 1"]);
    assert_eq!(r.tick(now), State::Running { index: 2 });
    assert_eq!(printed(&mut r), vec![" 1", " 2"]);
    // past the last line: prompt and idle
    assert_eq!(r.tick(now), State::Idle);
}

#[test]
fn test_sleep_is_a_polled_deadline() {
    let mut r = fresh();
    r.enter("10 print 1");
    r.enter("20 sleep 2");
    r.enter("30 print 2");
    r.screen_mut().clear();
    r.enter("run");
    let t0 = Instant::now();
    r.tick(t0); // line 10
    let state = r.tick(t0); // line 20 raises Sleep
    let wake = match state {
        State::Sleeping { index, wake } => {
            assert_eq!(index, 2);
            wake
        }
        other => panic!("expected sleeping, got {:?}", other),
    };
    assert_eq!(wake, t0 + Duration::from_secs(2));
    // before the deadline: nothing happens, no side effects
    let early = t0 + Duration::from_secs(1);
    assert_eq!(r.tick(early), state);
    assert_eq!(printed(&mut r), vec![" 1"]);
    // at the deadline: resumes at the stored index and proceeds
    let late = t0 + Duration::from_millis(2001);
    assert_eq!(r.tick(late), State::Running { index: 3 });
    assert_eq!(printed(&mut r), vec![" 1", " 2"]);
}

#[test]
fn test_sleep_zero_is_a_noop() {
    let r = &mut run_program(&["10 sleep 0", "20 print 2"]);
    assert_eq!(printed(r), vec![" 2"]);
}

#[test]
fn test_sleep_out_of_range() {
    let r = &mut run_program(&["10 sleep 61"]);
    assert_eq!(printed(r), vec!["?illegal quantity error in 10"]);
}

#[test]
fn test_sleep_must_be_alone() {
    let r = &mut run_program(&["10 sleep 1: print 1"]);
    assert_eq!(printed(r), vec!["?sleep not alone on line error in 10"]);
}

#[test]
fn test_interrupt_breaks_within_one_tick() {
    let mut r = fresh();
    r.enter("10 goto 10");
    r.screen_mut().clear();
    r.enter("run");
    let now = Instant::now();
    r.tick(now);
    r.tick(now);
    r.interrupt();
    assert_eq!(r.tick(now), State::Idle);
    assert_eq!(printed(&mut r), vec!["break in 10"]);
}

#[test]
fn test_interrupt_while_sleeping_reports_sleep_line() {
    let mut r = fresh();
    r.enter("10 sleep 30");
    r.enter("20 print 2");
    r.screen_mut().clear();
    r.enter("run");
    let now = Instant::now();
    r.tick(now); // enters Sleeping
    r.interrupt();
    assert_eq!(r.tick(now), State::Idle);
    assert_eq!(printed(&mut r), vec!["break in 10"]);
}

#[test]
fn test_interrupt_when_idle_is_harmless() {
    let mut r = fresh();
    r.interrupt();
    assert_eq!(r.tick(Instant::now()), State::Idle);
    r.enter("?1");
    assert_eq!(printed(&mut r), vec![" 1"]);
}

#[test]
fn test_error_mid_program_returns_to_direct_mode() {
    let r = &mut run_program(&["10 print 1", "20 poke 99999, 0", "30 print 3"]);
    assert_eq!(
        printed(r),
        vec![" 1", "?illegal quantity error in 20"]
    );
    r.screen_mut().clear();
    r.enter("?9");
    assert_eq!(printed(r), vec![" 9"]);
}

#[test]
fn test_run_from_line() {
    let mut r = fresh();
    r.enter("10 print 10");
    r.enter("20 print 20");
    r.screen_mut().clear();
    r.enter("run 20");
    run(&mut r);
    assert_eq!(printed(&mut r), vec![" 20"]);
}

#[test]
fn test_run_resets_data_cursor() {
    let mut r = fresh();
    r.enter("10 data 7,8");
    r.enter("20 read a");
    r.enter("run");
    run(&mut r);
    assert_eq!(r.variable("a").unwrap().to_i64().unwrap(), 7);
    r.enter("run");
    run(&mut r);
    assert_eq!(r.variable("a").unwrap().to_i64().unwrap(), 7);
}

#[test]
fn test_run_on_empty_program_does_nothing() {
    let mut r = fresh();
    r.enter("run");
    assert_eq!(r.state(), State::Idle);
}

#[test]
fn test_reset_clears_everything() {
    let mut r = fresh();
    r.enter("10 print 1");
    r.enter("x = 5");
    r.enter("poke 53280, 3");
    r.enter("sys 64738");
    assert!(r.program().is_empty());
    assert_eq!(r.variable("x"), None);
    assert_eq!(r.screen().border(), 14);
    // the power-on banner is back
    assert!(rows(&mut r).iter().any(|row| row.contains("commodore 64")));
}

#[test]
fn test_machine_survives_many_direct_errors() {
    let mut r = fresh();
    for _ in 0..10 {
        r.enter("poke 99999, 0");
    }
    r.screen_mut().clear();
    r.enter("?1");
    assert_eq!(printed(&mut r), vec![" 1"]);
}

#[test]
fn test_scenario_counting_loop() {
    let mut r = Runtime::new();
    r.enter("10 x = 1");
    r.enter("20 x = x + 1");
    r.enter("30 if x < 3 then goto 20");
    r.enter("40 print x");
    r.screen_mut().clear();
    r.enter("run");
    run(&mut r);
    assert_eq!(printed(&mut r), vec![" 3"]);
}
