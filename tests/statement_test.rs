mod common;
use common::*;
use retro64::mach::Val;

#[test]
fn test_poke_drives_border_register_hook() {
    let mut r = fresh();
    r.enter("poke 53280, 2");
    assert_eq!(r.screen().border(), 2);
    r.enter("x = peek(53280)");
    assert_eq!(r.variable("x"), Some(Val::Integer(2)));
}

#[test]
fn test_poke_range_checks() {
    let mut r = fresh();
    r.enter("poke 70000, 1");
    assert_eq!(printed(&mut r), vec!["?illegal quantity error"]);
    let mut r = fresh();
    r.enter("poke 100, 256");
    assert_eq!(printed(&mut r), vec!["?illegal quantity error"]);
}

#[test]
fn test_pokew_requires_even_address() {
    let mut r = fresh();
    r.enter("pokew 49153, 1");
    assert_eq!(printed(&mut r), vec!["?illegal quantity error"]);
    let mut r = fresh();
    r.enter("pokew 49152, 65535");
    r.enter("y = peekw(49152)");
    assert_eq!(r.variable("y"), Some(Val::Integer(65535)));
}

#[test]
fn test_abbreviated_spellings() {
    let mut r = fresh();
    r.enter("pO 53281, 3");
    assert_eq!(r.screen().background(), 3);
    let mut r = fresh();
    r.enter("?1");
    assert_eq!(printed(&mut r), vec![" 1"]);
}

#[test]
fn test_print_suppressed_newline() {
    let mut r = fresh();
    r.enter("?1;:?2");
    assert_eq!(printed(&mut r), vec![" 1  2"]);
}

#[test]
fn test_if_then_and_if_goto() {
    let r = &mut run_program(&[
        "10 x = 1",
        "20 x = x + 1",
        "30 if x < 3 then goto 20",
        "40 print x",
    ]);
    assert_eq!(printed(r), vec![" 3"]);

    let r = &mut run_program(&["10 if 1 goto 30", "20 print 20", "30 print 30"]);
    assert_eq!(printed(r), vec![" 30"]);
}

#[test]
fn test_for_next_visits_in_order() {
    let r = &mut run_program(&["10 for i = 1 to 5", "20 print i", "30 next i"]);
    assert_eq!(printed(r), vec![" 1", " 2", " 3", " 4", " 5"]);
    assert_eq!(r.variable("i"), Some(Val::Integer(5)));
}

#[test]
fn test_for_with_step() {
    let r = &mut run_program(&["10 for i = 1 to 7 step 2", "20 print i", "30 next i"]);
    assert_eq!(printed(r), vec![" 1", " 3", " 5", " 7"]);
}

#[test]
fn test_for_counts_down() {
    let r = &mut run_program(&["10 for i = 3 to 1 step -1", "20 print i", "30 next i"]);
    assert_eq!(printed(r), vec![" 3", " 2", " 1"]);
}

#[test]
fn test_for_first_iteration_always_runs() {
    let r = &mut run_program(&["10 for i = 3 to 0", "20 print i", "30 next i"]);
    assert_eq!(printed(r), vec![" 3"]);
}

#[test]
fn test_for_same_variable_silently_replaces() {
    let r = &mut run_program(&[
        "10 for i = 1 to 9",
        "20 for i = 1 to 2",
        "30 next i",
        "40 print i",
    ]);
    // the inner loop replaced the outer one; no error, no outer loop
    assert_eq!(printed(r), vec![" 2"]);
}

#[test]
fn test_for_not_alone_on_line() {
    let r = &mut run_program(&["10 for i = 1 to 2: print i"]);
    assert_eq!(printed(r), vec!["?for not alone on line error in 10"]);
}

#[test]
fn test_for_illegal_in_direct_mode() {
    let mut r = fresh();
    r.enter("for i = 1 to 2");
    assert_eq!(printed(&mut r), vec!["?illegal direct error"]);
}

#[test]
fn test_next_without_for() {
    let r = &mut run_program(&["10 next z"]);
    assert_eq!(printed(r), vec!["?next without for error in 10"]);
}

#[test]
fn test_read_data_restore() {
    let r = &mut run_program(&[
        "10 data 10,20,30",
        "20 read a",
        "30 read b",
        "40 restore",
        "50 read c",
    ]);
    assert_eq!(r.variable("a"), Some(Val::Integer(10)));
    assert_eq!(r.variable("b"), Some(Val::Integer(20)));
    assert_eq!(r.variable("c"), Some(Val::Integer(10)));
}

#[test]
fn test_read_across_data_lines_and_out_of_data() {
    let r = &mut run_program(&[
        "10 data 1",
        "15 data 2",
        "20 read a",
        "30 read b",
        "40 read c",
    ]);
    assert_eq!(r.variable("a"), Some(Val::Integer(1)));
    assert_eq!(r.variable("b"), Some(Val::Integer(2)));
    assert_eq!(printed(r), vec!["?out of data error in 40"]);
}

#[test]
fn test_read_string_data() {
    let r = &mut run_program(&["10 data \"hi\",2.5", "20 read a", "30 read b"]);
    assert_eq!(r.variable("a"), Some(Val::String("hi".to_string())));
    assert_eq!(r.variable("b"), Some(Val::Float(2.5)));
}

#[test]
fn test_goto_undefined_line_reports_and_idles() {
    let r = &mut run_program(&["10 goto 999"]);
    assert_eq!(printed(r), vec!["?undef'd statement error in 10"]);
    // machine stays usable
    r.screen_mut().clear();
    r.enter("?1");
    assert_eq!(printed(r), vec![" 1"]);
}

#[test]
fn test_goto_computed_target() {
    let r = &mut run_program(&["10 t = 40", "20 goto t", "30 print 30", "40 print 40"]);
    assert_eq!(printed(r), vec![" 40"]);
}

#[test]
fn test_direct_goto_means_run_from_there() {
    let mut r = fresh();
    r.enter("10 print 10");
    r.enter("20 print 20");
    r.screen_mut().clear();
    r.enter("goto 20");
    run(&mut r);
    assert_eq!(printed(&mut r), vec![" 20"]);
}

#[test]
fn test_on_goto() {
    let r = &mut run_program(&[
        "10 x = 2",
        "20 on x goto 100, 200",
        "100 print 100",
        "200 print 200",
    ]);
    assert_eq!(printed(r), vec![" 200"]);
}

#[test]
fn test_on_goto_index_out_of_range() {
    let r = &mut run_program(&["10 on 3 goto 100, 200", "100 print 1", "200 print 2"]);
    assert_eq!(printed(r), vec!["?illegal quantity error in 10"]);
}

#[test]
fn test_end_stops_quietly_stop_reports_break() {
    let r = &mut run_program(&["10 end", "20 print 20"]);
    assert_eq!(printed(r), Vec::<String>::new());
    let r = &mut run_program(&["10 stop", "20 print 20"]);
    assert_eq!(printed(r), vec!["break in 10"]);
}

#[test]
fn test_new_clears_program() {
    let mut r = fresh();
    r.enter("10 print 1");
    r.enter("new");
    assert!(r.program().is_empty());
}

#[test]
fn test_line_entry_and_deletion() {
    let mut r = fresh();
    r.enter("10 print 1");
    r.enter("20 print 2");
    assert_eq!(r.program().text(10), Some("print 1"));
    r.enter("10");
    assert_eq!(r.program().text(10), None);
    assert_eq!(r.program().text(20), Some("print 2"));
}

#[test]
fn test_list_ranges() {
    let mut r = fresh();
    r.enter("10 print 1");
    r.enter("20 print 2");
    r.enter("30 print 3");
    r.screen_mut().clear();
    r.enter("list 20-");
    assert_eq!(printed(&mut r), vec!["20 print 2", "30 print 3"]);
    r.screen_mut().clear();
    r.enter("list 20");
    assert_eq!(printed(&mut r), vec!["20 print 2"]);
    r.screen_mut().clear();
    r.enter("list -10");
    assert_eq!(printed(&mut r), vec!["10 print 1"]);
}

#[test]
fn test_rem_and_hash_comments() {
    let r = &mut run_program(&["10 rem this: is ignored", "20 print 2 : # also this"]);
    assert_eq!(printed(r), vec![" 2"]);
}

#[test]
fn test_color_and_cursor_statements() {
    let mut r = fresh();
    r.enter("color 1, 2, 3");
    assert_eq!(r.screen().border(), 1);
    assert_eq!(r.screen().background(), 2);
    assert_eq!(r.screen().text(), 3);
    let mut r = fresh();
    r.enter("color 300, 0, 0");
    assert_eq!(printed(&mut r), vec!["?illegal quantity error"]);
    // cursor moves, then the prompt prints from the new position
    let mut r = fresh();
    r.enter("cursor 5, 4");
    assert_eq!(rows(&mut r)[5], "ready.");
}

#[test]
fn test_sys_without_cpu_reports() {
    let mut r = fresh();
    r.enter("sys 49152");
    assert_eq!(printed(&mut r), vec!["?no machine language support error"]);
}

#[test]
fn test_sys_cursor_vector() {
    let mut r = fresh();
    r.enter("poke 211, 7 : poke 214, 3 : sys 58640");
    // the cursor landed on row 3, so the prompt printed on row 4
    assert_eq!(rows(&mut r)[4], "ready.");
}

#[test]
fn test_syntax_error_reported_with_line() {
    let r = &mut run_program(&["10 wibble wobble"]);
    assert_eq!(printed(r), vec!["?expected operator error in 10"]);
}

#[test]
fn test_cannot_define_lines_while_running() {
    let mut r = fresh();
    r.enter("10 goto 10");
    r.enter("run");
    r.enter("20 print 2");
    assert!(printed(&mut r)
        .iter()
        .any(|row| row == "?cannot define lines while running error"));
}
