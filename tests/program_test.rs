mod common;
use common::*;
use std::path::PathBuf;

fn temp_drive(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("retro64-test-{}-{}", tag, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("temp drive");
    dir
}

#[test]
fn test_save_then_load_round_trips() {
    let drive = temp_drive("roundtrip");
    let mut r = fresh();
    r.set_drive(drive.clone());
    r.enter("10 x = 1");
    r.enter("20 print x");
    r.enter("save \"demo\"");
    let saved = std::fs::read_to_string(drive.join("demo.bas")).expect("saved file");
    assert_eq!(saved, "10 x = 1\n20 print x\n");

    r.enter("new");
    assert!(r.program().is_empty());
    r.enter("load \"demo\"");
    assert_eq!(r.program().text(20), Some("print x"));
    r.screen_mut().clear();
    r.enter("run");
    run(&mut r);
    assert_eq!(printed(&mut r), vec![" 1"]);
    let _ = std::fs::remove_dir_all(&drive);
}

#[test]
fn test_load_unnumbered_file_auto_numbers() {
    let drive = temp_drive("autonumber");
    std::fs::write(drive.join("plain.bas"), "print 1\nprint 2\n").expect("write");
    let mut r = fresh();
    r.set_drive(drive.clone());
    r.enter("load \"plain\"");
    assert_eq!(r.program().text(10), Some("print 1"));
    assert_eq!(r.program().text(20), Some("print 2"));
    let _ = std::fs::remove_dir_all(&drive);
}

#[test]
fn test_load_wildcard_takes_first_match() {
    let drive = temp_drive("wildcard");
    std::fs::write(drive.join("bb.bas"), "10 print 2\n").expect("write");
    std::fs::write(drive.join("aa.bas"), "10 print 1\n").expect("write");
    let mut r = fresh();
    r.set_drive(drive.clone());
    r.enter("load \"*\"");
    assert_eq!(r.program().text(10), Some("print 1"));
    let _ = std::fs::remove_dir_all(&drive);
}

#[test]
fn test_load_missing_file_reports_file_error() {
    let drive = temp_drive("missing");
    let mut r = fresh();
    r.set_drive(drive.clone());
    r.screen_mut().clear();
    r.enter("load \"nope\"");
    assert!(printed(&mut r)
        .iter()
        .any(|row| row == "?file not found error"));
    let _ = std::fs::remove_dir_all(&drive);
}

#[test]
fn test_load_tolerates_device_number() {
    let drive = temp_drive("device");
    std::fs::write(drive.join("game.bas"), "10 print 9\n").expect("write");
    let mut r = fresh();
    r.set_drive(drive.clone());
    r.enter("load \"game\",8");
    assert_eq!(r.program().text(10), Some("print 9"));
    let _ = std::fs::remove_dir_all(&drive);
}

#[test]
fn test_save_empty_name_reports() {
    let mut r = fresh();
    r.screen_mut().clear();
    r.enter("save \"\"");
    assert_eq!(printed(&mut r), vec!["?missing file name error"]);
}
