extern crate ansi_term;
extern crate ctrlc;
extern crate mortal;
use crate::mach::{screen_to_ascii, Runtime, COLOR_PALETTE, COLUMNS};
use ansi_term::Colour;
use mortal::{Event, Key, PrepareConfig, Terminal};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub fn main() {
    let interrupted = Arc::new(AtomicBool::new(false));
    let int_moved = interrupted.clone();
    ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");
    if let Err(error) = main_loop(interrupted) {
        eprintln!("{}", error);
    }
}

fn main_loop(interrupted: Arc<AtomicBool>) -> std::io::Result<()> {
    let term = Terminal::new()?;
    let mut config = PrepareConfig::default();
    config.block_signals = false;
    let state = term.prepare(config)?;
    let mut machine = Runtime::new();
    let mut last_blink = Instant::now();
    print!("\x1b[2J");
    let result = run(&term, &interrupted, &mut machine, &mut last_blink);
    term.restore(state)?;
    println!();
    result
}

fn run(
    term: &Terminal,
    interrupted: &Arc<AtomicBool>,
    machine: &mut Runtime,
    last_blink: &mut Instant,
) -> std::io::Result<()> {
    loop {
        if interrupted.swap(false, Ordering::SeqCst) {
            machine.interrupt();
        }
        match term.read_event(Some(Duration::from_millis(20)))? {
            Some(Event::Key(key)) => {
                if !feed_key(machine, key) {
                    return Ok(());
                }
            }
            _ => {}
        }
        machine.tick(Instant::now());
        if last_blink.elapsed() >= Duration::from_millis(300) {
            machine.screen_mut().blink_cursor();
            *last_blink = Instant::now();
        }
        paint(machine)?;
    }
}

// Keys feed the emulated screen; RETURN hands the row under the
// cursor to the interpreter, exactly like the original machine.
fn feed_key(machine: &mut Runtime, key: Key) -> bool {
    match key {
        Key::Enter => {
            let line = machine.screen_mut().current_line();
            machine.screen_mut().return_key();
            machine.enter(line.trim_end());
        }
        Key::Backspace | Key::Delete => machine.screen_mut().write(&[0x14]),
        Key::Up => machine.screen_mut().write(&[0x91]),
        Key::Down => machine.screen_mut().write(&[0x11]),
        Key::Left => machine.screen_mut().write(&[0x9d]),
        Key::Right => machine.screen_mut().write(&[0x1d]),
        Key::Home => machine.screen_mut().write(&[0x13]),
        Key::Escape => machine.interrupt(),
        Key::F(1) => machine.enter("list"),
        Key::F(3) => machine.enter("run"),
        Key::Ctrl('d') => return false,
        Key::Char(c) => {
            let mut buf = [0u8; 4];
            machine.screen_mut().writestr(c.encode_utf8(&mut buf));
        }
        _ => {}
    }
    true
}

fn rgb(color: u8) -> Colour {
    let packed = COLOR_PALETTE[(color & 0x0f) as usize];
    Colour::RGB(
        (packed >> 16) as u8,
        ((packed >> 8) & 0xff) as u8,
        (packed & 0xff) as u8,
    )
}

fn paint(machine: &mut Runtime) -> std::io::Result<()> {
    let background = machine.screen().background();
    let dirty = machine.screen_mut().dirty_cells();
    if dirty.is_empty() {
        return Ok(());
    }
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (offset, code, color) in dirty {
        let row = offset / COLUMNS + 1;
        let col = offset % COLUMNS + 1;
        let ch = match screen_to_ascii(code & 0x7f) {
            '\u{0}' => ' ',
            ch => ch,
        };
        // high bit means reverse video
        let style = if code & 0x80 != 0 {
            rgb(background).on(rgb(color))
        } else {
            rgb(color).on(rgb(background))
        };
        write!(
            out,
            "\x1b[{};{}H{}",
            row,
            col,
            style.paint(ch.to_string())
        )?;
    }
    write!(out, "\x1b[{};1H", crate::mach::ROWS + 1)?;
    out.flush()
}
