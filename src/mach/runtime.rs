use super::interp::{Interp, Signal};
use super::memory::Memory;
use super::program::Program;
use super::screen::Screen;
use super::val::Val;
use super::var::Var;
use crate::error;
use crate::lang::{Error, MAX_LINE_NUMBER};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

type Result<T> = std::result::Result<T, Error>;

/// Scheduler state. One `tick` does at most one program line's work,
/// which is what lets an external event loop drive the machine
/// without being starved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum State {
    Idle,
    Running { index: usize },
    Sleeping { index: usize, wake: Instant },
}

/// An active FOR loop: where to resume and what remains of the
/// iteration. One entry per variable name.
#[derive(Debug)]
pub struct ForLoop {
    pub return_index: usize,
    pub current: Val,
    pub stop: Val,
    pub step: Val,
}

/// Run bookkeeping owned by the scheduler and lent to the interpreter.
#[derive(Debug)]
pub struct Exec {
    pub state: State,
    /// Snapshot of sorted line numbers, taken at RUN.
    pub lines: Vec<u16>,
    pub for_loops: HashMap<String, ForLoop>,
    pub data_cursor: Option<(u16, usize)>,
    /// Break requested; checked between clauses.
    pub runstop: bool,
    /// Snapshot index of the line now executing.
    pub current: usize,
}

impl Exec {
    fn new() -> Exec {
        Exec {
            state: State::Idle,
            lines: vec![],
            for_loops: HashMap::new(),
            data_cursor: None,
            runstop: false,
            current: 0,
        }
    }

    pub fn running(&self) -> bool {
        !matches!(self.state, State::Idle)
    }
}

/// The CPU collaborator consumed by SYS: reads and writes through the
/// memory bus and returns after a bounded amount of work.
pub trait Cpu {
    fn execute(&mut self, mem: &mut Memory, addr: u16) -> Result<()>;
}

/// ## The machine
///
/// One aggregate owning memory, screen, program, symbols, and the
/// execution scheduler. `enter` feeds it direct-mode lines; `tick`
/// advances a running program one line at a time.
pub struct Runtime {
    screen: Screen,
    vars: Var,
    program: Program,
    exec: Exec,
    rng: StdRng,
    cpu: Option<Box<dyn Cpu>>,
    drive: PathBuf,
}

impl Runtime {
    pub fn new() -> Runtime {
        let mut runtime = Runtime {
            screen: Screen::new(),
            vars: Var::new(),
            program: Program::new(),
            exec: Exec::new(),
            rng: StdRng::from_entropy(),
            cpu: None,
            drive: PathBuf::from("drive8"),
        };
        runtime.banner();
        runtime
    }

    /// Power-on reset: fresh memory, screen, and symbols; run state
    /// and program gone.
    pub fn reset(&mut self) {
        self.screen = Screen::new();
        self.vars = Var::new();
        self.program = Program::new();
        self.exec = Exec::new();
        self.banner();
    }

    fn banner(&mut self) {
        self.screen
            .writestr("\n    **** commodore 64 basic v2 ****\n");
        self.screen
            .writestr("\n 64k ram system  38911 basic bytes free\n");
        self.prompt();
    }

    fn prompt(&mut self) {
        self.screen.writestr("\nready.\n");
    }

    pub fn state(&self) -> State {
        self.exec.state
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// A variable's current value, mostly for embedders and tests.
    pub fn variable(&self, name: &str) -> Option<Val> {
        if self.vars.defined(name) {
            Some(self.vars.fetch(name))
        } else {
            None
        }
    }

    pub fn attach_cpu(&mut self, cpu: Box<dyn Cpu>) {
        self.cpu = Some(cpu);
    }

    pub fn set_drive(&mut self, path: PathBuf) {
        self.drive = path;
    }

    /// Request a break. The scheduler honors it within one tick.
    pub fn interrupt(&mut self) {
        self.exec.runstop = true;
    }

    /// Enter one direct-mode line: a numbered line edits the program,
    /// anything else executes immediately.
    pub fn enter(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        if line.starts_with(|c: char| c.is_ascii_digit()) {
            if let Err(e) = self.enter_program_line(line) {
                self.report(e);
                self.stop_run();
                self.prompt();
            }
            return;
        }
        self.execute_direct(line, Instant::now());
    }

    fn enter_program_line(&mut self, line: &str) -> Result<()> {
        if self.exec.running() {
            return Err(error!(IllegalDirect; "CANNOT DEFINE LINES WHILE RUNNING"));
        }
        let digits: String = line.chars().take_while(|c| c.is_ascii_digit()).collect();
        let number = match digits.parse::<u16>() {
            Ok(n) if n <= MAX_LINE_NUMBER => n,
            _ => return Err(error!(IllegalQuantity; "INVALID LINE NUMBER")),
        };
        self.program.insert(number, line[digits.len()..].trim());
        Ok(())
    }

    fn execute_direct(&mut self, line: &str, now: Instant) {
        let signal = {
            let mut interp = Interp {
                screen: &mut self.screen,
                vars: &mut self.vars,
                program: &mut self.program,
                exec: &mut self.exec,
                rng: &mut self.rng,
                cpu: self.cpu.as_deref_mut(),
                drive: &self.drive,
                now,
            };
            interp.execute_line(line, true)
        };
        match signal {
            Ok(Signal::Continue) => {
                if !self.exec.running() {
                    self.prompt();
                }
            }
            Ok(Signal::Goto(index)) => {
                self.exec.state = State::Running { index };
            }
            Ok(Signal::Sleep(wake)) => {
                let index = match self.exec.state {
                    State::Running { index } => index,
                    _ => self.exec.lines.len(),
                };
                self.exec.state = State::Sleeping { index, wake };
            }
            Ok(Signal::Stop(break_line)) => {
                self.stop_run();
                if let Some(number) = break_line {
                    self.screen.writestr(&format!("\nbreak in {}\n", number));
                }
                self.prompt();
            }
            Ok(Signal::Break) => {
                self.handle_break();
            }
            Ok(Signal::Reset) => {
                self.reset();
            }
            Err(e) => {
                self.report(e);
                self.stop_run();
                self.prompt();
            }
        }
    }

    /// Advance the machine. Executes at most one program line; idle
    /// and still-sleeping ticks do nothing. Never blocks.
    pub fn tick(&mut self, now: Instant) -> State {
        if self.exec.runstop {
            return self.handle_break();
        }
        let index = match self.exec.state {
            State::Idle => return State::Idle,
            State::Sleeping { index, wake } => {
                if now < wake {
                    return self.exec.state;
                }
                self.exec.state = State::Running { index };
                index
            }
            State::Running { index } => index,
        };
        if index >= self.exec.lines.len() {
            self.stop_run();
            self.prompt();
            return State::Idle;
        }
        let number = self.exec.lines[index];
        let text = match self.program.text(number) {
            Some(text) => text.to_string(),
            None => String::new(), // deleted underneath a stale snapshot
        };
        self.exec.current = index;
        let signal = {
            let mut interp = Interp {
                screen: &mut self.screen,
                vars: &mut self.vars,
                program: &mut self.program,
                exec: &mut self.exec,
                rng: &mut self.rng,
                cpu: self.cpu.as_deref_mut(),
                drive: &self.drive,
                now,
            };
            interp.execute_line(&text, false)
        };
        match signal {
            Ok(Signal::Continue) => {
                self.exec.state = State::Running { index: index + 1 };
            }
            Ok(Signal::Goto(target)) => {
                self.exec.state = State::Running { index: target };
            }
            Ok(Signal::Sleep(wake)) => {
                self.exec.state = State::Sleeping {
                    index: index + 1,
                    wake,
                };
            }
            Ok(Signal::Stop(break_line)) => {
                self.stop_run();
                if let Some(number) = break_line {
                    self.screen.writestr(&format!("\nbreak in {}\n", number));
                }
                self.prompt();
            }
            Ok(Signal::Break) => {
                return self.handle_break();
            }
            Ok(Signal::Reset) => {
                self.reset();
            }
            Err(e) => {
                self.report(e.in_line_number(Some(number)));
                self.stop_run();
                self.prompt();
            }
        }
        self.exec.state
    }

    fn handle_break(&mut self) -> State {
        self.exec.runstop = false;
        let line = match self.exec.state {
            State::Running { index } => self.exec.lines.get(index).copied(),
            State::Sleeping { index, .. } => {
                self.exec.lines.get(index.saturating_sub(1)).copied()
            }
            State::Idle => None,
        };
        if self.exec.running() {
            self.stop_run();
            if let Some(number) = line {
                self.screen.writestr(&format!("\nbreak in {}\n", number));
            }
            self.prompt();
        }
        State::Idle
    }

    fn stop_run(&mut self) {
        self.exec.state = State::Idle;
    }

    // Errors land on the machine's own screen, lowercased the way the
    // original wrote them.
    fn report(&mut self, e: Error) {
        let message = format!("\n?{}\n", e.to_string().to_ascii_lowercase());
        self.screen.writestr(&message);
    }
}

impl Default for Runtime {
    fn default() -> Runtime {
        Runtime::new()
    }
}
