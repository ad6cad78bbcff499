use super::eval::{checked_address, checked_byte, checked_word, Eval};
use super::program::Program;
use super::runtime::{Cpu, Exec, ForLoop};
use super::screen::{Directions, Region, Screen, COLUMNS, ROWS};
use super::val::Val;
use super::var::Var;
use crate::error;
use crate::lang::ast::{Expression, ListRange, PrintEnd, Statement};
use crate::lang::{lex, parse, Error};
use rand::rngs::StdRng;
use std::path::Path;
use std::time::{Duration, Instant};

type Result<T> = std::result::Result<T, Error>;

/// Control flow out of a line, switched on by the scheduler. Statement
/// handlers never unwind; they return one of these.
#[derive(Debug)]
pub enum Signal {
    /// The line ran to completion; execution proceeds with the next.
    Continue,
    /// Jump to a snapshot index.
    Goto(usize),
    /// Re-enter this machine no earlier than the deadline.
    Sleep(Instant),
    /// END and STOP; the line number is reported as a break.
    Stop(Option<u16>),
    /// The RUN/STOP flag was raised between clauses.
    Break,
    /// SYS through the reset vector.
    Reset,
}

enum Flow {
    More,
    /// Terminal for this line; remaining clauses don't run.
    Last,
    Signal(Signal),
}

/// ## Interpreter
///
/// Executes the clauses of one line against the machine. Borrows every
/// part it touches from the `Runtime` for exactly one line's work.
pub struct Interp<'a> {
    pub screen: &'a mut Screen,
    pub vars: &'a mut Var,
    pub program: &'a mut Program,
    pub exec: &'a mut Exec,
    pub rng: &'a mut StdRng,
    pub cpu: Option<&'a mut (dyn Cpu + 'static)>,
    pub drive: &'a Path,
    pub now: Instant,
}

impl<'a> Interp<'a> {
    pub fn execute_line(&mut self, text: &str, direct: bool) -> Result<Signal> {
        let (_, tokens) = lex(text);
        let statements = parse(None, &tokens)?;
        self.execute_statements(&statements, direct)
    }

    fn execute_statements(&mut self, statements: &[Statement], direct: bool) -> Result<Signal> {
        let solo = statements.len() == 1;
        for statement in statements {
            if self.exec.runstop {
                return Ok(Signal::Break);
            }
            match self.statement(statement, direct, solo)? {
                Flow::More => continue,
                Flow::Last => break,
                Flow::Signal(signal) => return Ok(signal),
            }
        }
        Ok(Signal::Continue)
    }

    fn eval(&mut self, expr: &Expression) -> Result<Val> {
        Eval {
            vars: &mut *self.vars,
            screen: &mut *self.screen,
            rng: &mut *self.rng,
        }
        .value(expr)
    }

    fn statement(&mut self, statement: &Statement, direct: bool, solo: bool) -> Result<Flow> {
        use Statement::*;
        match statement {
            Cls => {
                self.screen.clear();
                Ok(Flow::More)
            }
            Color(args) => self.color(args),
            Cursor(args) => self.cursor(args),
            Data(_) => Ok(Flow::More),
            End => Ok(Flow::Signal(Signal::Stop(None))),
            For(name, start, stop, step) => self.r#for(name, start, stop, step, direct, solo),
            Goto(target) => self.goto(target, direct),
            Help => self.help(),
            If(condition, then) => {
                if self.eval(condition)?.is_truthy() {
                    return Ok(Flow::Signal(self.execute_statements(then, direct)?));
                }
                Ok(Flow::More)
            }
            Let(name, expr) => {
                if Var::is_reserved(name) {
                    return Err(error!(SyntaxError; "RESERVED NAME"));
                }
                let value = self.eval(expr)?;
                self.vars.store(name, value);
                Ok(Flow::More)
            }
            List(range) => self.list(range),
            Load(name) => self.load(name),
            New => {
                self.program.clear();
                Ok(Flow::Last)
            }
            Next(name) => self.next(name, direct),
            OnGoto(index, targets) => self.on_goto(index, targets, direct),
            Poke(addr, value) => {
                let addr = checked_address(&self.eval(addr)?)?;
                let value = checked_byte(&self.eval(value)?)?;
                self.screen.memory().write(addr, value);
                Ok(Flow::More)
            }
            Pokew(addr, value) => {
                let addr = checked_address(&self.eval(addr)?)?;
                if addr & 1 != 0 {
                    return Err(error!(IllegalQuantity));
                }
                let value = checked_word(&self.eval(value)?)?;
                self.screen.memory().write_word(addr, value);
                Ok(Flow::More)
            }
            Print(expr, end) => self.print(expr.as_ref(), *end),
            Read(name) => self.read(name),
            Restore => {
                self.exec.data_cursor = None;
                Ok(Flow::More)
            }
            Run(target) => self.run(*target),
            Save(name) => self.save(name),
            Scroll(args) => self.scroll(args),
            Sleep(duration) => self.sleep(duration, solo),
            Stop => {
                let line = if self.exec.running() {
                    self.exec.lines.get(self.exec.current).copied()
                } else {
                    None
                };
                Ok(Flow::Signal(Signal::Stop(line)))
            }
            Sys(addr) => self.sys(addr),
        }
    }

    fn print(&mut self, expr: Option<&Expression>, end: PrintEnd) -> Result<Flow> {
        let mut out = match expr {
            Some(expr) => self.eval(expr)?.to_print(),
            None => String::new(),
        };
        if let PrintEnd::Newline = end {
            out.push('\n');
        }
        self.screen.writestr(&out);
        Ok(Flow::More)
    }

    fn r#for(
        &mut self,
        name: &str,
        start: &Expression,
        stop: &Expression,
        step: &Option<Expression>,
        direct: bool,
        solo: bool,
    ) -> Result<Flow> {
        if direct {
            return Err(error!(IllegalDirect));
        }
        if !solo {
            return Err(error!(ForNotAlone));
        }
        if Var::is_reserved(name) {
            return Err(error!(SyntaxError; "RESERVED NAME"));
        }
        let start = self.eval(start)?;
        let stop = self.eval(stop)?;
        let step = match step {
            Some(expr) => self.eval(expr)?,
            None => Val::Integer(1),
        };
        if !start.is_number() || !stop.is_number() || !step.is_number() {
            return Err(error!(TypeMismatch));
        }
        // reusing a loop variable silently replaces the old loop
        self.exec.for_loops.insert(
            name.to_string(),
            ForLoop {
                return_index: self.exec.current,
                current: start.clone(),
                stop,
                step,
            },
        );
        self.vars.store(name, start);
        Ok(Flow::More)
    }

    fn next(&mut self, name: &str, direct: bool) -> Result<Flow> {
        if direct {
            return Err(error!(IllegalDirect));
        }
        let entry = match self.exec.for_loops.get_mut(name) {
            Some(entry) => entry,
            None => return Err(error!(NextWithoutFor)),
        };
        entry.current = step_value(&entry.current, &entry.step)?;
        let finished = if entry.step.to_f64()? >= 0.0 {
            entry.current.to_f64()? > entry.stop.to_f64()?
        } else {
            entry.current.to_f64()? < entry.stop.to_f64()?
        };
        if finished {
            self.exec.for_loops.remove(name);
            return Ok(Flow::More);
        }
        let value = entry.current.clone();
        let resume = entry.return_index + 1;
        self.vars.store(name, value);
        Ok(Flow::Signal(Signal::Goto(resume)))
    }

    fn goto(&mut self, target: &Expression, direct: bool) -> Result<Flow> {
        let value = self.eval(target)?;
        self.jump(&value, direct)
    }

    fn on_goto(
        &mut self,
        index: &Expression,
        targets: &[u16],
        direct: bool,
    ) -> Result<Flow> {
        let index = self.eval(index)?.to_i64()?;
        if index < 1 || index as usize > targets.len() {
            return Err(error!(IllegalQuantity));
        }
        let target = Val::Integer(targets[index as usize - 1] as i64);
        self.jump(&target, direct)
    }

    // Computed jump targets allow dispatch tables via GOTO VAR. In
    // direct mode with nothing running, a jump means RUN from there.
    fn jump(&mut self, target: &Val, direct: bool) -> Result<Flow> {
        let number = target.to_i64()?;
        let number = if (0..=u16::max_value() as i64).contains(&number) {
            number as u16
        } else {
            return Err(error!(UndefinedStatement));
        };
        if direct && !self.exec.running() {
            return self.run(Some(number));
        }
        if !self.program.contains(number) {
            return Err(error!(UndefinedStatement));
        }
        match self.exec.lines.binary_search(&number) {
            Ok(index) => Ok(Flow::Signal(Signal::Goto(index))),
            Err(_) => Err(error!(UndefinedStatement)),
        }
    }

    fn run(&mut self, target: Option<u16>) -> Result<Flow> {
        if let Some(number) = target {
            if !self.program.contains(number) {
                return Err(error!(UndefinedStatement));
            }
        }
        if self.program.is_empty() {
            return Ok(Flow::Last);
        }
        // fresh snapshot: stale loop and data bookkeeping dies with it
        self.exec.lines = self.program.sorted_numbers();
        self.exec.for_loops.clear();
        self.exec.data_cursor = None;
        let index = match target {
            Some(number) => match self.exec.lines.binary_search(&number) {
                Ok(index) => index,
                Err(_) => return Err(error!(UndefinedStatement)),
            },
            None => 0,
        };
        Ok(Flow::Signal(Signal::Goto(index)))
    }

    fn read(&mut self, name: &str) -> Result<Flow> {
        if Var::is_reserved(name) {
            return Err(error!(SyntaxError; "RESERVED NAME"));
        }
        let value = self.next_data_value()?;
        self.vars.store(name, value);
        Ok(Flow::More)
    }

    fn next_data_value(&mut self) -> Result<Val> {
        let (mut line, mut index) = match self.exec.data_cursor {
            Some(cursor) => cursor,
            None => match self.program.first_data_line() {
                Some(line) => (line, 0),
                None => return Err(error!(OutOfData)),
            },
        };
        loop {
            if let Some(item) = self.program.data_item(line, index) {
                let value = parse_data_item(item)?;
                self.exec.data_cursor = Some((line, index + 1));
                return Ok(value);
            }
            match self.program.next_data_line(line) {
                Some(next) => {
                    line = next;
                    index = 0;
                }
                None => return Err(error!(OutOfData)),
            }
        }
    }

    fn sleep(&mut self, duration: &Expression, solo: bool) -> Result<Flow> {
        if !solo {
            return Err(error!(SyntaxError; "SLEEP NOT ALONE ON LINE"));
        }
        let seconds = self.eval(duration)?.to_f64()?;
        if seconds == 0.0 {
            return Ok(Flow::More);
        }
        if seconds > 0.0 && seconds <= 60.0 {
            let wake = self.now + Duration::from_secs_f64(seconds);
            return Ok(Flow::Signal(Signal::Sleep(wake)));
        }
        Err(error!(IllegalQuantity))
    }

    fn list(&mut self, range: &ListRange) -> Result<Flow> {
        if self.program.is_empty() {
            return Ok(Flow::Last);
        }
        let lines: Vec<(u16, String)> = self
            .program
            .list(range)
            .iter()
            .map(|(n, s)| (*n, s.to_string()))
            .collect();
        self.screen.writestr("\n");
        for (number, text) in lines {
            self.screen.writestr(&format!("{} {}\n", number, text));
        }
        Ok(Flow::Last)
    }

    fn save(&mut self, name: &Expression) -> Result<Flow> {
        let value = self.eval(name)?;
        let name = value.as_string()?;
        if name.is_empty() {
            return Err(error!(FileError; "MISSING FILE NAME"));
        }
        if self.program.is_empty() {
            return Ok(Flow::Last);
        }
        let saved = self.program.save(name, self.drive)?;
        self.screen.writestr(&format!("\nsaving {}", saved));
        Ok(Flow::Last)
    }

    fn load(&mut self, name: &Expression) -> Result<Flow> {
        let value = self.eval(name)?;
        let name = value.as_string()?;
        if name.is_empty() {
            return Err(error!(FileError; "MISSING FILE NAME"));
        }
        self.screen.writestr(&format!("searching for {}\n", name));
        let (resolved, source) = Program::fetch_source(name, self.drive)?;
        self.screen.writestr(&format!("loading {}\n", resolved));
        *self.program = Program::from_source(&source)?;
        Ok(Flow::Last)
    }

    fn color(&mut self, args: &[Expression]) -> Result<Flow> {
        if args.len() != 3 {
            return Err(error!(SyntaxError));
        }
        let mut colors = [0u8; 3];
        for (slot, arg) in colors.iter_mut().zip(args) {
            let n = self.eval(arg)?.to_i64()?;
            if !(0..=255).contains(&n) {
                return Err(error!(IllegalQuantity));
            }
            *slot = n as u8;
        }
        self.screen.set_border(colors[0]);
        self.screen.set_background(colors[1]);
        self.screen.set_text(colors[2]);
        Ok(Flow::More)
    }

    fn cursor(&mut self, args: &[Expression]) -> Result<Flow> {
        if args.len() != 2 {
            return Err(error!(SyntaxError));
        }
        let x = self.eval(&args[0])?.to_i64()?.rem_euclid(COLUMNS as i64) as usize;
        let y = self.eval(&args[1])?.to_i64()?.rem_euclid(ROWS as i64) as usize;
        self.screen.cursor_move(x, y);
        Ok(Flow::More)
    }

    fn scroll(&mut self, args: &[Expression]) -> Result<Flow> {
        let mut vals: Vec<Val> = Vec::with_capacity(args.len());
        for arg in args {
            vals.push(self.eval(arg)?);
        }
        let direction = vals[0].as_string()?.to_string();
        const KNOWN: [&str; 12] = [
            "u", "d", "l", "r", "ul", "ur", "dl", "dr", "lu", "ru", "ld", "rd",
        ];
        if !KNOWN.contains(&direction.as_str()) {
            return Err(error!(SyntaxError; "SCROLL DIRECTION"));
        }
        let mut region = Region::full();
        let mut fillchar = 32u8;
        let mut fillcolor: Option<u8> = None;
        let mut amount = 1usize;
        let number = |v: &Val| -> Result<i64> { v.to_i64() };
        if vals.len() >= 5 {
            if vals.len() > 8 {
                return Err(error!(SyntaxError));
            }
            let x1 = number(&vals[1])?;
            let y1 = number(&vals[2])?;
            let x2 = number(&vals[3])?;
            let y2 = number(&vals[4])?;
            let columns = COLUMNS as i64;
            let rows = ROWS as i64;
            if !(0..columns).contains(&x1)
                || !(0..columns).contains(&x2)
                || !(0..rows).contains(&y1)
                || !(0..rows).contains(&y2)
                || x1 > x2
                || y1 > y2
            {
                return Err(error!(IllegalQuantity));
            }
            region = Region {
                x1: x1 as usize,
                y1: y1 as usize,
                x2: x2 as usize,
                y2: y2 as usize,
            };
            if vals.len() >= 6 {
                fillchar = checked_byte(&vals[5])?;
            }
            if vals.len() >= 7 {
                fillcolor = Some(checked_byte(&vals[6])?);
            }
            if vals.len() >= 8 {
                amount = number(&vals[7])?.max(0) as usize;
            }
        } else {
            if vals.len() >= 2 {
                fillchar = checked_byte(&vals[1])?;
            }
            if vals.len() >= 3 {
                fillcolor = Some(checked_byte(&vals[2])?);
            }
            if vals.len() >= 4 {
                amount = number(&vals[3])?.max(0) as usize;
            }
        }
        if amount == 0 || amount > COLUMNS.max(ROWS) {
            return Err(error!(IllegalQuantity));
        }
        let dirs = Directions {
            up: direction.contains('u'),
            down: direction.contains('d'),
            left: direction.contains('l'),
            right: direction.contains('r'),
        };
        self.screen.scroll(region, dirs, (fillchar, fillcolor), amount);
        Ok(Flow::More)
    }

    fn help(&mut self) -> Result<Flow> {
        const KNOWN: [&str; 29] = [
            "?", "cls", "color", "cursor", "data", "end", "for", "goto", "help", "if", "list",
            "load", "new", "next", "on...goto", "peek", "peekw", "poke", "pokew", "print", "read",
            "rem", "restore", "run", "save", "scroll", "sleep", "stop", "sys",
        ];
        self.screen.writestr("\nknown statements:\n");
        for kw in KNOWN.iter() {
            self.screen.writestr(&format!("{:10}", kw));
        }
        self.screen.writestr("\n");
        Ok(Flow::More)
    }

    fn sys(&mut self, addr: &Expression) -> Result<Flow> {
        let addr = checked_address(&self.eval(addr)?)?;
        match addr {
            // kernal reset vectors
            64738 | 64760 => Ok(Flow::Signal(Signal::Reset)),
            // kernal cursor-position routine reads locations 211/214
            58640 => {
                let x = self.screen.memory().read(211) as usize;
                let y = self.screen.memory().read(214) as usize;
                self.screen.cursor_move(x.min(COLUMNS - 1), y.min(ROWS - 1));
                Ok(Flow::More)
            }
            _ => match self.cpu.as_mut() {
                Some(cpu) => {
                    cpu.execute(self.screen.memory(), addr)?;
                    Ok(Flow::More)
                }
                None => Err(error!(SyntaxError; "NO MACHINE LANGUAGE SUPPORT")),
            },
        }
    }
}

fn step_value(current: &Val, step: &Val) -> Result<Val> {
    match (current, step) {
        (Val::Integer(a), Val::Integer(b)) => Ok(Val::Integer(a.wrapping_add(*b))),
        _ => Ok(Val::Float(current.to_f64()? + step.to_f64()?)),
    }
}

fn parse_data_item(item: &str) -> Result<Val> {
    let item = item.trim();
    if item.len() >= 2 && item.starts_with('"') && item.ends_with('"') {
        return Ok(Val::String(item[1..item.len() - 1].to_string()));
    }
    if let Ok(n) = item.parse::<i64>() {
        return Ok(Val::Integer(n));
    }
    if let Ok(n) = item.parse::<f64>() {
        return Ok(Val::Float(n));
    }
    Err(error!(SyntaxError; "BAD DATA"))
}
