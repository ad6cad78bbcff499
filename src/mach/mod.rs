/*!
## Machine Module

The emulated computer: a hooked memory bus, the character screen that
lives inside it, the program store, and the interpreter/scheduler pair
that executes BASIC one line per tick.

*/

mod charset;
mod eval;
mod function;
mod interp;
mod memory;
mod program;
mod runtime;
mod screen;
mod val;
mod var;

pub use charset::{ascii_to_petscii, petscii_to_screen, screen_to_ascii, screen_to_petscii};
pub use function::Function;
pub use interp::Signal;
pub use memory::{Memory, ReadHook, WriteHook, MEMORY_SIZE};
pub use program::Program;
pub use runtime::{Cpu, Runtime, State};
pub use screen::{
    Directions, Region, Screen, CELLS, COLOR_PALETTE, COLOR_RAM, COLUMNS, HZ, ROWS, SCREEN_RAM,
};
pub use val::Val;
pub use var::Var;
