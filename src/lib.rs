//! # retro64
//!
//! An 8-bit home computer core: 64K of hooked, byte-addressable
//! memory, a memory-mapped 40×25 character screen, and a line-oriented
//! BASIC interpreter that runs on top of it one line per tick, driven
//! by whatever event loop hosts the machine.
//!
//! Run the bundled terminal front-end and you should land here:
//! ```text
//!     **** commodore 64 basic v2 ****
//!
//!  64k ram system  38911 basic bytes free
//!
//! ready.
//! █
//! ```
//!
//! Programs load from the `drive8` directory with `LOAD "name"`, or
//! straight off the network with `LOAD "http://…"`.

#[path = "doc/introduction.rs"]
#[allow(non_snake_case)]
pub mod _Introduction;

#[path = "doc/memory_map.rs"]
#[allow(non_snake_case)]
pub mod __Memory_Map;

pub mod lang;
pub mod mach;
pub mod term;
