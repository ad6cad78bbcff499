//! # retro64
//!
//! Terminal front-end for the retro64 machine.

fn main() {
    retro64::term::main()
}
