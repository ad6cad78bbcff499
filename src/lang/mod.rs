/*!
# Language Module

Lexical analysis and parsing of the BASIC dialect. A raw input line
becomes an optional line number plus a token stream (`lex`), and the
token stream becomes the statements of that line (`parse`).

*/

#[macro_use]
mod error;
mod lex;
mod parse;

pub mod ast;
pub mod token;

pub use error::Error;
pub use error::ErrorCode;
pub use lex::lex;
pub use parse::parse;

/// Program lines carry a number; direct mode lines don't.
pub type LineNumber = Option<u16>;

/// Highest line number a stored program may use.
pub const MAX_LINE_NUMBER: u16 = 63999;
