//! Format strings: typed token parsing and plain substitution.

pub mod formatter;
pub mod parser;

pub use formatter::TokenFormatter;
pub use parser::{Token, TokenKind, parse_format_tokens};
