//! Readers for relation files and execution list files.
//!
//! A relation file is a stream of labels separated by whitespace or
//! newlines; consecutive labels pair up as `pred succ`. A list file names
//! one execution file per token, in processing order.

pub mod lexer;
pub mod parser;

pub use lexer::{tokenize, Token, TokenKind};
pub use parser::{parse_execution, parse_execution_list, ParseError};
