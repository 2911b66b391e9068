//! Winnow-based parser for relation files.
//!
//! Grammar:
//! ```text
//! execution = SEP* (relation SEP*)*
//! relation  = label SEP+ label
//! label     = (any character except whitespace)+
//! SEP       = " " | "\t" | "\r" | "\n"
//! ```
//!
//! Line breaks carry no meaning: a relation may span two lines.

use mtsort_core::{Execution, Relation};
use winnow::combinator::{repeat, terminated};
use winnow::prelude::*;
use winnow::token::take_while;
use winnow::ModalResult;

use crate::lexer::{tokenize, TokenKind};

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// A parse error with human-readable location information.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    fn at(input: &str, offset: usize, message: String) -> Self {
        let (line, column) = offset_to_line_col(input, offset);
        Self {
            message,
            line,
            column,
        }
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "parse error at line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Parse the relations of one execution, in slot order.
///
/// # Errors
///
/// Returns a [`ParseError`] pointing at the last label when the file holds an
/// odd number of labels.
pub fn parse_execution(input: &str) -> Result<Execution<String>, ParseError> {
    let mut stream: &str = input;
    let relations = execution_parser
        .parse_next(&mut stream)
        .map_err(|e| ParseError::at(input, input.len() - stream.len(), e.to_string()))?;

    if stream.is_empty() {
        Ok(relations)
    } else {
        // Only a single label without a partner can be left over.
        let offset = input.len() - stream.len();
        let dangling = stream.trim_end();
        Err(ParseError::at(
            input,
            offset,
            format!("label `{dangling}` has no successor: odd number of labels"),
        ))
    }
}

/// Parse an execution list file into its entries, in file order.
///
/// # Errors
///
/// Returns a [`ParseError`] if the list names no execution at all.
pub fn parse_execution_list(input: &str) -> Result<Vec<String>, ParseError> {
    let tokens = tokenize(input)
        .map_err(|span| ParseError::at(input, span.start, "unrecognized input".into()))?;
    let entries: Vec<String> = tokens
        .into_iter()
        .filter(|token| token.kind == TokenKind::Label)
        .map(|token| token.text.to_owned())
        .collect();
    if entries.is_empty() {
        return Err(ParseError::at(input, input.len(), "list names no execution".into()));
    }
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Line/column helper
// ---------------------------------------------------------------------------

/// Convert a byte offset into the original input to 1-based (line, column).
fn offset_to_line_col(input: &str, offset: usize) -> (usize, usize) {
    let prefix = &input[..offset.min(input.len())];
    let line = prefix.bytes().filter(|&b| b == b'\n').count() + 1;
    let column = prefix
        .rfind('\n')
        .map_or_else(|| prefix.chars().count() + 1, |pos| prefix[pos + 1..].chars().count() + 1);
    (line, column)
}

// ---------------------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------------------

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn separator(input: &mut &str) -> ModalResult<()> {
    take_while(1.., is_separator).void().parse_next(input)
}

fn opt_separator(input: &mut &str) -> ModalResult<()> {
    take_while(0.., is_separator).void().parse_next(input)
}

fn label<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| !is_separator(c)).parse_next(input)
}

/// `label SEP+ label`
fn relation(input: &mut &str) -> ModalResult<Relation<String>> {
    let pred = label.parse_next(input)?;
    separator.parse_next(input)?;
    let succ = label.parse_next(input)?;
    Ok(Relation::new(pred.to_owned(), succ.to_owned()))
}

/// Every complete relation; a dangling label is left in `input`.
fn execution_parser(input: &mut &str) -> ModalResult<Execution<String>> {
    opt_separator.parse_next(input)?;
    repeat(0.., terminated(relation, opt_separator)).parse_next(input)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
