//! A two-pass assembler for the Hack 16-bit computer.
//!
//! Hack assembly consists of three kinds of lines:
//! - label declarations (`(LOOP)`), which name the address of the next instruction,
//! - address instructions (`@value`), which load a 15-bit constant or symbol address,
//! - computation instructions (`dest=comp;jump`).
//!
//! Each instruction assembles into one 16-bit word, written as 16 binary digits.
//!
//! # Usage
//!
//! The simplest way to assemble source lines is [`assemble_source`]:
//! ```
//! use hack_ensemble::assemble_source;
//!
//! let out = assemble_source(["@R0", "D=M", "@R1", "M=D+1"]).unwrap();
//! assert_eq!(out, "\
//! 0000000000000000
//! 1111110000010000
//! 0000000000000001
//! 1110011111001000");
//! ```
//!
//! The individual steps are also available.
//! Source lines are parsed into statements, which are then assembled into an object file:
//! ```
//! use hack_ensemble::parse::parse_ast;
//! use hack_ensemble::asm::assemble_debug;
//! use hack_ensemble::asm::encoding::{ObjFileFormat, TextFormat};
//!
//! let ast = parse_ast(["@i", "M=1", "(LOOP)", "@LOOP", "0;JMP"]).unwrap();
//! let obj_file = assemble_debug(ast).unwrap();
//!
//! assert_eq!(obj_file.symbol_table().unwrap().lookup("i"), Some(16));
//! assert_eq!(TextFormat::serialize(&obj_file).lines().count(), 4);
//! ```
//!
//! Reading and writing `.asm`/`.hack` files is handled by the [`file`] module.
#![warn(missing_docs)]

pub mod parse;
pub mod ast;
pub mod asm;
pub mod err;
pub mod file;

use tracing::{event, span, Level};

use crate::asm::encoding::{ObjFileFormat, TextFormat};
use crate::err::AssembleErr;

/// Assembles the lines of one source unit into `.hack` text.
///
/// The result holds one 16-character binary word per instruction,
/// joined by new lines (without a trailing new line).
/// An input without instructions assembles to an empty string.
///
/// Assembly stops at the first instruction which fails to assemble.
///
/// # Example
/// ```
/// use hack_ensemble::assemble_source;
/// use hack_ensemble::err::ErrClass;
///
/// assert_eq!(assemble_source(["(LOOP)", "@LOOP", "0;JMP"]).unwrap(), "0000000000000000\n1110101010000111");
/// assert_eq!(assemble_source(["// nothing here"]).unwrap(), "");
///
/// let err = assemble_source(["@32768"]).unwrap_err();
/// assert_eq!(err.class(), ErrClass::Range);
/// ```
pub fn assemble_source<I, S>(lines: I) -> Result<String, AssembleErr>
    where I: IntoIterator<Item=S>,
          S: AsRef<str>
{
    let span = span!(Level::DEBUG, "assemble_source");
    let _enter = span.enter();

    let stmts = parse::parse_lines(lines);
    event!(Level::TRACE, "preprocessed {} instructions", stmts.len());

    let obj = asm::assemble_in_order(stmts)?;
    event!(Level::INFO, "assembled {} words", obj.len());

    Ok(TextFormat::serialize(&obj))
}
