//! Error interface for this crate.
//!
//! Every stage of assembly has its own error type:
//! - [`LexErr`]: a malformed operand
//! - [`ParseErr`]: a malformed instruction (syntax errors)
//! - [`AsmErr`]: an instruction which cannot be encoded (range and resolution errors)
//!
//! [`AssembleErr`] unifies the latter two for [`crate::assemble_source`],
//! and [`ErrClass`] sorts any of them into the three classes of assembly failure.

use std::borrow::Cow;

pub use crate::parse::lex::LexErr;
pub use crate::parse::{ParseErr, ParseErrKind};
pub use crate::asm::{AsmErr, AsmErrKind};

/// Unified error interface for all errors in this crate.
///
/// Note that the [`Display`] implementation is used for a brief message,
/// where as [`Error::help`] is used for any clarifying messages.
///
/// [`Display`]: std::fmt::Display
pub trait Error: std::error::Error {
    /// The 0-based source line where this error occurred (if it is known).
    fn line(&self) -> Option<usize> {
        None
    }

    /// A clarifying message to help aid someone in how to fix the message.
    fn help(&self) -> Option<Cow<str>> {
        None
    }
}

/// The classes of assembly failure.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ErrClass {
    /// A malformed instruction.
    Syntax,
    /// An address instruction value outside of `[0, 32767]`.
    Range,
    /// A symbol which could not be resolved.
    Resolution,
}
impl ErrClass {
    /// Whether this is a syntax error.
    ///
    /// Range errors are a kind of syntax error.
    pub fn is_syntax(self) -> bool {
        matches!(self, ErrClass::Syntax | ErrClass::Range)
    }
}
impl std::fmt::Display for ErrClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrClass::Syntax     => f.write_str("syntax error"),
            ErrClass::Range      => f.write_str("range error"),
            ErrClass::Resolution => f.write_str("resolution error"),
        }
    }
}

/// Any error which can occur while assembling a source unit.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AssembleErr {
    /// The source could not be parsed.
    Parse(ParseErr),
    /// The parsed source could not be assembled.
    Asm(AsmErr),
}
impl AssembleErr {
    /// The class of this error.
    pub fn class(&self) -> ErrClass {
        match self {
            AssembleErr::Parse(_) => ErrClass::Syntax,
            AssembleErr::Asm(e)   => e.kind.class(),
        }
    }

    /// The canonical text of the instruction which caused this error.
    pub fn instr(&self) -> &str {
        match self {
            AssembleErr::Parse(e) => &e.instr,
            AssembleErr::Asm(e)   => &e.instr,
        }
    }
}
impl From<ParseErr> for AssembleErr {
    fn from(value: ParseErr) -> Self {
        AssembleErr::Parse(value)
    }
}
impl From<AsmErr> for AssembleErr {
    fn from(value: AsmErr) -> Self {
        AssembleErr::Asm(value)
    }
}
impl std::fmt::Display for AssembleErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssembleErr::Parse(e) => std::fmt::Display::fmt(e, f),
            AssembleErr::Asm(e)   => std::fmt::Display::fmt(e, f),
        }
    }
}
impl std::error::Error for AssembleErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssembleErr::Parse(e) => Some(e),
            AssembleErr::Asm(e)   => Some(e),
        }
    }
}
impl Error for AssembleErr {
    fn line(&self) -> Option<usize> {
        match self {
            AssembleErr::Parse(e) => e.line(),
            AssembleErr::Asm(e)   => e.line(),
        }
    }

    fn help(&self) -> Option<Cow<str>> {
        match self {
            AssembleErr::Parse(e) => e.help(),
            AssembleErr::Asm(e)   => e.help(),
        }
    }
}

/// Formats an error into a multi-line report, including its source line and help (if present).
///
/// # Example
/// ```
/// use hack_ensemble::assemble_source;
/// use hack_ensemble::err::report;
///
/// let err = assemble_source(["@1", "B=M+1"]).unwrap_err();
/// assert_eq!(report(&err), "\
/// syntax error on line 2: unable to assemble instruction 'B=M+1': instruction mnemonic 'B' is not valid
///   help: valid dest mnemonics are: M, D, MD, A, AM, AD, AMD");
/// ```
pub fn report(err: &AssembleErr) -> String {
    let mut out = match err.line() {
        Some(line) => format!("{} on line {}: {err}", err.class(), line + 1),
        None => format!("{}: {err}", err.class()),
    };
    if let Some(help) = err.help() {
        out.push_str("\n  help: ");
        out.push_str(&help);
    }
    out
}
