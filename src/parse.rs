//! Parsing Hack assembly source lines into statements.
//!
//! This happens in two steps:
//! - [`preprocess`] removes comments and blank lines and trims each remaining line
//!     into a canonical instruction ([`SrcLine`]).
//! - [`parse_stmt`] classifies each canonical instruction (see [`is_label`],
//!     [`is_address_instruction`], [`is_computation_instruction`]) and parses it into a [`Stmt`].
//!
//! [`parse_ast`] performs both steps over an entire source unit.
//! [`parse_lines`] does the same, but keeps going past malformed instructions.
//!
//! # Example
//! ```
//! use hack_ensemble::parse::parse_ast;
//! use hack_ensemble::ast::StmtKind;
//!
//! let ast = parse_ast(["// adds one", "(LOOP)", "  @LOOP  // again", "0;JMP"]).unwrap();
//! assert_eq!(ast.len(), 3);
//! assert!(matches!(ast[0].nucleus, StmtKind::Label(_)));
//! assert_eq!(ast[1].line, 2);
//! ```

pub mod lex;

use tracing::{event, Level};

use crate::ast::{AInstr, Field, MnemonicErr, Operand, Stmt, StmtKind};
use lex::{lex_operand, LexErr, Token};

/// Marks the start of a comment, which runs to the end of the line.
pub const COMMENT_MARK: &str = "//";
/// The prefix of an address instruction.
pub const A_INSTR_MARK: char = '@';
const LABEL_START: char = '(';
const LABEL_END: char = ')';

/// A canonical instruction: comment-stripped, trimmed, and non-empty.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct SrcLine {
    /// The instruction text.
    pub text: String,
    /// The 0-based line of the source this instruction came from.
    pub line: usize,
}

/// Removes comments and blank lines, trimming the remaining lines.
///
/// The result is in the original order.
///
/// # Example
/// ```
/// use hack_ensemble::parse::preprocess;
///
/// let lines = preprocess(["// header", "", "   ", "@2 // two", "\tD=A"]);
/// let text: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
/// assert_eq!(text, ["@2", "D=A"]);
/// assert_eq!(lines[0].line, 3);
/// ```
pub fn preprocess<I, S>(lines: I) -> Vec<SrcLine>
    where I: IntoIterator<Item=S>,
          S: AsRef<str>
{
    lines.into_iter()
        .enumerate()
        .filter_map(|(line, raw)| {
            let raw = raw.as_ref();
            let code = match raw.split_once(COMMENT_MARK) {
                Some((code, _)) => code,
                None => raw,
            };

            let text = code.trim();
            (!text.is_empty()).then(|| SrcLine { text: text.to_string(), line })
        })
        .collect()
}

/// Whether the canonical instruction is a label declaration (e.g. `(LOOP)`).
pub fn is_label(instr: &str) -> bool {
    instr.starts_with(LABEL_START) && instr.ends_with(LABEL_END)
}
/// Whether the canonical instruction is an address instruction (e.g. `@i`).
pub fn is_address_instruction(instr: &str) -> bool {
    instr.starts_with(A_INSTR_MARK)
}
/// Whether the canonical instruction is a computation instruction (e.g. `D=D+1;JGT`).
///
/// This is stricter than "neither a label nor an address instruction":
/// a line starting with `(` or ending with `)` is also excluded, so lines which use
/// label parentheses but are not well-formed labels (e.g. `(LOOP`) are none of the three kinds.
pub fn is_computation_instruction(instr: &str) -> bool {
    !is_label(instr)
        && !is_address_instruction(instr)
        && !instr.starts_with(LABEL_START)
        && !instr.ends_with(LABEL_END)
}

/// Kinds of errors that can occur from parsing Hack assembly.
///
/// All of these are syntax errors.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum ParseErrKind {
    /// The operand of an address instruction or label is malformed.
    Lex {
        /// The cause.
        err: LexErr,
        /// The operand which could not be tokenized.
        operand: String,
    },
    /// A label was declared with a number as its name.
    NumericLabel,
    /// A computation instruction used a mnemonic not found in a fragment table.
    InvalidMnemonic(MnemonicErr),
    /// The line is not a label, address instruction, or computation instruction.
    UnknownShape,
}
impl std::fmt::Display for ParseErrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lex { err, .. }      => std::fmt::Display::fmt(err, f),
            Self::NumericLabel         => f.write_str("label name cannot be a number"),
            Self::InvalidMnemonic(e)   => std::fmt::Display::fmt(e, f),
            Self::UnknownShape         => f.write_str("unknown instruction"),
        }
    }
}

/// Error from parsing Hack assembly.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct ParseErr {
    /// The kind of error.
    pub kind: ParseErrKind,
    /// The canonical text of the offending instruction.
    pub instr: String,
    /// The 0-based source line of the offending instruction.
    pub line: usize,
}
impl ParseErr {
    fn new(kind: ParseErrKind, src: &SrcLine) -> Self {
        ParseErr { kind, instr: src.text.clone(), line: src.line }
    }

    /// The invalid part of the instruction.
    pub fn token(&self) -> &str {
        match &self.kind {
            ParseErrKind::Lex { operand, .. }   => operand,
            ParseErrKind::InvalidMnemonic(e)    => &e.mnemonic,
            ParseErrKind::NumericLabel | ParseErrKind::UnknownShape => &self.instr,
        }
    }

    /// Which field of a computation instruction failed, if this was a mnemonic error.
    pub fn field(&self) -> Option<Field> {
        match &self.kind {
            ParseErrKind::InvalidMnemonic(e) => Some(e.field),
            _ => None,
        }
    }
}
impl std::fmt::Display for ParseErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unable to assemble instruction '{}': {}", self.instr, self.kind)
    }
}
impl std::error::Error for ParseErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ParseErrKind::Lex { err, .. }    => Some(err),
            ParseErrKind::InvalidMnemonic(e) => Some(e),
            _ => None
        }
    }
}
impl crate::err::Error for ParseErr {
    fn line(&self) -> Option<usize> {
        Some(self.line)
    }

    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match &self.kind {
            ParseErrKind::Lex { err, .. }    => err.help(),
            ParseErrKind::NumericLabel       => Some("labels are symbols and cannot start with a digit".into()),
            ParseErrKind::InvalidMnemonic(e) => e.help(),
            ParseErrKind::UnknownShape       => Some("labels must be written as (NAME)".into()),
        }
    }
}

fn lex_err(err: LexErr, operand: &str) -> ParseErrKind {
    ParseErrKind::Lex { err, operand: operand.to_string() }
}

/// Parses the operand of an address instruction (the text after `@`).
pub fn parse_operand(operand: &str) -> Result<Operand, ParseErrKind> {
    match lex_operand(operand).map_err(|e| lex_err(e, operand))? {
        Token::Literal(n)   => Ok(Operand::Literal(n)),
        Token::Symbol(name) => Ok(Operand::Symbol(name)),
    }
}

/// Parses the name inside a label declaration (the text between the parentheses).
pub fn parse_label(name: &str) -> Result<String, ParseErrKind> {
    match lex_operand(name).map_err(|e| lex_err(e, name))? {
        Token::Literal(_)   => Err(ParseErrKind::NumericLabel),
        Token::Symbol(name) => Ok(name),
    }
}

/// Classifies and parses a single canonical instruction.
pub fn parse_stmt(src: &SrcLine) -> Result<Stmt, ParseErr> {
    let text = src.text.as_str();

    let nucleus = if is_label(text) {
        parse_label(&text[1..(text.len() - 1)]).map(StmtKind::Label)
    } else if is_address_instruction(text) {
        parse_operand(&text[1..]).map(|op| StmtKind::AInstr(AInstr(op)))
    } else if is_computation_instruction(text) {
        text.parse()
            .map(StmtKind::CInstr)
            .map_err(ParseErrKind::InvalidMnemonic)
    } else {
        Err(ParseErrKind::UnknownShape)
    };

    match nucleus {
        Ok(nucleus) => Ok(Stmt { nucleus, text: src.text.clone(), line: src.line }),
        Err(kind) => {
            let err = ParseErr::new(kind, src);
            event!(Level::DEBUG, "line {}: {err}", src.line + 1);
            Err(err)
        }
    }
}

/// Preprocesses and parses an entire source unit into a list of statements.
///
/// Parsing stops at the first malformed instruction.
pub fn parse_ast<I, S>(lines: I) -> Result<Vec<Stmt>, ParseErr>
    where I: IntoIterator<Item=S>,
          S: AsRef<str>
{
    preprocess(lines)
        .iter()
        .map(parse_stmt)
        .collect()
}

/// Preprocesses and parses every instruction of a source unit.
///
/// Unlike [`parse_ast`], this does not stop at the first malformed instruction.
/// Each instruction keeps its position, so callers can decide
/// when a parse error should surface.
///
/// # Example
/// ```
/// use hack_ensemble::parse::parse_lines;
///
/// let stmts = parse_lines(["@0", "B=M+1", "@1"]);
/// assert_eq!(stmts.len(), 3);
/// assert!(stmts[0].is_ok());
/// assert!(stmts[1].is_err());
/// assert!(stmts[2].is_ok());
/// ```
pub fn parse_lines<I, S>(lines: I) -> Vec<Result<Stmt, ParseErr>>
    where I: IntoIterator<Item=S>,
          S: AsRef<str>
{
    preprocess(lines)
        .iter()
        .map(parse_stmt)
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::ast::{AInstr, CInstr, Comp, Dest, Field, Jump, Operand, StmtKind};
    use crate::err::LexErr;

    use super::{
        is_address_instruction, is_computation_instruction, is_label,
        parse_ast, preprocess, ParseErr, ParseErrKind, SrcLine
    };

    fn parse_one(line: &str) -> Result<StmtKind, ParseErr> {
        parse_ast([line]).map(|mut ast| ast.remove(0).nucleus)
    }
    fn assert_parse_fail(line: &str, kind: ParseErrKind) {
        assert_eq!(parse_one(line).unwrap_err().kind, kind, "parsing {line:?}");
    }

    #[test]
    fn test_preprocess() {
        let src = [
            "// This file is part of www.nand2tetris.org",
            "",
            "   @R0   ",
            "D=M // inline comment",
            "\t\t",
            "//(COMMENTED)",
            "  // indented comment",
            "0;JMP//no space",
        ];

        assert_eq!(preprocess(src), vec![
            SrcLine { text: "@R0".into(), line: 2 },
            SrcLine { text: "D=M".into(), line: 3 },
            SrcLine { text: "0;JMP".into(), line: 7 },
        ]);

        assert!(preprocess(Vec::<String>::new()).is_empty());
        assert!(preprocess(["//", "   ", ""]).is_empty());
    }

    #[test]
    fn test_classify() {
        assert!(is_label("(LOOP)"));
        assert!(!is_label("(LOOP"));
        assert!(!is_label("@LOOP"));

        assert!(is_address_instruction("@LOOP"));
        assert!(is_address_instruction("@"));
        assert!(!is_address_instruction("D=A"));

        assert!(is_computation_instruction("D=A"));
        assert!(is_computation_instruction("0;JMP"));
        assert!(!is_computation_instruction("(LOOP)"));
        assert!(!is_computation_instruction("@1"));
        assert!(!is_computation_instruction("(LOOP"));
        assert!(!is_computation_instruction("LOOP)"));

        // Exactly one holds for well-formed instructions
        for instr in ["(A)", "@A", "A=D"] {
            let n = [is_label(instr), is_address_instruction(instr), is_computation_instruction(instr)]
                .into_iter()
                .filter(|&b| b)
                .count();
            assert_eq!(n, 1, "{instr}");
        }
    }

    #[test]
    fn test_parse_stmts() {
        let ast = parse_ast(["(LOOP)", "@LOOP", "@16384", "AM=M-1;JNE"]).unwrap();
        let kinds: Vec<_> = ast.into_iter().map(|s| s.nucleus).collect();
        assert_eq!(kinds, vec![
            StmtKind::Label("LOOP".into()),
            StmtKind::AInstr(AInstr(Operand::Symbol("LOOP".into()))),
            StmtKind::AInstr(AInstr(Operand::Literal(16384))),
            StmtKind::CInstr(CInstr { dest: Some(Dest::AM), comp: Comp::MMinusOne, jump: Some(Jump::JNE) }),
        ]);
    }

    #[test]
    fn test_parse_operand_fail() {
        assert_parse_fail("@", ParseErrKind::Lex { err: LexErr::Empty, operand: "".into() });
        assert_parse_fail("@1abc", ParseErrKind::Lex { err: LexErr::InvalidName, operand: "1abc".into() });
        assert_parse_fail("@a-b", ParseErrKind::Lex { err: LexErr::InvalidSymbol, operand: "a-b".into() });
        assert_parse_fail("@a b", ParseErrKind::Lex { err: LexErr::InvalidSymbol, operand: "a b".into() });
    }

    #[test]
    fn test_parse_label_fail() {
        assert_parse_fail("()", ParseErrKind::Lex { err: LexErr::Empty, operand: "".into() });
        assert_parse_fail("(12)", ParseErrKind::NumericLabel);
        assert_parse_fail("(2nd)", ParseErrKind::Lex { err: LexErr::InvalidName, operand: "2nd".into() });
        assert_parse_fail("(LOOP", ParseErrKind::UnknownShape);
        assert_parse_fail("LOOP)", ParseErrKind::UnknownShape);
    }

    #[test]
    fn test_parse_mnemonic_fail() {
        let err = parse_one("B=M+1").unwrap_err();
        assert_eq!(err.field(), Some(Field::Dest));
        assert_eq!(err.token(), "B");
        assert_eq!(err.to_string(), "unable to assemble instruction 'B=M+1': instruction mnemonic 'B' is not valid");

        let err = parse_one("D=M+2").unwrap_err();
        assert_eq!(err.field(), Some(Field::Comp));
        assert_eq!(err.to_string(), "unable to assemble instruction 'D=M+2': instruction mnemonic 'M+2' is not valid");

        let err = parse_one("D=M+1;JJJ").unwrap_err();
        assert_eq!(err.field(), Some(Field::Jump));
        assert_eq!(err.to_string(), "unable to assemble instruction 'D=M+1;JJJ': instruction mnemonic 'JJJ' is not valid");
    }

    #[test]
    fn test_parse_stops_at_first_error() {
        let err = parse_ast(["@1", "", "X=1", "Y=1"]).unwrap_err();
        assert_eq!(err.instr, "X=1");
        assert_eq!(err.line, 2);
    }
}
