//! Tokenizing Hack assembly operands.
//!
//! Address instructions (`@value`) and label declarations (`(NAME)`) carry a single
//! operand, which is either a decimal literal or a symbol.
//! This module holds the [`Token`] enum which characterizes such an operand,
//! as well as [`lex_operand`], which checks that an operand consists of exactly one token.

use std::num::IntErrorKind;

use logos::{Lexer, Logos};

/// A unit of information in a Hack operand.
#[derive(Debug, Logos, PartialEq, Eq)]
#[logos(error = LexErr)]
pub enum Token {
    // Note, the literal regex spans over tokens that are technically invalid
    // (e.g., 23trst matches even though it shouldn't).
    // This is intended.
    // It collects what would be considered one discernable unit
    // and validates it using the validator function.

    /// A decimal literal (e.g., `0`, `16384`, `-1`).
    ///
    /// The value is not range-checked here; literals which do not fit
    /// an `i64` are saturated so that they are still rejected later as out of range.
    #[regex(r"-?[0-9][A-Za-z0-9_.$:]*", lex_literal)]
    Literal(i64),

    /// A symbol (e.g., `LOOP`, `R0`, `ball.x`, `$tmp:1`).
    ///
    /// Symbols are case-sensitive.
    #[regex(r"[A-Za-z_.$:][A-Za-z0-9_.$:]*", |lx| lx.slice().to_string())]
    Symbol(String),
}

/// Any errors raised in attempting to tokenize an operand.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
pub enum LexErr {
    /// The operand was empty (e.g., `@` or `()`).
    Empty,
    /// The operand starts with a digit but is not a decimal literal (e.g., `1abc`).
    InvalidName,
    /// A character was used which is not allowed in Hack symbols.
    #[default]
    InvalidSymbol,
}
impl std::fmt::Display for LexErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexErr::Empty         => f.write_str("empty instruction"),
            LexErr::InvalidName   => f.write_str("invalid name"),
            LexErr::InvalidSymbol => f.write_str("names can contain only allowed characters"),
        }
    }
}
impl std::error::Error for LexErr {}
impl crate::err::Error for LexErr {
    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match self {
            LexErr::Empty         => Some("an address instruction needs a symbol or a constant after '@'".into()),
            LexErr::InvalidName   => Some("symbols cannot start with a digit".into()),
            LexErr::InvalidSymbol => Some("symbols consist of letters, digits, '_', '.', '$' and ':'".into()),
        }
    }
}

fn lex_literal(lx: &Lexer<'_, Token>) -> Result<i64, LexErr> {
    let string = lx.slice();
    let digits = string.strip_prefix('-').unwrap_or(string);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LexErr::InvalidName);
    }

    match string.parse::<i64>() {
        Ok(n) => Ok(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(i64::MAX),
            IntErrorKind::NegOverflow => Ok(i64::MIN),
            _ => Err(LexErr::InvalidName),
        }
    }
}

/// Tokenizes an entire operand, requiring that it is exactly one token.
pub fn lex_operand(src: &str) -> Result<Token, LexErr> {
    let mut tokens = Token::lexer(src);
    let token = tokens.next().ok_or(LexErr::Empty)??;

    match tokens.next() {
        None         => Ok(token),
        Some(Err(e)) => Err(e),
        // Two tokens glued together (e.g. `12-3`)
        Some(Ok(_))  => Err(LexErr::InvalidSymbol),
    }
}

#[cfg(test)]
mod tests {
    use logos::Logos;

    use crate::err::LexErr;
    use crate::parse::lex::{lex_operand, Token};

    fn symbol(s: &str) -> Token {
        Token::Symbol(s.to_string())
    }

    #[test]
    fn test_literal_success() {
        assert_eq!(lex_operand("0"), Ok(Token::Literal(0)));
        assert_eq!(lex_operand("123"), Ok(Token::Literal(123)));
        assert_eq!(lex_operand("32767"), Ok(Token::Literal(32767)));
        assert_eq!(lex_operand("00017"), Ok(Token::Literal(17)));

        // Out of range values still lex, they get rejected by the assembler
        assert_eq!(lex_operand("32768"), Ok(Token::Literal(32768)));
        assert_eq!(lex_operand("-1"), Ok(Token::Literal(-1)));
        assert_eq!(lex_operand("99999999999999999999999999"), Ok(Token::Literal(i64::MAX)));
        assert_eq!(lex_operand("-99999999999999999999999999"), Ok(Token::Literal(i64::MIN)));
    }

    #[test]
    fn test_symbols() {
        assert_eq!(lex_operand("LOOP"), Ok(symbol("LOOP")));
        assert_eq!(lex_operand("loop"), Ok(symbol("loop")));
        assert_eq!(lex_operand("R15"), Ok(symbol("R15")));
        assert_eq!(lex_operand("_"), Ok(symbol("_")));
        assert_eq!(lex_operand("Main.main$ret.1"), Ok(symbol("Main.main$ret.1")));
        assert_eq!(lex_operand(":x9"), Ok(symbol(":x9")));
    }

    #[test]
    fn test_invalid_name() {
        assert_eq!(lex_operand("1abc"), Err(LexErr::InvalidName));
        assert_eq!(lex_operand("9_"), Err(LexErr::InvalidName));
        assert_eq!(lex_operand("-1a"), Err(LexErr::InvalidName));
    }

    #[test]
    fn test_invalid_operand() {
        assert_eq!(lex_operand(""), Err(LexErr::Empty));
        assert_eq!(lex_operand("a-b"), Err(LexErr::InvalidSymbol));
        assert_eq!(lex_operand("12-3"), Err(LexErr::InvalidSymbol));
        assert_eq!(lex_operand("a b"), Err(LexErr::InvalidSymbol));
        assert_eq!(lex_operand("-x"), Err(LexErr::InvalidSymbol));
        assert_eq!(lex_operand("var!"), Err(LexErr::InvalidSymbol));
        assert_eq!(lex_operand("über"), Err(LexErr::InvalidSymbol));
    }

    #[test]
    fn test_invalid_symbol() {
        for c in "!\"#%&'()*+,/;<=>?@[\\]^`{|}~ \t".chars() {
            let string = c.to_string();
            assert_eq!(
                Token::lexer(&string).next(),
                Some(Err(LexErr::InvalidSymbol)),
                "Expected {string:?} to be an invalid symbol"
            );
        }
    }
}
