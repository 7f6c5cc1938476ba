//! Formatters which can read and write object files.
//!
//! The [`ObjFileFormat`] trait describes an implementation of reading/writing object files.
//! This module provides an implementation of the trait:
//! - [`TextFormat`]: the `.hack` text representation, one binary word per line

use super::ObjectFile;

/// A trait defining object file formats.
pub trait ObjFileFormat {
    /// Representation of the serialized format.
    ///
    /// For binary formats, `[u8]` should be used.
    /// For text-based formats,`str` should be used.
    type Stream: ToOwned + ?Sized;
    /// Serializes into the stream format.
    fn serialize(o: &ObjectFile) -> <Self::Stream as ToOwned>::Owned;
    /// Deserializes from the stream format, returning `None`
    /// if an error occurred during deserialization.
    fn deserialize(i: &Self::Stream) -> Option<ObjectFile>;
}

/// The number of characters in one serialized word.
pub const WORD_WIDTH: usize = 16;

/// A text format of object file data.
///
/// Each word is written as 16 ASCII `0`/`1` characters, most significant bit first.
/// Words are separated by a single new line, with no new line after the last word.
///
/// # Example
/// ```
/// use hack_ensemble::asm::ObjectFile;
/// use hack_ensemble::asm::encoding::{ObjFileFormat, TextFormat};
///
/// let obj = ObjectFile::from_words(vec![0x0002, 0xEC10]);
/// let text = TextFormat::serialize(&obj);
/// assert_eq!(text, "0000000000000010\n1110110000010000");
///
/// assert_eq!(TextFormat::deserialize(&text), Some(obj));
/// ```
pub struct TextFormat;

impl ObjFileFormat for TextFormat {
    type Stream = str;

    fn serialize(o: &ObjectFile) -> <Self::Stream as ToOwned>::Owned {
        let mut buf = String::with_capacity(o.len() * (WORD_WIDTH + 1));

        for (i, word) in o.words().iter().enumerate() {
            if i != 0 {
                buf.push('\n');
            }
            buf.push_str(&format_word(*word));
        }

        buf
    }

    fn deserialize(i: &Self::Stream) -> Option<ObjectFile> {
        let words = i.lines()
            .map(parse_word)
            .collect::<Option<Vec<_>>>()?;

        Some(ObjectFile::from_words(words))
    }
}

/// Formats a word as 16 binary digits.
pub fn format_word(word: u16) -> String {
    format!("{word:0width$b}", width = WORD_WIDTH)
}

/// Parses 16 binary digits into a word.
pub fn parse_word(line: &str) -> Option<u16> {
    let valid = line.len() == WORD_WIDTH
        && line.bytes().all(|b| matches!(b, b'0' | b'1'));

    valid.then(|| u16::from_str_radix(line, 2).ok())
        .flatten()
}
