//! Reading `.asm` source files and writing `.hack` output files.
//!
//! [`assemble_file`] is the whole round trip:
//! the source file is checked for an `.asm` extension, read, assembled with
//! [`crate::assemble_source`], and the resulting text is written to the output path.
//! By default, the output path is the input path with a `.hack` extension (see [`output_path`]).

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use tracing::{event, Level};

use crate::err::AssembleErr;

/// The extension every source file must have.
pub const INPUT_EXTENSION: &str = "asm";
/// The extension given to output files.
pub const OUTPUT_EXTENSION: &str = "hack";

/// Errors which can occur while assembling a file.
#[derive(Debug)]
pub enum FileErr {
    /// The input path does not end in `.asm`.
    InvalidExtension {
        /// The extension found (empty if the path had none).
        found: String,
    },
    /// The input file could not be read.
    Read(PathBuf, std::io::Error),
    /// The output file could not be written.
    Write(PathBuf, std::io::Error),
    /// The source failed to assemble.
    Assemble(AssembleErr),
}
impl std::fmt::Display for FileErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileErr::InvalidExtension { found } => write!(f, "invalid file extension, expected: '.{INPUT_EXTENSION}', got: '{found}'"),
            FileErr::Read(path, e)  => write!(f, "cannot read {}: {e}", path.display()),
            FileErr::Write(path, e) => write!(f, "cannot write {}: {e}", path.display()),
            FileErr::Assemble(e)    => std::fmt::Display::fmt(e, f),
        }
    }
}
impl std::error::Error for FileErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileErr::InvalidExtension { .. } => None,
            FileErr::Read(_, e)  => Some(e),
            FileErr::Write(_, e) => Some(e),
            FileErr::Assemble(e) => Some(e),
        }
    }
}
impl crate::err::Error for FileErr {
    fn line(&self) -> Option<usize> {
        match self {
            FileErr::Assemble(e) => e.line(),
            _ => None,
        }
    }

    fn help(&self) -> Option<Cow<str>> {
        match self {
            FileErr::InvalidExtension { .. } => Some(format!("Hack assembly files end in '.{INPUT_EXTENSION}'").into()),
            FileErr::Assemble(e) => e.help(),
            _ => None,
        }
    }
}
impl From<AssembleErr> for FileErr {
    fn from(value: AssembleErr) -> Self {
        FileErr::Assemble(value)
    }
}

/// Checks that the path has the `.asm` extension.
///
/// # Example
/// ```
/// use hack_ensemble::file::validate_extension;
///
/// assert!(validate_extension("Prog.asm".as_ref()).is_ok());
///
/// let err = validate_extension("Prog.txt".as_ref()).unwrap_err();
/// assert_eq!(err.to_string(), "invalid file extension, expected: '.asm', got: '.txt'");
/// ```
pub fn validate_extension(path: &Path) -> Result<(), FileErr> {
    match path.extension() {
        Some(ext) if ext == INPUT_EXTENSION => Ok(()),
        Some(ext) => Err(FileErr::InvalidExtension { found: format!(".{}", ext.to_string_lossy()) }),
        None => Err(FileErr::InvalidExtension { found: String::new() }),
    }
}

/// The default output path for a source file: the same path with a `.hack` extension.
///
/// # Example
/// ```
/// use std::path::Path;
/// use hack_ensemble::file::output_path;
///
/// assert_eq!(output_path("projects/06/add/Add.asm".as_ref()), Path::new("projects/06/add/Add.hack"));
/// ```
pub fn output_path(input: &Path) -> PathBuf {
    input.with_extension(OUTPUT_EXTENSION)
}

/// Reads the lines of a source file, after checking its extension.
pub fn read_source(path: &Path) -> Result<Vec<String>, FileErr> {
    validate_extension(path)?;

    let text = std::fs::read_to_string(path)
        .map_err(|e| FileErr::Read(path.to_path_buf(), e))?;
    event!(Level::DEBUG, "read {} bytes from {}", text.len(), path.display());

    Ok(text.lines().map(String::from).collect())
}

/// Reads and assembles a source file into `.hack` text.
pub fn assemble_path(input: &Path) -> Result<String, FileErr> {
    let lines = read_source(input)?;
    Ok(crate::assemble_source(lines)?)
}

/// Assembles a source file, writing the result to `output`.
///
/// Nothing is written if assembly fails.
pub fn assemble_file(input: &Path, output: &Path) -> Result<(), FileErr> {
    let text = assemble_path(input)?;

    std::fs::write(output, &text)
        .map_err(|e| FileErr::Write(output.to_path_buf(), e))?;
    event!(Level::INFO, "wrote {}", output.display());

    Ok(())
}
