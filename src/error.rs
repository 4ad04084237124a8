use core::fmt::Display;
use std::sync::Arc;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when parsing .art text or decoding .cart bytes.
///
/// Every variant is recoverable at single-file granularity: the caller is
/// expected to report the message and move on to the next input.
#[derive(Debug, Clone)]
pub enum Error {
    /// Size section does not hold exactly two positive integers.
    MalformedSize(String),
    /// A section row holds a different number of cells than the declared width.
    RowLengthMismatch {
        section: &'static str,
        line: usize,
        expected: usize,
        found: usize,
    },
    /// A symbol pair is neither `<char><space>` nor two hex digits.
    MalformedSymbol { line: usize, column: usize },
    /// A color token does not split into 3 or 4 hex channel groups.
    MalformedColor { section: &'static str, line: usize },
    /// Input text ended before a section collected all its rows.
    TruncatedFile { section: &'static str },

    /// Cart stream does not start with the `CART` tag.
    BadMagic([u8; 4]),
    /// Cart stream ended before all cells were read.
    TruncatedStream {
        cells_read: usize,
        cells_expected: usize,
    },

    /// A texture with zero width or height was requested.
    EmptyTexture { width: usize, height: usize },

    /// File extension is neither `.art` nor `.cart`.
    UnknownExtension(String),

    /// I/O error occurred.
    Io(Arc<std::io::Error>),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.into())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MalformedSize(line) => {
                write!(
                    f,
                    "size section must hold exactly two positive integers, got: {}",
                    line
                )
            }
            Error::RowLengthMismatch {
                section,
                line,
                expected,
                found,
            } => write!(
                f,
                "{} section, line {}: expected {} cells per row, found {}",
                section, line, expected, found
            ),
            Error::MalformedSymbol { line, column } => write!(
                f,
                "symbols section, line {}, column {}: missing space between symbols or invalid hex code",
                line, column
            ),
            Error::MalformedColor { section, line } => write!(
                f,
                "{} section, line {}: color must be 3 or 4 two-digit hex channels",
                section, line
            ),
            Error::TruncatedFile { section } => {
                write!(f, "file ended before the {} section was complete", section)
            }
            Error::BadMagic(tag) => {
                write!(f, "missing CART header, got tag bytes {:02x?}", tag)
            }
            Error::TruncatedStream {
                cells_read,
                cells_expected,
            } => write!(
                f,
                "cart stream ended after {} of {} cells",
                cells_read, cells_expected
            ),
            Error::EmptyTexture { width, height } => {
                write!(f, "texture size {}x{} must be at least 1x1", width, height)
            }
            Error::UnknownExtension(ext) => {
                write!(f, "unknown extension '{}', expected .art or .cart", ext)
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {}
