use super::header::SizeField;
use thiserror::Error;

/// The unread remainder of the chunk
pub type Input<'a> = &'a [u8];

/// Result type shared by every parser in this module
pub type PResult<'a, T> = nom::IResult<Input<'a>, T, ParseError<'a>>;

/// Reason a chunk was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("truncated chunk")]
    Truncated,
    #[error("not a precompiled chunk")]
    SignatureMismatch,
    #[error("version mismatch")]
    VersionMismatch,
    #[error("format mismatch")]
    FormatMismatch,
    #[error("corrupted chunk")]
    IntegrityMismatch,
    #[error("{0} size mismatch")]
    SizeMismatch(SizeField),
    #[error("endianness mismatch")]
    EndiannessMismatch,
    #[error("float format mismatch")]
    FloatFormatMismatch,
    #[error("unknown constant tag 0x{0:02X}")]
    UnknownConstantTag(u8),
}

/// Error returned by [`undump`](super::undump)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("bad binary format at offset {offset}: {kind}")]
pub struct UndumpError {
    pub kind: ErrorKind,
    /// Byte position where the failing read started
    pub offset: usize,
}

/// Parser-side error, carries the input at the point of failure so the
/// entry point can turn it into an offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParseError<'a> {
    pub input: Input<'a>,
    pub kind: ErrorKind,
}

impl<'a> ParseError<'a> {
    /// Unrecoverable error at `input`
    pub fn failure(input: Input<'a>, kind: ErrorKind) -> nom::Err<Self> {
        nom::Err::Failure(Self { input, kind })
    }

    /// Resolve against the full chunk the parse started from
    pub fn locate(self, chunk: &[u8]) -> UndumpError {
        UndumpError {
            kind: self.kind,
            offset: chunk.len().saturating_sub(self.input.len()),
        }
    }
}

// nom only raises errors of its own when it runs out of input
impl<'a> nom::error::ParseError<Input<'a>> for ParseError<'a> {
    fn from_error_kind(input: Input<'a>, _kind: nom::error::ErrorKind) -> Self {
        Self {
            input,
            kind: ErrorKind::Truncated,
        }
    }

    fn append(_input: Input<'a>, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}
