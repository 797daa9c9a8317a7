//! Sequential readers over the chunk. Each parser consumes from the front of
//! the input and hands back the rest; nothing is ever re-read.

use super::error::{ErrorKind, Input, PResult, ParseError};
use nom::{
    Parser,
    bytes::complete::take,
    multi::count,
    number::complete::{le_f64, le_u32, le_u64, u8},
};

/// Size byte announcing that the real string size follows as a `size_t`
pub const LONG_STRING_MARKER: u8 = 0xFF;

/// Width of a little-endian unsigned integer on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UintWidth {
    Four,  // int, Instruction
    Eight, // size_t, lua_Integer
}

pub fn read_byte(input: Input<'_>) -> PResult<'_, u8> {
    u8(input)
}

/// Parses an unsigned integer of the given width
pub fn read_uint<'a>(width: UintWidth) -> impl Fn(Input<'a>) -> PResult<'a, u64> {
    move |input| match width {
        UintWidth::Four => {
            let (input, value) = le_u32(input)?;
            Ok((input, u64::from(value)))
        }
        UintWidth::Eight => le_u64(input),
    }
}

/// Parses a C `int` (counts, line numbers, pcs)
pub fn read_u32(input: Input<'_>) -> PResult<'_, u32> {
    let (input, value) = read_uint(UintWidth::Four)(input)?;
    Ok((input, value as u32))
}

/// Parses a `lua_Integer`
pub fn read_integer(input: Input<'_>) -> PResult<'_, i64> {
    let (input, bits) = read_uint(UintWidth::Eight)(input)?;
    Ok((input, bits as i64))
}

/// Parses a `lua_Number`
pub fn read_number(input: Input<'_>) -> PResult<'_, f64> {
    le_f64(input)
}

/// Takes exactly `len` raw bytes, borrowed from the chunk
pub fn read_bytes<'a>(len: usize) -> impl Fn(Input<'a>) -> PResult<'a, &'a [u8]> {
    move |input| take(len).parse(input)
}

/// Parses a size-prefixed string.
///
/// The stored size is one more than the payload length so that a zero size
/// byte can stand for the empty string. Sizes that do not fit in a byte are
/// written as [`LONG_STRING_MARKER`] followed by a `size_t`.
pub fn read_string(input: Input<'_>) -> PResult<'_, String> {
    let (mut input, short_size) = read_byte(input)?;
    let size = match short_size {
        0 => return Ok((input, String::new())),
        LONG_STRING_MARKER => {
            let (rest, size) = read_uint(UintWidth::Eight)(input)?;
            input = rest;
            size
        }
        size => u64::from(size),
    };

    // A long size of zero implies a payload of 2^64 - 1 bytes
    let len = size
        .checked_sub(1)
        .and_then(|len| usize::try_from(len).ok())
        .ok_or_else(|| ParseError::failure(input, ErrorKind::Truncated))?;

    let (input, bytes) = read_bytes(len)(input)?;
    Ok((input, String::from_utf8_lossy(bytes).into_owned()))
}

/// Parses an `int` count followed by that many records
pub fn read_array<'a, T, F>(input: Input<'a>, parser: F) -> PResult<'a, Vec<T>>
where
    F: Fn(Input<'a>) -> PResult<'a, T>,
{
    let (input, len) = read_u32(input)?;
    let len = usize::try_from(len).map_err(|_| ParseError::failure(input, ErrorKind::Truncated))?;
    count(parser, len).parse(input)
}
