use super::cursor::{read_byte, read_bytes, read_integer, read_number};
use super::error::{ErrorKind, Input, PResult, ParseError};
use log::debug;
use std::fmt;

pub const LUA_SIGNATURE: &[u8; 4] = b"\x1bLua";
pub const LUAC_VERSION: u8 = 0x53; // Lua 5.3
pub const LUAC_FORMAT: u8 = 0; // official format
pub const LUAC_DATA: &[u8; 6] = b"\x19\x93\r\n\x1a\n";
pub const LUAC_INT: i64 = 0x5678;
pub const LUAC_NUM: f64 = 370.5;

/// Length of the fixed preamble, up to and including the check number
pub const HEADER_SIZE: usize = 4 + 1 + 1 + 6 + 5 + 8 + 8;

/// Platform size fields of the header, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeField {
    CInt,
    SizeT,
    Instruction,
    LuaInteger,
    LuaNumber,
}

impl SizeField {
    pub const ALL: [SizeField; 5] = [
        SizeField::CInt,
        SizeField::SizeT,
        SizeField::Instruction,
        SizeField::LuaInteger,
        SizeField::LuaNumber,
    ];

    /// The only size this decoder accepts for the field
    pub const fn expected(self) -> u8 {
        match self {
            SizeField::CInt => 4,
            SizeField::SizeT => 8,
            SizeField::Instruction => 4,
            SizeField::LuaInteger => 8,
            SizeField::LuaNumber => 8,
        }
    }
}

impl fmt::Display for SizeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SizeField::CInt => "int",
            SizeField::SizeT => "size_t",
            SizeField::Instruction => "Instruction",
            SizeField::LuaInteger => "lua_Integer",
            SizeField::LuaNumber => "lua_Number",
        })
    }
}

/// Parsing functions module
mod parsers {
    use super::*;

    pub fn expect_bytes<'a>(
        expected: &'static [u8],
        kind: ErrorKind,
    ) -> impl Fn(Input<'a>) -> PResult<'a, ()> {
        move |input| {
            let (rest, found) = read_bytes(expected.len())(input)?;
            if found != expected {
                return Err(ParseError::failure(input, kind));
            }
            Ok((rest, ()))
        }
    }

    pub fn expect_byte<'a>(expected: u8, kind: ErrorKind) -> impl Fn(Input<'a>) -> PResult<'a, ()> {
        move |input| {
            let (rest, found) = read_byte(input)?;
            if found != expected {
                return Err(ParseError::failure(input, kind));
            }
            Ok((rest, ()))
        }
    }

    pub fn parse_sizes(mut input: Input<'_>) -> PResult<'_, ()> {
        for field in SizeField::ALL {
            let (rest, ()) = expect_byte(field.expected(), ErrorKind::SizeMismatch(field))(input)?;
            input = rest;
        }
        Ok((input, ()))
    }

    pub fn parse_check_integer(input: Input<'_>) -> PResult<'_, ()> {
        let (rest, value) = read_integer(input)?;
        if value != LUAC_INT {
            return Err(ParseError::failure(input, ErrorKind::EndiannessMismatch));
        }
        Ok((rest, ()))
    }

    pub fn parse_check_number(input: Input<'_>) -> PResult<'_, ()> {
        let (rest, value) = read_number(input)?;
        if value != LUAC_NUM {
            return Err(ParseError::failure(input, ErrorKind::FloatFormatMismatch));
        }
        Ok((rest, ()))
    }
}

use parsers::*;

/// Validate the chunk header. Checks run in wire order and stop at the first
/// mismatch, so nothing past the offending field is consumed.
pub fn check_header(input: Input<'_>) -> PResult<'_, ()> {
    let (input, ()) = expect_bytes(LUA_SIGNATURE, ErrorKind::SignatureMismatch)(input)?;
    let (input, ()) = expect_byte(LUAC_VERSION, ErrorKind::VersionMismatch)(input)?;
    let (input, ()) = expect_byte(LUAC_FORMAT, ErrorKind::FormatMismatch)(input)?;
    let (input, ()) = expect_bytes(LUAC_DATA, ErrorKind::IntegrityMismatch)(input)?;
    let (input, ()) = parse_sizes(input)?;
    let (input, ()) = parse_check_integer(input)?;
    let (input, ()) = parse_check_number(input)?;

    debug!("Header ok: Lua {:X}.{:X}", LUAC_VERSION >> 4, LUAC_VERSION & 0xF);

    Ok((input, ()))
}

#[cfg(test)]
pub(crate) fn valid_header() -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_SIZE);
    bytes.extend_from_slice(LUA_SIGNATURE);
    bytes.push(LUAC_VERSION);
    bytes.push(LUAC_FORMAT);
    bytes.extend_from_slice(LUAC_DATA);
    bytes.extend(SizeField::ALL.iter().map(|field| field.expected()));
    bytes.extend_from_slice(&LUAC_INT.to_le_bytes());
    bytes.extend_from_slice(&LUAC_NUM.to_le_bytes());
    bytes
}
