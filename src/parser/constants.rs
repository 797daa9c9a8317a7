use super::cursor::{read_byte, read_integer, read_number, read_string};
use super::error::{ErrorKind, Input, PResult, ParseError};
use nom::{Parser, combinator::map};
use num_enum::TryFromPrimitive;
use std::fmt;

/// A value from a function's constant table
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Nil,
    Boolean(bool),
    Number(f64),
    Integer(i64),
    String(String),
}

/// Type tag preceding each constant (lobject.h variant tags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum ConstantTag {
    Nil = 0x00,
    Boolean = 0x01,
    Number = 0x03,      // LUA_TNUMFLT
    ShortString = 0x04, // LUA_TSHRSTR
    Integer = 0x13,     // LUA_TNUMINT
    LongString = 0x14,  // LUA_TLNGSTR
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Nil => f.write_str("nil"),
            Constant::Boolean(b) => write!(f, "{b}"),
            Constant::Number(n) => write!(f, "{n:?}"),
            Constant::Integer(i) => write!(f, "{i}"),
            Constant::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// Parses one tagged constant
pub fn parse_constant(input: Input<'_>) -> PResult<'_, Constant> {
    let (rest, tag_byte) = read_byte(input)?;
    let tag = ConstantTag::try_from(tag_byte)
        .map_err(|_| ParseError::failure(input, ErrorKind::UnknownConstantTag(tag_byte)))?;

    match tag {
        ConstantTag::Nil => Ok((rest, Constant::Nil)),
        ConstantTag::Boolean => map(read_byte, |b| Constant::Boolean(b != 0)).parse(rest),
        ConstantTag::Number => map(read_number, Constant::Number).parse(rest),
        ConstantTag::Integer => map(read_integer, Constant::Integer).parse(rest),
        ConstantTag::ShortString | ConstantTag::LongString => {
            map(read_string, Constant::String).parse(rest)
        }
    }
}
