//! Serialises test prototypes into the Lua 5.3 chunk layout.

#![allow(dead_code)]

use luaundump::parser::cursor::LONG_STRING_MARKER;
use luaundump::parser::header::{
    LUA_SIGNATURE, LUAC_DATA, LUAC_FORMAT, LUAC_INT, LUAC_NUM, LUAC_VERSION,
};
use luaundump::{Constant, Prototype, SizeField};

pub fn header() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(LUA_SIGNATURE);
    out.push(LUAC_VERSION);
    out.push(LUAC_FORMAT);
    out.extend_from_slice(LUAC_DATA);
    for field in SizeField::ALL {
        out.push(field.expected());
    }
    out.extend_from_slice(&LUAC_INT.to_le_bytes());
    out.extend_from_slice(&LUAC_NUM.to_le_bytes());
    out
}

/// Whole chunk with `main` as the main function
pub fn chunk(main: &Prototype) -> Vec<u8> {
    let mut out = header();
    out.push(main.upvalues.len() as u8);
    write_function(&mut out, main);
    out
}

/// A function with the given source and no body
pub fn function(source: &str, line_defined: u32) -> Prototype {
    Prototype {
        source: source.to_owned(),
        line_defined,
        last_line_defined: line_defined,
        num_params: 0,
        is_vararg: 0,
        max_stack_size: 2,
        code: vec![],
        constants: vec![],
        upvalues: vec![],
        protos: vec![],
        line_info: vec![],
        loc_vars: vec![],
        upvalue_names: vec![],
    }
}

pub fn write_string(out: &mut Vec<u8>, s: &str) {
    if s.is_empty() {
        out.push(0);
        return;
    }
    let size = s.len() + 1;
    if size < usize::from(LONG_STRING_MARKER) {
        out.push(size as u8);
    } else {
        out.push(LONG_STRING_MARKER);
        out.extend_from_slice(&(size as u64).to_le_bytes());
    }
    out.extend_from_slice(s.as_bytes());
}

fn write_count(out: &mut Vec<u8>, n: usize) {
    out.extend_from_slice(&(n as u32).to_le_bytes());
}

pub fn write_constant(out: &mut Vec<u8>, constant: &Constant) {
    match constant {
        Constant::Nil => out.push(0x00),
        Constant::Boolean(b) => out.extend_from_slice(&[0x01, u8::from(*b)]),
        Constant::Number(n) => {
            out.push(0x03);
            out.extend_from_slice(&n.to_le_bytes());
        }
        Constant::Integer(i) => {
            out.push(0x13);
            out.extend_from_slice(&i.to_le_bytes());
        }
        Constant::String(s) => {
            out.push(if s.len() <= 40 { 0x04 } else { 0x14 });
            write_string(out, s);
        }
    }
}

/// Writes `proto` as stored; an empty source is written as the empty string
pub fn write_function(out: &mut Vec<u8>, proto: &Prototype) {
    write_string(out, &proto.source);
    out.extend_from_slice(&proto.line_defined.to_le_bytes());
    out.extend_from_slice(&proto.last_line_defined.to_le_bytes());
    out.push(proto.num_params);
    out.push(proto.is_vararg);
    out.push(proto.max_stack_size);

    write_count(out, proto.code.len());
    for word in &proto.code {
        out.extend_from_slice(&word.to_le_bytes());
    }
    write_count(out, proto.constants.len());
    for constant in &proto.constants {
        write_constant(out, constant);
    }
    write_count(out, proto.upvalues.len());
    for upvalue in &proto.upvalues {
        out.push(upvalue.in_stack);
        out.push(upvalue.index);
    }
    write_count(out, proto.protos.len());
    for child in &proto.protos {
        write_function(out, child);
    }
    write_count(out, proto.line_info.len());
    for line in &proto.line_info {
        out.extend_from_slice(&line.to_le_bytes());
    }
    write_count(out, proto.loc_vars.len());
    for local in &proto.loc_vars {
        write_string(out, &local.name);
        out.extend_from_slice(&local.start_pc.to_le_bytes());
        out.extend_from_slice(&local.end_pc.to_le_bytes());
    }
    write_count(out, proto.upvalue_names.len());
    for name in &proto.upvalue_names {
        write_string(out, name);
    }
}
