use super::constants::{Constant, parse_constant};
use super::cursor::{read_array, read_byte, read_string, read_u32};
use super::error::{Input, PResult};
use nom::{Parser, combinator::map};

use log::debug;

/// Represents a Lua function prototype
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub source: String,               // Source name, inherited from the parent when not stored
    pub line_defined: u32,            // Line where the function starts (0 for the main chunk)
    pub last_line_defined: u32,       // Line where the function ends
    pub num_params: u8,               // Number of fixed parameters
    pub is_vararg: u8,                // Non-zero when the function takes `...`
    pub max_stack_size: u8,           // Registers needed by the function
    pub code: Vec<u32>,               // Raw instruction words
    pub constants: Vec<Constant>,     // Constant table
    pub upvalues: Vec<Upvalue>,       // Upvalue descriptors
    pub protos: Vec<Prototype>,       // Nested function prototypes
    pub line_info: Vec<u32>,          // Source line per instruction
    pub loc_vars: Vec<LocalVariable>, // Local variable scopes
    pub upvalue_names: Vec<String>,   // Upvalue names (debug info)
}

/// Where a closure finds an upvalue when it is instantiated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upvalue {
    pub in_stack: u8, // 1 when captured from the enclosing function's registers
    pub index: u8,    // Register or enclosing upvalue index
}

/// Represents a local variable debug information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    pub name: String,  // Variable name
    pub start_pc: u32, // First instruction where the variable is active
    pub end_pc: u32,   // First instruction where the variable is dead
}

impl Prototype {
    /// Number of prototypes in this subtree, including `self`
    pub fn function_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(proto) = pending.pop() {
            count += 1;
            pending.extend(proto.protos.iter());
        }
        count
    }
}

// Nesting depth is only bounded by the chunk size, so the tree is torn down
// without recursion.
impl Drop for Prototype {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.protos);
        while let Some(mut proto) = pending.pop() {
            pending.append(&mut proto.protos);
        }
    }
}

/// Parsing functions module
mod parsers {
    use super::*;

    /// A function whose nested prototypes are still being read
    pub struct Frame {
        pub proto: Prototype,
        pub remaining: u32, // Nested prototypes not read yet
    }

    pub fn parse_upvalue(input: Input<'_>) -> PResult<'_, Upvalue> {
        map((read_byte, read_byte), |(in_stack, index)| Upvalue { in_stack, index }).parse(input)
    }

    pub fn parse_local_variable(input: Input<'_>) -> PResult<'_, LocalVariable> {
        map((read_string, read_u32, read_u32), |(name, start_pc, end_pc)| {
            LocalVariable {
                name,
                start_pc,
                end_pc,
            }
        })
        .parse(input)
    }

    /// Everything up to and including the nested prototype count
    pub fn parse_head<'a>(input: Input<'a>, parent_source: &str) -> PResult<'a, Frame> {
        let (input, source) = read_string(input)?;
        let source = if source.is_empty() {
            parent_source.to_owned()
        } else {
            source
        };
        let (input, line_defined) = read_u32(input)?;
        let (input, last_line_defined) = read_u32(input)?;
        let (input, num_params) = read_byte(input)?;
        let (input, is_vararg) = read_byte(input)?;
        let (input, max_stack_size) = read_byte(input)?;

        let (input, code) = read_array(input, read_u32)?;
        let (input, constants) = read_array(input, parse_constant)?;
        let (input, upvalues) = read_array(input, parse_upvalue)?;
        let (input, remaining) = read_u32(input)?;

        let proto = Prototype {
            source,
            line_defined,
            last_line_defined,
            num_params,
            is_vararg,
            max_stack_size,
            code,
            constants,
            upvalues,
            protos: Vec::new(),
            line_info: Vec::new(),
            loc_vars: Vec::new(),
            upvalue_names: Vec::new(),
        };
        Ok((input, Frame { proto, remaining }))
    }

    /// Debug info following the nested prototypes
    pub fn parse_tail<'a>(input: Input<'a>, proto: &mut Prototype) -> PResult<'a, ()> {
        let (input, line_info) = read_array(input, read_u32)?;
        let (input, loc_vars) = read_array(input, parse_local_variable)?;
        let (input, upvalue_names) = read_array(input, read_string)?;

        proto.line_info = line_info;
        proto.loc_vars = loc_vars;
        proto.upvalue_names = upvalue_names;

        debug!(
            "Parsed function <{}:{},{}>: {} instructions, {} constants, {} upvalues, {} functions",
            proto.source,
            proto.line_defined,
            proto.last_line_defined,
            proto.code.len(),
            proto.constants.len(),
            proto.upvalues.len(),
            proto.protos.len(),
        );

        Ok((input, ()))
    }
}

use parsers::*;

/// Parse a Lua function prototype and all of its nested prototypes.
///
/// A stripped or nested function stores an empty source name; it is resolved
/// here to `parent_source` and that resolved name is handed down to children.
/// Nesting is walked with an explicit stack of open functions, so arbitrarily
/// deep chunks cannot exhaust the native stack.
pub fn parse_function<'a>(input: Input<'a>, parent_source: &str) -> PResult<'a, Prototype> {
    let (mut input, mut current) = parse_head(input, parent_source)?;
    let mut open: Vec<Frame> = Vec::new();

    loop {
        if current.remaining > 0 {
            current.remaining -= 1;
            let (rest, child) = parse_head(input, &current.proto.source)?;
            input = rest;
            open.push(std::mem::replace(&mut current, child));
            continue;
        }

        let (rest, ()) = parse_tail(input, &mut current.proto)?;
        input = rest;

        match open.pop() {
            Some(mut parent) => {
                parent.proto.protos.push(current.proto);
                current = parent;
            }
            None => return Ok((input, current.proto)),
        }
    }
}
