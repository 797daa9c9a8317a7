/*
  Text listing of a decoded chunk, laid out like `luac -l`
*/

use crate::parser::Prototype;
use std::fmt;

/// Display adapter over a prototype tree
pub struct Listing<'a> {
    proto: &'a Prototype,
    debug_info: bool,
}

impl<'a> Listing<'a> {
    pub fn new(proto: &'a Prototype) -> Self {
        Self {
            proto,
            debug_info: false,
        }
    }

    /// Also print constants, locals and upvalues (like `luac -l -l`)
    pub fn with_debug_info(mut self, debug_info: bool) -> Self {
        self.debug_info = debug_info;
        self
    }

    fn write_function(&self, f: &mut fmt::Formatter<'_>, proto: &Prototype) -> fmt::Result {
        let kind = if proto.line_defined == 0 { "main" } else { "function" };
        writeln!(
            f,
            "\n{kind} <{}:{},{}> ({})",
            chunk_id(&proto.source),
            proto.line_defined,
            proto.last_line_defined,
            plural(proto.code.len(), "instruction"),
        )?;
        writeln!(
            f,
            "{}{} param{}, {}, {}, {}, {}, {}",
            proto.num_params,
            if proto.is_vararg != 0 { "+" } else { "" },
            if proto.num_params == 1 { "" } else { "s" },
            plural(usize::from(proto.max_stack_size), "slot"),
            plural(proto.upvalues.len(), "upvalue"),
            plural(proto.loc_vars.len(), "local"),
            plural(proto.constants.len(), "constant"),
            plural(proto.protos.len(), "function"),
        )?;

        for (pc, word) in proto.code.iter().enumerate() {
            match proto.line_info.get(pc) {
                Some(line) => writeln!(f, "\t{}\t[{line}]\t{word:08X}", pc + 1)?,
                None => writeln!(f, "\t{}\t[-]\t{word:08X}", pc + 1)?,
            }
        }

        if self.debug_info {
            self.write_debug_info(f, proto)?;
        }
        Ok(())
    }

    fn write_debug_info(&self, f: &mut fmt::Formatter<'_>, proto: &Prototype) -> fmt::Result {
        writeln!(f, "constants ({}):", proto.constants.len())?;
        for (i, constant) in proto.constants.iter().enumerate() {
            writeln!(f, "\t{}\t{constant}", i + 1)?;
        }

        writeln!(f, "locals ({}):", proto.loc_vars.len())?;
        for (i, local) in proto.loc_vars.iter().enumerate() {
            writeln!(
                f,
                "\t{i}\t{}\t{}\t{}",
                local.name,
                u64::from(local.start_pc) + 1,
                u64::from(local.end_pc) + 1
            )?;
        }

        // names are stored separately and may be stripped
        writeln!(f, "upvalues ({}):", proto.upvalues.len())?;
        for (i, upvalue) in proto.upvalues.iter().enumerate() {
            let name = proto.upvalue_names.get(i).map_or("-", String::as_str);
            writeln!(f, "\t{i}\t{name}\t{}\t{}", upvalue.in_stack, upvalue.index)?;
        }
        Ok(())
    }
}

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pre-order, children in definition order
        let mut pending = vec![self.proto];
        while let Some(proto) = pending.pop() {
            self.write_function(f, proto)?;
            pending.extend(proto.protos.iter().rev());
        }
        Ok(())
    }
}

/// Printable form of a source name, as in `luaO_chunkid`
fn chunk_id(source: &str) -> String {
    match source.chars().next() {
        None => "?".to_owned(),
        Some('@' | '=') => source[1..].to_owned(),
        Some(_) => format!("[string \"{}\"]", source.lines().next().unwrap_or_default()),
    }
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Constant, LocalVariable, Upvalue};

    fn sample() -> Prototype {
        let child = Prototype {
            source: "@demo.lua".into(),
            line_defined: 2,
            last_line_defined: 4,
            num_params: 1,
            is_vararg: 0,
            max_stack_size: 2,
            code: vec![0x0080_0026],
            constants: vec![],
            upvalues: vec![],
            protos: vec![],
            line_info: vec![4],
            loc_vars: vec![],
            upvalue_names: vec![],
        };
        Prototype {
            source: "@demo.lua".into(),
            line_defined: 0,
            last_line_defined: 0,
            num_params: 0,
            is_vararg: 1,
            max_stack_size: 2,
            code: vec![0x0000_002C, 0x0080_0026],
            constants: vec![Constant::String("f".into())],
            upvalues: vec![Upvalue {
                in_stack: 1,
                index: 0,
            }],
            protos: vec![child],
            line_info: vec![4],
            loc_vars: vec![LocalVariable {
                name: "x".into(),
                start_pc: 0,
                end_pc: 1,
            }],
            upvalue_names: vec!["_ENV".into()],
        }
    }

    #[test]
    fn lists_functions_in_preorder() {
        let proto = sample();
        let text = Listing::new(&proto).to_string();
        let main = text.find("main <demo.lua:0,0> (2 instructions)").unwrap();
        let child = text.find("function <demo.lua:2,4> (1 instruction)").unwrap();
        assert!(main < child);
        assert!(text.contains("0+ params, 2 slots, 1 upvalue, 1 local, 1 constant, 1 function"));
        assert!(text.contains("1 param, 2 slots, 0 upvalues, 0 locals, 0 constants, 0 functions"));
        assert!(text.contains("\t1\t[4]\t0000002C"));
        assert!(text.contains("\t2\t[-]\t00800026"));
        assert!(!text.contains("constants ("));
    }

    #[test]
    fn debug_info_sections() {
        let proto = sample();
        let text = Listing::new(&proto).with_debug_info(true).to_string();
        assert!(text.contains("constants (1):\n\t1\t\"f\"\n"));
        assert!(text.contains("locals (1):\n\t0\tx\t1\t2\n"));
        assert!(text.contains("upvalues (1):\n\t0\t_ENV\t1\t0\n"));
    }

    #[test]
    fn last_pc_does_not_wrap() {
        let mut proto = sample();
        proto.loc_vars[0].start_pc = u32::MAX;
        proto.loc_vars[0].end_pc = u32::MAX;
        let text = Listing::new(&proto).with_debug_info(true).to_string();
        assert!(text.contains("\t0\tx\t4294967296\t4294967296\n"));
    }

    #[test]
    fn sibling_order_is_preserved() {
        let mut proto = sample();
        let mut second = sample().protos.remove(0);
        second.line_defined = 6;
        second.last_line_defined = 8;
        proto.protos.push(second);
        let text = Listing::new(&proto).to_string();
        let first = text.find("function <demo.lua:2,4>").unwrap();
        let second = text.find("function <demo.lua:6,8>").unwrap();
        assert!(first < second);
    }

    #[test]
    fn chunk_ids() {
        assert_eq!(chunk_id("@a/b.lua"), "a/b.lua");
        assert_eq!(chunk_id("=stdin"), "stdin");
        assert_eq!(chunk_id(""), "?");
        assert_eq!(chunk_id("return 1\nend"), "[string \"return 1\"]");
    }
}
