//! Decoder for precompiled Lua 5.3 chunks (`luac` output).
//!
//! [`undump`] validates the chunk header and rebuilds the tree of function
//! prototypes. The tree owns all of its data; instructions are kept as raw
//! 32-bit words.
//!
//! ```no_run
//! let bytes = std::fs::read("luac.out")?;
//! let main = luaundump::undump(&bytes)?;
//! println!("{}", luaundump::Listing::new(&main));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod listing;
pub mod parser;

pub use listing::Listing;
pub use parser::{
    Constant, ErrorKind, LocalVariable, Prototype, SizeField, UndumpError, Upvalue, undump,
};
