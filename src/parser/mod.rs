pub mod constants;
pub mod cursor;
pub mod error;
pub mod function;
pub mod header;

pub use constants::{Constant, ConstantTag};
pub use error::{ErrorKind, UndumpError};
pub use function::{LocalVariable, Prototype, Upvalue, parse_function};
pub use header::{SizeField, check_header};

use cursor::read_byte;
use error::{Input, PResult};
use log::{trace, warn};

/// Header, legacy upvalue count byte, main function
fn parse_chunk(input: Input<'_>) -> PResult<'_, Prototype> {
    let (input, ()) = check_header(input)?;

    // Upvalue count of the main closure; only a placeholder for the loader
    let (input, size_upvalues) = read_byte(input)?;
    trace!("Skipped main upvalue count byte ({size_upvalues})");

    parse_function(input, "")
}

/// Main entry point for decoding a precompiled Lua 5.3 chunk
pub fn undump(chunk: &[u8]) -> Result<Prototype, UndumpError> {
    match parse_chunk(chunk) {
        Ok((rest, prototype)) => {
            if !rest.is_empty() {
                warn!("Ignoring {} trailing bytes after main function", rest.len());
            }
            Ok(prototype)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e.locate(chunk)),
        Err(nom::Err::Incomplete(_)) => Err(UndumpError {
            kind: ErrorKind::Truncated,
            offset: chunk.len(),
        }),
    }
}
