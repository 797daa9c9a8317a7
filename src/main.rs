use clap::Parser;
use log::{debug, info};

use luaundump::{Listing, undump};

/// Command-line arguments parser
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Decode precompiled Lua 5.3 chunks and list their functions"
)]
struct Arguments {
    /// Paths to the Lua bytecode files to decode
    #[clap(
        required = true,
        help = "One or more Lua 5.3 bytecode files (luac output).",
        value_name = "FILE",
        value_hint = clap::ValueHint::FilePath
    )]
    files: Vec<String>,

    /// Include constants, locals and upvalues in the listing
    #[clap(short, long)]
    debug_info: bool,

    /// Print a one-line summary per file instead of the listing
    #[clap(short, long, conflicts_with = "debug_info")]
    quiet: bool,
}

/// Reads and decodes one file, printing its listing or summary
fn process_file(file_path: &str, args: &Arguments) -> Result<(), Box<dyn std::error::Error>> {
    let bytecode = std::fs::read(file_path)?;
    let main = undump(&bytecode)?;
    info!("Decoded {} ({} bytes)", file_path, bytecode.len());

    if args.quiet {
        println!(
            "{}: {} functions, {} instructions in main",
            file_path,
            main.function_count(),
            main.code.len()
        );
    } else {
        print!("{}", Listing::new(&main).with_debug_info(args.debug_info));
    }
    Ok(())
}

fn main() {
    // Initialize logging
    env_logger::init();

    let args = Arguments::parse();

    let mut failed = false;
    for file_path in &args.files {
        info!("Decoding file: {}", file_path);

        if let Err(err) = process_file(file_path, &args) {
            debug!("Failed to decode {}", file_path);
            eprintln!("luaundump: {}: {}", file_path, err);
            failed = true;
        }
    }

    if failed {
        std::process::exit(1);
    }
}
