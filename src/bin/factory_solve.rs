//! Standalone executable: reads one Factory input document from stdin,
//! writes exactly one output document to stdout (spec §6). No flags, no
//! diagnostic text; any problem is reported as either a well-formed
//! infeasibility document (exit 0) or a nonzero exit with a message on
//! stderr only.

use std::io::{self, Read, Write};
use std::process::ExitCode;

use prodflow::factory;

fn main() -> ExitCode {
    let mut input = String::new();
    if let Err(err) = io::stdin().read_to_string(&mut input) {
        eprintln!("failed to read stdin: {err}");
        return ExitCode::FAILURE;
    }

    match factory::run(&input) {
        Ok(output) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            if serde_json::to_writer(&mut handle, &output).is_err() || writeln!(handle).is_err() {
                eprintln!("failed to write output document");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
