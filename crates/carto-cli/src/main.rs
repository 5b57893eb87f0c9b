use std::io;
use std::process::ExitCode;

use carto_cli::{execute, parse, ArgsError, TerminalProgress, USAGE};

fn main() -> ExitCode {
    let mut argv = std::env::args();
    let program = argv.next().unwrap_or_else(|| "carto".to_string());

    let args = match parse(argv) {
        Ok(args) => args,
        Err(ArgsError::HelpRequested) => {
            println!("Usage: {program} {USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{program}: {e}");
            eprintln!("Usage: {program} {USAGE}");
            return ExitCode::from(1);
        }
    };

    let mut progress = TerminalProgress::new(io::stdout());
    match execute(&args, &mut progress) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{program}: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
