//! iocharvest - indicator harvesting for threat-intel document corpora
//!
//! Entry point for the iocharvest CLI application.

use clap::Parser;
use iocharvest::{
    cli::Cli,
    error::{ExitCode, StructuredError},
};

fn main() {
    let cli = Cli::parse();

    match iocharvest::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = ExitCode::from_error(&err);
            eprintln!("{}", StructuredError::new(&err, exit_code));
            std::process::exit(exit_code.as_i32());
        }
    }
}
