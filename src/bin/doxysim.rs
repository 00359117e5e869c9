use std::process::ExitCode;

use doxysim::report::summary_table;
use doxysim::runner::run_with_args;

fn main() -> ExitCode {
    match run_with_args() {
        Ok(results) => {
            print!("{}", summary_table(&results));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
