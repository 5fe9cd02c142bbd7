//! tasktree - hierarchical task list in the terminal

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = tasktree::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
