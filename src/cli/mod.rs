//! # Command-Line Interface
//!
//! The `tasktree` binary: one-shot commands over the seeded tree and a line
//! shell for editing it.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `tree` | Print the seeded tree |
//! | `check` | Verify the seed forms a consistent tree |
//! | `shell` | Apply `add`, `done`, `indent`, ... commands read line by line |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Logging
//!
//! Logs go to stderr. Use `--verbose` (or `-v`) for debug logs, or set
//! `RUST_LOG`:
//! ```bash
//! RUST_LOG=tasktree=trace tasktree shell < script.txt
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod render;
pub mod shell;

pub use app::{Cli, Commands, IdsArg, run};
pub use output::{Output, OutputFormat};
