//! # Storage Layer
//!
//! Everything that touches the filesystem. The task tree itself lives only in
//! memory; this layer supplies the inputs it starts from.
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Seed tasks | JSON array or JSONL | `--seed` / `[seed] path` |
//! | Config | TOML | `--config`, `TASKTREE_CONFIG`, or `<config dir>/tasktree/config.toml` |
//!
//! ## Key Types
//!
//! - [`SeedSource`] - Where the initial task list comes from
//! - [`SeedFile`] - Reads seed tasks under a shared file lock
//! - [`Config`] - Store, seed, and output settings

mod seed;
mod config;

pub use seed::{builtin, SeedFile, SeedSource};
pub use config::{Config, ConfigError, OutputConfig, OutputFormat, SeedConfig, StoreConfig};
