//! Main CLI application structure

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{render, shell};
use crate::domain::IdStrategy;
use crate::storage::{Config, SeedSource};

#[derive(Parser)]
#[command(name = "tasktree")]
#[command(author, version, about = "Hierarchical to-do list in the terminal")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "TASKTREE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seed file with the initial tasks (JSON array or JSONL)
    #[arg(long, global = true, conflicts_with = "empty")]
    pub seed: Option<PathBuf>,

    /// Start with no tasks
    #[arg(long, global = true)]
    pub empty: bool,

    /// How new task ids are generated
    #[arg(long, global = true)]
    pub ids: Option<IdsArg>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IdsArg {
    /// Millisecond timestamps, strictly increasing
    Timestamp,
    /// 1, 2, 3, ... after the largest seeded id
    Sequential,
}

impl From<IdsArg> for IdStrategy {
    fn from(arg: IdsArg) -> Self {
        match arg {
            IdsArg::Timestamp => IdStrategy::Timestamp,
            IdsArg::Sequential => IdStrategy::Sequential,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the task tree
    Tree,

    /// Verify the seed tasks form a consistent tree
    Check,

    /// Edit the tree with line commands read from stdin or a script
    Shell {
        /// Read commands from a file instead of stdin
        #[arg(long)]
        script: Option<PathBuf>,
    },
}

/// Installs the stderr log subscriber
///
/// `RUST_LOG` wins when set; otherwise `--verbose` enables debug logs for
/// this crate and everything else stays at `warn`.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tasktree=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

impl Cli {
    /// Seed source from the flags, falling back to the config
    fn seed_source(&self, config: &Config) -> SeedSource {
        if self.empty {
            SeedSource::Empty
        } else if let Some(path) = &self.seed {
            SeedSource::File(path.clone())
        } else {
            config.seed.source()
        }
    }
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    debug!("Loaded config: {:?}", config);

    let output = Output::new(cli.format.unwrap_or(config.output.format));

    let mut options = config.store.options();
    if let Some(ids) = cli.ids {
        options.ids = ids.into();
    }

    let source = cli.seed_source(&config);
    let store = source.load(options)?;
    debug!(
        "Store ready: {} tasks from {}, cascade={}, ids={}",
        store.len(),
        source.describe(),
        store.cascade_mode().as_str(),
        options.ids.as_str()
    );

    match cli.command {
        Commands::Tree => {
            let roots = store.tree();
            if output.is_json() {
                output.data(&roots);
            } else if roots.is_empty() {
                output.success("No tasks");
            } else {
                output.text(&render::tree(&roots));
            }
        }

        Commands::Check => {
            store.verify()?;
            if output.is_json() {
                output.data(&serde_json::json!({
                    "success": true,
                    "source": source.describe(),
                    "tasks": store.len(),
                    "roots": store.root_ids().len(),
                }));
            } else {
                output.success(&format!(
                    "OK: {} tasks ({} roots) from {}, tree is consistent",
                    store.len(),
                    store.root_ids().len(),
                    source.describe()
                ));
            }
        }

        Commands::Shell { script: Some(path) } => {
            let file = File::open(&path)
                .with_context(|| format!("Failed to open script: {}", path.display()))?;
            shell::run(store, &output, BufReader::new(file), false)?;
        }

        Commands::Shell { script: None } => shell::run_stdin(store, &output)?,
    }

    Ok(())
}
