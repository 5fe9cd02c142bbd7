//! Seed lists for the task store
//!
//! A store starts empty, from the built-in sample list, or from a seed file.
//! Seed files hold tasks either as a JSON array or as JSONL (one JSON object
//! per line). Files are read under a shared lock and are never written.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use fs2::FileExt;
use tracing::{debug, warn};

use crate::domain::{StoreOptions, Task, TaskId, TaskStore};

/// Where the initial tasks come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    Empty,
    Builtin,
    File(PathBuf),
}

impl SeedSource {
    /// Reads the seed tasks for this source
    pub fn tasks(&self) -> Result<Vec<Task>> {
        match self {
            SeedSource::Empty => Ok(Vec::new()),
            SeedSource::Builtin => Ok(builtin()),
            SeedSource::File(path) => SeedFile::new(path).read_all(),
        }
    }

    /// Builds a store from this source, rejecting seeds that break the tree invariants
    pub fn load(&self, options: StoreOptions) -> Result<TaskStore> {
        let tasks = self.tasks()?;
        debug!("Loading {} seed tasks from {:?}", tasks.len(), self);

        TaskStore::from_tasks(tasks, options)
            .map_err(|e| {
                warn!("Rejected seed from {:?}: {}", self, e);
                e
            })
            .with_context(|| format!("Invalid seed data in {}", self.describe()))
    }

    /// Human-readable name of the source
    pub fn describe(&self) -> String {
        match self {
            SeedSource::Empty => "empty store".to_string(),
            SeedSource::Builtin => "built-in sample".to_string(),
            SeedSource::File(path) => path.display().to_string(),
        }
    }
}

/// A seed file on disk
pub struct SeedFile {
    path: PathBuf,
}

impl SeedFile {
    /// Creates a handle for the file at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads every task in file order
    pub fn read_all(&self) -> Result<Vec<Task>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open seed file: {}", self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .context("Failed to acquire read lock on seed file")?;

        let mut reader = BufReader::new(&file);
        let starts_with_array = reader
            .fill_buf()
            .context("Failed to read seed file")?
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            == Some(&b'[');

        if starts_with_array {
            let mut content = String::new();
            reader
                .read_to_string(&mut content)
                .context("Failed to read seed file")?;
            return serde_json::from_str(&content).with_context(|| {
                format!("Failed to parse seed array in {}", self.path.display())
            });
        }

        let mut tasks = Vec::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let task: Task = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse task at line {}", line_num + 1))?;
            tasks.push(task);
        }

        // Lock is released when file is dropped
        Ok(tasks)
    }
}

/// The sample list shipped with the binary
pub fn builtin() -> Vec<Task> {
    let refactor = TaskId::new(1692777006717);
    let study = TaskId::new(1692777006718);
    let typescript = TaskId::new(1692777007668);
    let prisma = TaskId::new(1692777011471);
    let data_structures = TaskId::new(1692777011910);

    let mut study_task = Task::new(study, "Study", None);
    study_task.children = vec![typescript, prisma, data_structures];

    vec![
        Task::new(refactor, "Refactor Code", None),
        study_task,
        Task::new(typescript, "Study Typescript", Some(study)),
        Task::new(prisma, "Study Prisma", Some(study)),
        Task::new(data_structures, "Study Data Structures", Some(study)),
    ]
}
