//! Task identifiers and id allocation
//!
//! Ids are plain `u64` values. Two allocation strategies exist:
//! - `Timestamp`: derived from wall-clock milliseconds, bumped past the last
//!   issued id so two tasks created in the same millisecond never collide
//! - `Sequential`: `1, 2, 3, ...`
//!
//! Both strategies are strictly increasing within one allocator.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("Invalid task ID: expected a positive integer, got '{0}'")]
    InvalidTaskId(String),

    #[error("No task IDs left after {0}")]
    Exhausted(TaskId),
}

/// Identifier of a task, stable for the task's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw numeric value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.parse::<u64>() {
            Ok(0) | Err(_) => Err(IdError::InvalidTaskId(s.to_string())),
            Ok(value) => Ok(Self(value)),
        }
    }
}

impl From<u64> for TaskId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// How new ids are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Milliseconds since epoch, forced strictly increasing
    #[default]
    Timestamp,
    /// Counter starting at 1
    Sequential,
}

impl IdStrategy {
    pub fn as_str(&self) -> &str {
        match self {
            IdStrategy::Timestamp => "timestamp",
            IdStrategy::Sequential => "sequential",
        }
    }
}

/// Returns current timestamp in milliseconds since epoch
fn current_timestamp() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Hands out fresh task ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    strategy: IdStrategy,
    last: u64,
}

impl IdAllocator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self { strategy, last: 0 }
    }

    /// Makes sure every future id is greater than `id`
    pub fn observe(&mut self, id: TaskId) {
        self.last = self.last.max(id.value());
    }

    /// Returns the next id, or `Exhausted` once every id up to `u64::MAX` is taken
    pub fn next_id(&mut self) -> Result<TaskId, IdError> {
        let floor = self
            .last
            .checked_add(1)
            .ok_or(IdError::Exhausted(TaskId(self.last)))?;
        let next = match self.strategy {
            IdStrategy::Timestamp => current_timestamp().max(floor),
            IdStrategy::Sequential => floor,
        };
        self.last = next;
        Ok(TaskId(next))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(IdStrategy::default())
    }
}
