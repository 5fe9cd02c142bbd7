//! Domain models for tasktree
//!
//! Contains the task tree and its mutation rules without any I/O concerns.

mod id;
mod task;
mod graph;
mod store;
mod shared;

pub use id::{IdAllocator, IdError, IdStrategy, TaskId};
pub use task::{Task, TaskNode};
pub use graph::{check_tree, IntegrityError, TaskGraph};
pub use store::{CascadeMode, MoveRejection, StoreError, StoreOptions, TaskStore, Walk};
pub use shared::SharedTaskStore;
