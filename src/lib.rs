//! tasktree - an in-memory hierarchical task list
//!
//! Tasks form a forest that can be edited, completed (with the completion
//! cascading down the subtree), deleted, and re-shaped with indent and
//! unindent. The [`TaskStore`] keeps the tree consistent after every
//! operation; the `tasktree` binary is a thin terminal front end on top.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{CascadeMode, SharedTaskStore, StoreError, Task, TaskId, TaskNode, TaskStore};
