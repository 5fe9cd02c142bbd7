//! Thread-safe handle around a [`TaskStore`]
//!
//! For hosts that serve several callers at once. Every mutation holds the
//! write lock for its whole duration; reads take the read lock and hand back
//! owned snapshots, so no caller ever observes a half-applied operation.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::id::TaskId;
use super::store::{Result, TaskStore};
use super::task::{Task, TaskNode};

#[derive(Debug, Clone, Default)]
pub struct SharedTaskStore {
    inner: Arc<RwLock<TaskStore>>,
}

impl SharedTaskStore {
    pub fn new(store: TaskStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    // Operations never panic halfway through a mutation, so a poisoned lock
    // still guards a consistent tree.
    fn read(&self) -> RwLockReadGuard<'_, TaskStore> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TaskStore> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create(&self, parent: Option<TaskId>, text: impl Into<String>) -> Result<TaskId> {
        self.write().create(parent, text)
    }

    pub fn set_text(&self, id: TaskId, text: impl Into<String>) -> Result<()> {
        self.write().set_text(id, text)
    }

    pub fn set_completed(&self, id: TaskId, value: bool) -> Result<()> {
        self.write().set_completed(id, value)
    }

    pub fn toggle_completed(&self, id: TaskId) -> Result<bool> {
        self.write().toggle_completed(id)
    }

    pub fn delete(&self, id: TaskId) -> Result<usize> {
        self.write().delete(id)
    }

    pub fn indent(&self, id: TaskId) -> Result<()> {
        self.write().indent(id)
    }

    pub fn unindent(&self, id: TaskId) -> Result<()> {
        self.write().unindent(id)
    }

    pub fn query(&self, id: TaskId) -> Result<Task> {
        self.read().query(id).cloned()
    }

    pub fn list_roots(&self) -> Vec<Task> {
        self.read().list_roots().into_iter().cloned().collect()
    }

    pub fn tree(&self) -> Vec<TaskNode> {
        self.read().tree()
    }

    /// Copy of the whole store at one point in time
    pub fn snapshot(&self) -> TaskStore {
        self.read().clone()
    }

    /// Runs `f` with exclusive access, for multi-step edits that must not interleave
    pub fn with_store<R>(&self, f: impl FnOnce(&mut TaskStore) -> R) -> R {
        f(&mut self.write())
    }
}
