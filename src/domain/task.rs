//! Task domain model
//!
//! A task is one item of the hierarchical list. Relationships are expressed
//! as ids only (`parent_id` and `children`), never as embedded references;
//! the [`TaskStore`](super::TaskStore) keeps both directions consistent.

use serde::{Deserialize, Serialize};

use super::id::TaskId;

/// A single item of the task tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Display text
    pub text: String,

    /// Completion flag
    #[serde(default)]
    pub completed: bool,

    /// Parent task, `None` for roots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,

    /// Child ids in display order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TaskId>,
}

impl Task {
    /// Creates a new incomplete task without children
    pub fn new(id: TaskId, text: impl Into<String>, parent_id: Option<TaskId>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            parent_id,
            children: Vec::new(),
        }
    }

    /// Returns true if this task has no parent
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Position of `child` among this task's children
    pub fn child_position(&self, child: TaskId) -> Option<usize> {
        self.children.iter().position(|c| *c == child)
    }

    /// Removes `child` from the children list, keeping sibling order
    pub(crate) fn detach_child(&mut self, child: TaskId) -> Option<usize> {
        let index = self.child_position(child)?;
        self.children.remove(index);
        Some(index)
    }
}

/// Nested snapshot of a task and its resolved subtree, for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskNode {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub children: Vec<TaskNode>,
}

impl TaskNode {
    /// Number of nodes in this subtree, including this one
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TaskNode::size).sum::<usize>()
    }
}
