//! In-memory task tree
//!
//! [`TaskStore`] owns every [`Task`] in an id -> task arena plus an explicit
//! root ordering. Each public operation validates first and mutates second,
//! so a failed call leaves the store exactly as it was.
//!
//! ## Invariants
//!
//! After every operation:
//! 1. following `parent_id` from any task reaches a root (no cycles)
//! 2. every id in a `children` list exists and points back at that parent
//! 3. an id appears in at most one `children` list, at most once
//! 4. `root_order` holds exactly the parentless tasks, each once
//!
//! [`TaskStore::verify`] checks all four.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use super::graph::{check_tree, IntegrityError};
use super::id::{IdAllocator, IdError, IdStrategy, TaskId};
use super::task::{Task, TaskNode};

/// Why a structural move was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveRejection {
    #[error("it has no preceding sibling")]
    NoPrecedingSibling,

    #[error("it is already a root")]
    AlreadyRoot,

    #[error("task {0} is inside its own subtree")]
    WouldCycle(TaskId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("Cannot move task {id}: {reason}")]
    InvalidPosition { id: TaskId, reason: MoveRejection },

    #[error(transparent)]
    Ids(#[from] IdError),
}

impl StoreError {
    /// Returns true for rejected indent/unindent requests
    pub fn is_invalid_position(&self) -> bool {
        matches!(self, StoreError::InvalidPosition { .. })
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Which completion changes flow down to descendants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeMode {
    /// Completing and un-completing both apply to the whole subtree
    #[default]
    Symmetric,
    /// Only completing applies to the subtree
    CompleteOnly,
}

impl CascadeMode {
    pub fn as_str(&self) -> &str {
        match self {
            CascadeMode::Symmetric => "symmetric",
            CascadeMode::CompleteOnly => "complete_only",
        }
    }

    fn applies_to(&self, value: bool) -> bool {
        match self {
            CascadeMode::Symmetric => true,
            CascadeMode::CompleteOnly => value,
        }
    }
}

/// Construction options for a [`TaskStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreOptions {
    pub ids: IdStrategy,
    pub cascade: CascadeMode,
}

/// Owner of the whole task tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStore {
    tasks: HashMap<TaskId, Task>,
    root_order: Vec<TaskId>,
    ids: IdAllocator,
    cascade: CascadeMode,
}

impl TaskStore {
    /// Creates an empty store with timestamp ids and symmetric cascade
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    /// Creates an empty store
    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            tasks: HashMap::new(),
            root_order: Vec::new(),
            ids: IdAllocator::new(options.ids),
            cascade: options.cascade,
        }
    }

    /// Builds a store from a seed list
    ///
    /// Roots keep the order in which they appear in `tasks`. The list must
    /// already satisfy the tree invariants; nothing is repaired.
    pub fn from_tasks(
        tasks: impl IntoIterator<Item = Task>,
        options: StoreOptions,
    ) -> std::result::Result<Self, IntegrityError> {
        let tasks: Vec<Task> = tasks.into_iter().collect();
        let root_order: Vec<TaskId> = tasks.iter().filter(|t| t.is_root()).map(|t| t.id).collect();

        check_tree(&tasks, &root_order)?;

        let mut store = Self::with_options(options);
        for task in tasks {
            store.ids.observe(task.id);
            store.tasks.insert(task.id, task);
        }
        store.root_order = root_order;

        debug!(
            "Seeded store with {} tasks ({} roots)",
            store.tasks.len(),
            store.root_order.len()
        );
        Ok(store)
    }

    /// Returns the cascade mode in effect
    pub fn cascade_mode(&self) -> CascadeMode {
        self.cascade
    }

    /// Returns the number of tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if the store holds no tasks
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns true if `id` exists
    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Looks up a task
    pub fn query(&self, id: TaskId) -> Result<&Task> {
        self.tasks.get(&id).ok_or(StoreError::NotFound(id))
    }

    /// Root tasks in display order
    pub fn list_roots(&self) -> Vec<&Task> {
        self.root_order
            .iter()
            .filter_map(|id| self.tasks.get(id))
            .collect()
    }

    /// Root ids in display order
    pub fn root_ids(&self) -> &[TaskId] {
        &self.root_order
    }

    /// Direct children of `id` in display order
    pub fn children(&self, id: TaskId) -> Result<Vec<&Task>> {
        let task = self.query(id)?;
        Ok(task
            .children
            .iter()
            .filter_map(|child| self.tasks.get(child))
            .collect())
    }

    /// Nested snapshot of the whole tree
    pub fn tree(&self) -> Vec<TaskNode> {
        self.root_order.iter().filter_map(|id| self.node(*id)).collect()
    }

    /// Nested snapshot of the subtree rooted at `id`
    pub fn subtree(&self, id: TaskId) -> Result<TaskNode> {
        self.node(id).ok_or(StoreError::NotFound(id))
    }

    fn node(&self, id: TaskId) -> Option<TaskNode> {
        let task = self.tasks.get(&id)?;
        Some(TaskNode {
            id: task.id,
            text: task.text.clone(),
            completed: task.completed,
            children: task.children.iter().filter_map(|c| self.node(*c)).collect(),
        })
    }

    /// Depth-first walk in display order, yielding `(depth, task)`
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            store: self,
            stack: self.root_order.iter().rev().map(|id| (0, *id)).collect(),
        }
    }

    /// Ids of `id` and all its descendants, parents before children
    fn subtree_ids(&self, id: TaskId) -> Vec<TaskId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(task) = self.tasks.get(&current) {
                stack.extend(task.children.iter().rev().copied());
            }
        }
        out
    }

    /// Returns true if `ancestor` is `id` itself or one of its ancestors
    fn is_ancestor_or_self(&self, ancestor: TaskId, id: TaskId) -> bool {
        let mut current = Some(id);
        // A valid tree never needs more steps than it has tasks
        for _ in 0..=self.tasks.len() {
            match current {
                Some(c) if c == ancestor => return true,
                Some(c) => current = self.tasks.get(&c).and_then(|t| t.parent_id),
                None => return false,
            }
        }
        false
    }

    /// Checks every structural invariant
    pub fn verify(&self) -> std::result::Result<(), IntegrityError> {
        check_tree(self.tasks.values(), &self.root_order)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a task at the end of `parent`'s children, or at the end of the roots
    pub fn create(&mut self, parent: Option<TaskId>, text: impl Into<String>) -> Result<TaskId> {
        if let Some(parent_id) = parent {
            if !self.tasks.contains_key(&parent_id) {
                return Err(StoreError::NotFound(parent_id));
            }
        }

        let id = self.ids.next_id()?;
        let task = Task::new(id, text, parent);
        trace!("Task data: {:?}", task);

        match parent.and_then(|p| self.tasks.get_mut(&p)) {
            Some(parent_task) => parent_task.children.push(id),
            None => self.root_order.push(id),
        }
        self.tasks.insert(id, task);

        debug!("Created task {} under {:?}", id, parent);
        Ok(id)
    }

    /// Replaces a task's text
    pub fn set_text(&mut self, id: TaskId, text: impl Into<String>) -> Result<()> {
        let task = self.tasks.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        task.text = text.into();
        debug!("Updated text of task {}", id);
        Ok(())
    }

    /// Sets the completion flag, cascading to descendants per [`CascadeMode`]
    pub fn set_completed(&mut self, id: TaskId, value: bool) -> Result<()> {
        if !self.tasks.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }

        let targets = if self.cascade.applies_to(value) {
            self.subtree_ids(id)
        } else {
            vec![id]
        };

        for target in &targets {
            if let Some(task) = self.tasks.get_mut(target) {
                task.completed = value;
            }
        }

        debug!(
            "Set completed={} on task {} ({} tasks affected)",
            value,
            id,
            targets.len()
        );
        Ok(())
    }

    /// Inverts the completion flag and returns the new value
    pub fn toggle_completed(&mut self, id: TaskId) -> Result<bool> {
        let value = !self.query(id)?.completed;
        self.set_completed(id, value)?;
        Ok(value)
    }

    /// Removes a task and its whole subtree, returning how many tasks were removed
    pub fn delete(&mut self, id: TaskId) -> Result<usize> {
        let parent = self.query(id)?.parent_id;
        let doomed = self.subtree_ids(id);

        match parent.and_then(|p| self.tasks.get_mut(&p)) {
            Some(parent_task) => {
                parent_task.detach_child(id);
            }
            None => self.root_order.retain(|r| *r != id),
        }
        for task_id in &doomed {
            self.tasks.remove(task_id);
        }

        debug!("Deleted task {} and {} descendants", id, doomed.len() - 1);
        Ok(doomed.len())
    }

    /// Moves a task under its preceding sibling, as that sibling's last child
    pub fn indent(&mut self, id: TaskId) -> Result<()> {
        let parent = self.query(id)?.parent_id;
        let siblings = match parent {
            Some(p) => &self.query(p)?.children,
            None => &self.root_order,
        };

        let position = siblings
            .iter()
            .position(|s| *s == id)
            .ok_or(StoreError::NotFound(id))?;
        if position == 0 {
            return Err(StoreError::InvalidPosition {
                id,
                reason: MoveRejection::NoPrecedingSibling,
            });
        }
        let new_parent = siblings[position - 1];
        self.ensure_not_within(id, new_parent)?;

        match parent.and_then(|p| self.tasks.get_mut(&p)) {
            Some(parent_task) => {
                parent_task.children.remove(position);
            }
            None => {
                self.root_order.remove(position);
            }
        }
        if let Some(target) = self.tasks.get_mut(&new_parent) {
            target.children.push(id);
        }
        if let Some(task) = self.tasks.get_mut(&id) {
            task.parent_id = Some(new_parent);
        }

        debug!("Indented task {} under {}", id, new_parent);
        Ok(())
    }

    /// Moves a task out of its parent, placing it right after that parent
    pub fn unindent(&mut self, id: TaskId) -> Result<()> {
        let parent = self.query(id)?.parent_id.ok_or(StoreError::InvalidPosition {
            id,
            reason: MoveRejection::AlreadyRoot,
        })?;
        let grandparent = self.query(parent)?.parent_id;
        if let Some(target) = grandparent {
            self.ensure_not_within(id, target)?;
        }

        let anchor = match grandparent {
            Some(g) => self.query(g)?.child_position(parent),
            None => self.root_order.iter().position(|r| *r == parent),
        }
        .ok_or(StoreError::NotFound(parent))?;

        if let Some(parent_task) = self.tasks.get_mut(&parent) {
            parent_task.detach_child(id);
        }
        match grandparent.and_then(|g| self.tasks.get_mut(&g)) {
            Some(target) => target.children.insert(anchor + 1, id),
            None => self.root_order.insert(anchor + 1, id),
        }
        if let Some(task) = self.tasks.get_mut(&id) {
            task.parent_id = grandparent;
        }

        debug!("Unindented task {} to follow {}", id, parent);
        Ok(())
    }

    /// Rejects moving `id` under `target` when `target` sits inside `id`'s subtree
    fn ensure_not_within(&self, id: TaskId, target: TaskId) -> Result<()> {
        if self.is_ancestor_or_self(id, target) {
            return Err(StoreError::InvalidPosition {
                id,
                reason: MoveRejection::WouldCycle(target),
            });
        }
        Ok(())
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-first iterator over a [`TaskStore`], see [`TaskStore::walk`]
pub struct Walk<'a> {
    store: &'a TaskStore,
    stack: Vec<(usize, TaskId)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Task);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((depth, id)) = self.stack.pop() {
            if let Some(task) = self.store.tasks.get(&id) {
                self.stack
                    .extend(task.children.iter().rev().map(|c| (depth + 1, *c)));
                return Some((depth, task));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential() -> TaskStore {
        TaskStore::with_options(StoreOptions {
            ids: IdStrategy::Sequential,
            cascade: CascadeMode::Symmetric,
        })
    }

    fn root_ids(store: &TaskStore) -> Vec<TaskId> {
        store.list_roots().iter().map(|t| t.id).collect()
    }

    fn missing() -> TaskId {
        TaskId::new(999)
    }

    #[test]
    fn create_then_query_round_trip() {
        let mut store = sequential();
        let parent = store.create(None, "Study").unwrap();
        let id = store.create(Some(parent), "x").unwrap();

        let task = store.query(id).unwrap();
        assert_eq!(task.text, "x");
        assert!(!task.completed);
        assert!(task.children.is_empty());
        assert_eq!(task.parent_id, Some(parent));
        assert_eq!(store.query(parent).unwrap().children, vec![id]);
        assert!(store.verify().is_ok());
    }

    #[test]
    fn create_appends_children_and_roots() {
        let mut store = sequential();
        let a = store.create(None, "A").unwrap();
        let b = store.create(None, "B").unwrap();
        let a1 = store.create(Some(a), "A1").unwrap();
        let a2 = store.create(Some(a), "A2").unwrap();

        assert_eq!(root_ids(&store), vec![a, b]);
        assert_eq!(store.query(a).unwrap().children, vec![a1, a2]);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn create_under_missing_parent_is_no_op() {
        let mut store = sequential();
        store.create(None, "A").unwrap();
        let before = store.clone();

        assert_eq!(
            store.create(Some(missing()), "orphan"),
            Err(StoreError::NotFound(missing()))
        );
        assert_eq!(store, before);

        // No id was consumed by the failed call
        assert_eq!(store.create(None, "B").unwrap(), TaskId::new(2));
    }

    #[test]
    fn set_text_replaces_even_when_completed() {
        let mut store = sequential();
        let a = store.create(None, "A").unwrap();
        store.set_completed(a, true).unwrap();
        store.set_text(a, "renamed").unwrap();

        let task = store.query(a).unwrap();
        assert_eq!(task.text, "renamed");
        assert!(task.completed);
    }

    #[test]
    fn completing_parent_cascades_to_subtree() {
        let mut store = sequential();
        let r = store.create(None, "R").unwrap();
        let a = store.create(Some(r), "A").unwrap();
        let b = store.create(Some(r), "B").unwrap();
        let a1 = store.create(Some(a), "A1").unwrap();
        let other = store.create(None, "Other").unwrap();

        store.set_completed(r, true).unwrap();

        for id in [r, a, b, a1] {
            assert!(store.query(id).unwrap().completed, "task {} not completed", id);
        }
        assert!(!store.query(other).unwrap().completed);
    }

    #[test]
    fn uncompleting_cascades_in_symmetric_mode() {
        let mut store = sequential();
        let r = store.create(None, "R").unwrap();
        let a = store.create(Some(r), "A").unwrap();
        store.set_completed(r, true).unwrap();

        store.set_completed(r, false).unwrap();

        assert!(!store.query(r).unwrap().completed);
        assert!(!store.query(a).unwrap().completed);
    }

    #[test]
    fn uncompleting_stays_local_in_complete_only_mode() {
        let mut store = TaskStore::with_options(StoreOptions {
            ids: IdStrategy::Sequential,
            cascade: CascadeMode::CompleteOnly,
        });
        assert_eq!(store.cascade_mode(), CascadeMode::CompleteOnly);
        let r = store.create(None, "R").unwrap();
        let a = store.create(Some(r), "A").unwrap();
        store.set_completed(r, true).unwrap();
        assert!(store.query(a).unwrap().completed);

        store.set_completed(r, false).unwrap();

        assert!(!store.query(r).unwrap().completed);
        assert!(store.query(a).unwrap().completed);
    }

    #[test]
    fn completing_children_does_not_complete_parent() {
        let mut store = sequential();
        let r = store.create(None, "R").unwrap();
        let a = store.create(Some(r), "A").unwrap();
        let b = store.create(Some(r), "B").unwrap();

        store.set_completed(a, true).unwrap();
        store.set_completed(b, true).unwrap();

        assert!(!store.query(r).unwrap().completed);
    }

    #[test]
    fn toggle_inverts_and_cascades() {
        let mut store = sequential();
        let r = store.create(None, "R").unwrap();
        let a = store.create(Some(r), "A").unwrap();

        assert_eq!(store.toggle_completed(r), Ok(true));
        assert!(store.query(a).unwrap().completed);

        assert_eq!(store.toggle_completed(r), Ok(false));
        assert!(!store.query(a).unwrap().completed);
    }

    #[test]
    fn delete_removes_subtree() {
        let mut store = sequential();
        let r = store.create(None, "R").unwrap();
        let a = store.create(Some(r), "A").unwrap();
        let a1 = store.create(Some(a), "A1").unwrap();

        assert_eq!(store.delete(a), Ok(2));

        assert!(store.query(r).unwrap().children.is_empty());
        assert_eq!(store.query(a), Err(StoreError::NotFound(a)));
        assert_eq!(store.query(a1), Err(StoreError::NotFound(a1)));
        assert!(store.verify().is_ok());
    }

    #[test]
    fn delete_keeps_sibling_order() {
        let mut store = sequential();
        let r = store.create(None, "R").unwrap();
        let a = store.create(Some(r), "A").unwrap();
        let b = store.create(Some(r), "B").unwrap();
        let c = store.create(Some(r), "C").unwrap();

        store.delete(b).unwrap();

        assert_eq!(store.query(r).unwrap().children, vec![a, c]);
    }

    #[test]
    fn delete_root_updates_root_order() {
        let mut store = sequential();
        let a = store.create(None, "A").unwrap();
        let b = store.create(None, "B").unwrap();
        let c = store.create(None, "C").unwrap();
        store.create(Some(b), "B1").unwrap();

        assert_eq!(store.delete(b), Ok(2));

        assert_eq!(root_ids(&store), vec![a, c]);
        assert_eq!(store.len(), 2);
        assert!(store.verify().is_ok());
    }

    #[test]
    fn indent_first_root_is_invalid() {
        let mut store = sequential();
        let a = store.create(None, "A").unwrap();
        store.create(None, "B").unwrap();
        let before = store.clone();

        let err = store.indent(a).unwrap_err();
        assert_eq!(
            err,
            StoreError::InvalidPosition {
                id: a,
                reason: MoveRejection::NoPrecedingSibling
            }
        );
        assert!(err.is_invalid_position());
        assert_eq!(store, before);
    }

    #[test]
    fn indent_root_under_preceding_sibling() {
        let mut store = sequential();
        let s = store.create(None, "S").unwrap();
        let existing = store.create(Some(s), "S1").unwrap();
        let t = store.create(None, "T").unwrap();
        let after = store.create(None, "U").unwrap();

        store.indent(t).unwrap();

        assert_eq!(store.query(t).unwrap().parent_id, Some(s));
        assert_eq!(store.query(s).unwrap().children, vec![existing, t]);
        assert_eq!(root_ids(&store), vec![s, after]);
        assert!(store.verify().is_ok());
    }

    #[test]
    fn indent_child_under_preceding_sibling_keeps_subtree() {
        let mut store = sequential();
        let r = store.create(None, "R").unwrap();
        let a = store.create(Some(r), "A").unwrap();
        let b = store.create(Some(r), "B").unwrap();
        let b1 = store.create(Some(b), "B1").unwrap();

        store.indent(b).unwrap();

        assert_eq!(store.query(r).unwrap().children, vec![a]);
        assert_eq!(store.query(a).unwrap().children, vec![b]);
        assert_eq!(store.query(b).unwrap().children, vec![b1]);
        assert_eq!(store.query(b1).unwrap().parent_id, Some(b));
        assert!(store.verify().is_ok());
    }

    #[test]
    fn indent_first_child_is_invalid() {
        let mut store = sequential();
        let r = store.create(None, "R").unwrap();
        let a = store.create(Some(r), "A").unwrap();

        assert!(store.indent(a).unwrap_err().is_invalid_position());
        assert_eq!(store.query(a).unwrap().parent_id, Some(r));
    }

    #[test]
    fn unindent_root_is_invalid() {
        let mut store = sequential();
        let a = store.create(None, "A").unwrap();
        let before = store.clone();

        assert_eq!(
            store.unindent(a),
            Err(StoreError::InvalidPosition {
                id: a,
                reason: MoveRejection::AlreadyRoot
            })
        );
        assert_eq!(store, before);
    }

    #[test]
    fn indent_then_unindent_restores_two_roots() {
        let mut store = sequential();
        let p = store.create(None, "P").unwrap();
        let c = store.create(None, "C").unwrap();

        store.indent(c).unwrap();
        assert_eq!(store.query(c).unwrap().parent_id, Some(p));
        assert_eq!(root_ids(&store), vec![p]);

        store.unindent(c).unwrap();
        assert_eq!(store.query(c).unwrap().parent_id, None);
        assert_eq!(root_ids(&store), vec![p, c]);
        assert!(store.query(p).unwrap().children.is_empty());
    }

    #[test]
    fn unindent_to_root_lands_right_after_former_parent() {
        let mut store = sequential();
        let a = store.create(None, "A").unwrap();
        let b = store.create(None, "B").unwrap();
        let c = store.create(None, "C").unwrap();
        let b1 = store.create(Some(b), "B1").unwrap();
        let b2 = store.create(Some(b), "B2").unwrap();

        store.unindent(b1).unwrap();

        assert_eq!(root_ids(&store), vec![a, b, b1, c]);
        assert_eq!(store.query(b).unwrap().children, vec![b2]);
        assert!(store.verify().is_ok());
    }

    #[test]
    fn unindent_nested_lands_right_after_former_parent() {
        let mut store = sequential();
        let r = store.create(None, "R").unwrap();
        let a = store.create(Some(r), "A").unwrap();
        let b = store.create(Some(r), "B").unwrap();
        let a1 = store.create(Some(a), "A1").unwrap();
        let a1x = store.create(Some(a1), "A1x").unwrap();

        store.unindent(a1).unwrap();

        assert_eq!(store.query(r).unwrap().children, vec![a, a1, b]);
        assert_eq!(store.query(a1).unwrap().parent_id, Some(r));
        assert_eq!(store.query(a1).unwrap().children, vec![a1x]);
        assert!(store.query(a).unwrap().children.is_empty());
        assert!(store.verify().is_ok());
    }

    #[test]
    fn missing_ids_report_not_found_without_changes() {
        let mut store = sequential();
        let r = store.create(None, "R").unwrap();
        store.create(Some(r), "A").unwrap();
        let before = store.clone();
        let id = missing();
        let not_found = StoreError::NotFound(id);

        assert_eq!(store.set_text(id, "x"), Err(not_found.clone()));
        assert_eq!(store.set_completed(id, true), Err(not_found.clone()));
        assert_eq!(store.toggle_completed(id), Err(not_found.clone()));
        assert_eq!(store.delete(id), Err(not_found.clone()));
        assert_eq!(store.indent(id), Err(not_found.clone()));
        assert_eq!(store.unindent(id), Err(not_found.clone()));
        assert_eq!(store.query(id), Err(not_found.clone()));
        assert_eq!(store.children(id), Err(not_found.clone()));
        assert_eq!(store.subtree(id), Err(not_found));

        assert_eq!(store, before);
    }

    #[test]
    fn walk_visits_in_display_order() {
        let mut store = sequential();
        let a = store.create(None, "A").unwrap();
        let b = store.create(None, "B").unwrap();
        let a1 = store.create(Some(a), "A1").unwrap();
        let a1x = store.create(Some(a1), "A1x").unwrap();
        let a2 = store.create(Some(a), "A2").unwrap();

        let visited: Vec<_> = store.walk().map(|(depth, t)| (depth, t.id)).collect();
        assert_eq!(visited, vec![(0, a), (1, a1), (2, a1x), (1, a2), (0, b)]);
    }

    #[test]
    fn tree_resolves_nested_children() {
        let mut store = sequential();
        let a = store.create(None, "A").unwrap();
        let a1 = store.create(Some(a), "A1").unwrap();
        store.create(None, "B").unwrap();

        let tree = store.tree();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, a);
        assert_eq!(tree[0].children[0].id, a1);
        assert_eq!(tree[0].size(), 2);
        assert_eq!(store.subtree(a).unwrap(), tree[0]);
    }

    #[test]
    fn from_tasks_keeps_seed_order_and_skips_seeded_ids() {
        let mut study = Task::new(TaskId::new(20), "Study", None);
        study.children = vec![TaskId::new(21)];
        let seed = vec![
            Task::new(TaskId::new(10), "Refactor Code", None),
            study,
            Task::new(TaskId::new(21), "Study Typescript", Some(TaskId::new(20))),
        ];

        let mut store = TaskStore::from_tasks(
            seed,
            StoreOptions {
                ids: IdStrategy::Sequential,
                cascade: CascadeMode::Symmetric,
            },
        )
        .unwrap();

        assert_eq!(root_ids(&store), vec![TaskId::new(10), TaskId::new(20)]);
        assert_eq!(store.create(None, "new").unwrap(), TaskId::new(22));
    }

    #[test]
    fn from_tasks_rejects_broken_seed() {
        let seed = vec![Task::new(TaskId::new(1), "orphan", Some(TaskId::new(2)))];
        assert!(TaskStore::from_tasks(seed, StoreOptions::default()).is_err());
    }

    #[test]
    fn timestamp_store_ids_are_unique() {
        let mut store = TaskStore::new();
        let ids: Vec<_> = (0..50)
            .map(|i| store.create(None, format!("t{}", i)).unwrap())
            .collect();

        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(store.list_roots().len(), 50);
    }

    #[test]
    fn create_after_max_seeded_id_fails_without_changes() {
        let max = TaskId::new(u64::MAX);
        let mut store = TaskStore::from_tasks(
            vec![Task::new(max, "seeded", None)],
            StoreOptions {
                ids: IdStrategy::Sequential,
                cascade: CascadeMode::Symmetric,
            },
        )
        .unwrap();
        let before = store.clone();

        let err = store.create(None, "new").unwrap_err();

        assert_eq!(err, StoreError::Ids(IdError::Exhausted(max)));
        assert!(!err.is_invalid_position());
        assert_eq!(store, before);
        assert_eq!(store.query(max).unwrap().text, "seeded");
        assert!(store.verify().is_ok());
    }
}
