//! Parent/child graph for integrity checks
//!
//! Builds a petgraph view of the parent -> child edges of a task set and
//! validates the tree invariants against it.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use super::id::TaskId;
use super::task::Task;

#[derive(Debug, Error, PartialEq)]
pub enum IntegrityError {
    #[error("Duplicate task ID: {0}")]
    DuplicateId(TaskId),

    #[error("Task {parent} lists unknown child {child}")]
    DanglingChild { parent: TaskId, child: TaskId },

    #[error("Task {child} points at unknown parent {parent}")]
    DanglingParent { child: TaskId, parent: TaskId },

    #[error("Task {child} is listed under {listed_under} but its parent is {parent:?}")]
    ParentMismatch {
        child: TaskId,
        listed_under: TaskId,
        parent: Option<TaskId>,
    },

    #[error("Task {0} appears more than once in children lists")]
    DuplicateChild(TaskId),

    #[error("Task {child} has parent {parent} but is missing from its children")]
    MissingFromParent { child: TaskId, parent: TaskId },

    #[error("Parent links form a cycle")]
    Cycle,

    #[error("Root order is inconsistent at task {0}")]
    RootOrder(TaskId),
}

/// A directed parent -> child graph of tasks
#[derive(Debug, Default)]
pub struct TaskGraph {
    /// The underlying directed graph
    graph: DiGraph<TaskId, ()>,

    /// Map from TaskId to node index
    node_map: HashMap<TaskId, NodeIndex>,
}

impl TaskGraph {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Builds the graph from a collection of tasks, checking references on the way
    pub fn from_tasks<'a>(
        tasks: impl IntoIterator<Item = &'a Task>,
    ) -> Result<Self, IntegrityError> {
        let mut graph = Self::new();

        // First pass: add all nodes
        let tasks: Vec<_> = tasks.into_iter().collect();
        for task in &tasks {
            if !graph.add_task(task.id) {
                return Err(IntegrityError::DuplicateId(task.id));
            }
        }

        let by_id: HashMap<TaskId, &Task> = tasks.iter().map(|t| (t.id, *t)).collect();
        let mut listed = HashSet::new();

        // Second pass: children lists must point back at their parent
        for task in &tasks {
            for child_id in &task.children {
                let child = by_id.get(child_id).ok_or(IntegrityError::DanglingChild {
                    parent: task.id,
                    child: *child_id,
                })?;
                if child.parent_id != Some(task.id) {
                    return Err(IntegrityError::ParentMismatch {
                        child: *child_id,
                        listed_under: task.id,
                        parent: child.parent_id,
                    });
                }
                if !listed.insert(*child_id) {
                    return Err(IntegrityError::DuplicateChild(*child_id));
                }
                graph.add_edge(task.id, *child_id);
            }
        }

        // Third pass: parent links must be mirrored by a children entry
        for task in &tasks {
            if let Some(parent) = task.parent_id {
                if !by_id.contains_key(&parent) {
                    return Err(IntegrityError::DanglingParent {
                        child: task.id,
                        parent,
                    });
                }
                if !listed.contains(&task.id) {
                    return Err(IntegrityError::MissingFromParent {
                        child: task.id,
                        parent,
                    });
                }
            }
        }

        Ok(graph)
    }

    /// Adds a node, returns false if it was already present
    fn add_task(&mut self, task_id: TaskId) -> bool {
        if self.node_map.contains_key(&task_id) {
            return false;
        }
        let idx = self.graph.add_node(task_id);
        self.node_map.insert(task_id, idx);
        true
    }

    fn add_edge(&mut self, parent: TaskId, child: TaskId) {
        if let (Some(p), Some(c)) = (self.node_map.get(&parent), self.node_map.get(&child)) {
            self.graph.add_edge(*p, *c, ());
        }
    }

    /// Returns true if the parent links contain a cycle
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Fails with [`IntegrityError::Cycle`] if the graph is not a forest
    pub fn ensure_acyclic(&self) -> Result<(), IntegrityError> {
        if self.has_cycle() {
            Err(IntegrityError::Cycle)
        } else {
            Ok(())
        }
    }
}

/// Checks that `tasks` form a consistent forest with the given root ordering
pub fn check_tree<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    root_order: &[TaskId],
) -> Result<(), IntegrityError> {
    let tasks: Vec<&Task> = tasks.into_iter().collect();
    let graph = TaskGraph::from_tasks(tasks.iter().copied())?;
    graph.ensure_acyclic()?;

    let roots: HashSet<TaskId> = tasks.iter().filter(|t| t.is_root()).map(|t| t.id).collect();
    let mut seen = HashSet::new();
    for id in root_order {
        if !roots.contains(id) || !seen.insert(*id) {
            return Err(IntegrityError::RootOrder(*id));
        }
    }
    if let Some(missing) = roots.iter().find(|id| !seen.contains(id)) {
        return Err(IntegrityError::RootOrder(*missing));
    }

    Ok(())
}
