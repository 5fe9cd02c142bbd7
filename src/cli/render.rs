//! Plain-text rendering of task trees

use crate::domain::{Task, TaskNode};

const INDENT: &str = "    ";

fn checkbox(completed: bool) -> &'static str {
    if completed {
        "[x]"
    } else {
        "[ ]"
    }
}

/// One line for a single task, without indentation
pub fn task_line(task: &Task) -> String {
    format!("{} {}  #{}", checkbox(task.completed), task.text, task.id)
}

/// Renders nodes and their children, one task per line
pub fn tree(nodes: &[TaskNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        push_node(&mut out, node, 0);
    }
    out
}

fn push_node(out: &mut String, node: &TaskNode, depth: usize) {
    out.push_str(&INDENT.repeat(depth));
    out.push_str(&format!(
        "{} {}  #{}\n",
        checkbox(node.completed),
        node.text,
        node.id
    ));
    for child in &node.children {
        push_node(out, child, depth + 1);
    }
}
