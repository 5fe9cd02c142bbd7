//! Interactive task shell
//!
//! Reads one command per line and applies it to a single in-memory store.
//!
//! Examples:
//!   add Study
//!   add -p 1 Study Prisma
//!   done 1
//!   indent 3
//!   ls
//!
//! Rejected indent/unindent requests are reported as notes and ignored.
//! Unknown ids and malformed lines are reported as errors and the session
//! carries on; the session fails at the end if any command failed.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use super::output::Output;
use super::render;
use crate::domain::{StoreError, Task, TaskId, TaskNode, TaskStore};

#[derive(Parser)]
#[command(name = "tasktree", no_binary_name = true, disable_help_subcommand = true)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ShellCommand {
    /// Add a task at the end of the roots, or of a parent's children
    Add {
        /// Parent task ID
        #[arg(long, short)]
        parent: Option<TaskId>,

        /// Task text
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Replace a task's text
    Edit {
        /// Task ID
        id: TaskId,

        /// New text
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Mark a task and its subtree as done
    Done {
        /// Task ID
        id: TaskId,
    },

    /// Mark a task as not done
    Undone {
        /// Task ID
        id: TaskId,
    },

    /// Flip a task's done state
    Toggle {
        /// Task ID
        id: TaskId,
    },

    /// Delete a task and its subtree
    #[command(alias = "delete")]
    Rm {
        /// Task ID
        id: TaskId,
    },

    /// Nest a task under its preceding sibling
    Indent {
        /// Task ID
        id: TaskId,
    },

    /// Move a task out of its parent, right after it
    #[command(alias = "outdent")]
    Unindent {
        /// Task ID
        id: TaskId,
    },

    /// Show a task and its subtree
    Show {
        /// Task ID
        id: TaskId,
    },

    /// Show the whole tree
    #[command(alias = "tree")]
    Ls,

    /// Verify the tree structure
    Check,

    /// List commands
    Help,

    /// End the session
    #[command(alias = "exit")]
    Quit,
}

/// Result of one shell command, rendered by [`print_reply`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    Created { task: Task },
    Updated { task: Task },
    Deleted { id: TaskId, removed: usize },
    Subtree { node: TaskNode },
    Tree { roots: Vec<TaskNode> },
    Verified { tasks: usize },
    Notice { message: String },
    Help { text: String },
    Quit,
}

/// Parses one input line; blank lines and `#` comments yield `None`
pub fn parse_line(line: &str) -> std::result::Result<Option<ShellCommand>, clap::Error> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut command = ShellLine::try_parse_from(line.split_whitespace())?.command;

    // Text is the trailing argument; take it from the raw line so spacing survives
    if let ShellCommand::Add { text, .. } | ShellCommand::Edit { text, .. } = &mut command {
        if let Some(raw) = trailing_words(line, text.len()) {
            *text = vec![raw.to_string()];
        }
    }
    Ok(Some(command))
}

/// The last `count` words of `line`, with the spacing between them intact
fn trailing_words(line: &str, count: usize) -> Option<&str> {
    let starts: Vec<usize> = line
        .char_indices()
        .scan(true, |after_space, (i, c)| {
            let starts_word = *after_space && !c.is_whitespace();
            *after_space = c.is_whitespace();
            Some((i, starts_word))
        })
        .filter_map(|(i, starts_word)| starts_word.then_some(i))
        .collect();

    let first = starts.len().checked_sub(count)?;
    starts.get(first).map(|&start| &line[start..])
}

/// Joins text words, rejecting blank input
fn join_text(words: &[String]) -> Result<String> {
    let text = words.join(" ");
    if text.trim().is_empty() {
        bail!("Task text cannot be empty");
    }
    Ok(text)
}

/// A shell session over one store
pub struct Session {
    store: TaskStore,
    failures: usize,
}

impl Session {
    pub fn new(store: TaskStore) -> Self {
        Self { store, failures: 0 }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Number of commands that failed so far
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Applies a command to the store
    pub fn execute(&mut self, command: ShellCommand) -> Result<Reply> {
        debug!("Executing {:?}", command);
        let outcome = self.apply(command);
        if outcome.is_err() {
            self.failures += 1;
        }
        outcome
    }

    fn apply(&mut self, command: ShellCommand) -> Result<Reply> {
        let store = &mut self.store;
        let reply = match command {
            ShellCommand::Add { parent, text } => {
                let text = join_text(&text)?;
                let id = store.create(parent, text)?;
                Reply::Created {
                    task: store.query(id)?.clone(),
                }
            }
            ShellCommand::Edit { id, text } => {
                let text = join_text(&text)?;
                store.set_text(id, text)?;
                updated(store, id)?
            }
            ShellCommand::Done { id } => {
                store.set_completed(id, true)?;
                updated(store, id)?
            }
            ShellCommand::Undone { id } => {
                store.set_completed(id, false)?;
                updated(store, id)?
            }
            ShellCommand::Toggle { id } => {
                store.toggle_completed(id)?;
                updated(store, id)?
            }
            ShellCommand::Rm { id } => {
                let removed = store.delete(id)?;
                Reply::Deleted { id, removed }
            }
            ShellCommand::Indent { id } => match store.indent(id) {
                Err(e) if e.is_invalid_position() => notice(e),
                other => {
                    other?;
                    updated(store, id)?
                }
            },
            ShellCommand::Unindent { id } => match store.unindent(id) {
                Err(e) if e.is_invalid_position() => notice(e),
                other => {
                    other?;
                    updated(store, id)?
                }
            },
            ShellCommand::Show { id } => Reply::Subtree {
                node: store.subtree(id)?,
            },
            ShellCommand::Ls => Reply::Tree {
                roots: store.tree(),
            },
            ShellCommand::Check => {
                store.verify()?;
                Reply::Verified { tasks: store.len() }
            }
            ShellCommand::Help => Reply::Help {
                text: ShellLine::command().render_help().to_string(),
            },
            ShellCommand::Quit => Reply::Quit,
        };
        Ok(reply)
    }
}

fn updated(store: &TaskStore, id: TaskId) -> std::result::Result<Reply, StoreError> {
    Ok(Reply::Updated {
        task: store.query(id)?.clone(),
    })
}

fn notice(err: StoreError) -> Reply {
    Reply::Notice {
        message: err.to_string(),
    }
}

/// Prints a reply in the selected format
pub fn print_reply(output: &Output, reply: &Reply) {
    if output.is_json() {
        output.data(reply);
        return;
    }

    match reply {
        Reply::Created { task } => output.success(&format!("Created {}", render::task_line(task))),
        Reply::Updated { task } => output.success(&render::task_line(task)),
        Reply::Deleted { id, removed } => output.success(&format!(
            "Deleted task #{} ({} task{} removed)",
            id,
            removed,
            if *removed == 1 { "" } else { "s" }
        )),
        Reply::Subtree { node } => output.text(&render::tree(std::slice::from_ref(node))),
        Reply::Tree { roots } if roots.is_empty() => output.success("No tasks"),
        Reply::Tree { roots } => output.text(&render::tree(roots)),
        Reply::Verified { tasks } => {
            output.success(&format!("OK: {} tasks, tree is consistent", tasks))
        }
        Reply::Notice { message } => output.notice(message),
        Reply::Help { text } => output.text(text),
        Reply::Quit => {}
    }
}

/// Runs a session over `input` until end of input or `quit`
pub fn run(store: TaskStore, output: &Output, input: impl BufRead, interactive: bool) -> Result<()> {
    let mut session = Session::new(store);

    prompt(interactive);
    for line in input.lines() {
        let line = line?;
        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(command)) => match session.execute(command) {
                Ok(Reply::Quit) => break,
                Ok(reply) => print_reply(output, &reply),
                Err(e) => output.error(&format!("{:#}", e)),
            },
            Err(e) => {
                session.failures += 1;
                output.error(e.render().to_string().trim_end());
            }
        }
        prompt(interactive);
    }

    if session.failures() > 0 {
        bail!("{} command(s) failed", session.failures());
    }
    Ok(())
}

/// Runs a session on standard input
pub fn run_stdin(store: TaskStore, output: &Output) -> Result<()> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    run(store, output, stdin.lock(), interactive)
}

fn prompt(interactive: bool) {
    if interactive {
        print!("> ");
        let _ = io::stdout().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CascadeMode, IdStrategy, MoveRejection, StoreOptions};

    fn session() -> Session {
        Session::new(TaskStore::with_options(StoreOptions {
            ids: IdStrategy::Sequential,
            cascade: CascadeMode::Symmetric,
        }))
    }

    fn exec(session: &mut Session, line: &str) -> Result<Reply> {
        let command = parse_line(line)
            .unwrap()
            .expect("line should hold a command");
        session.execute(command)
    }

    fn id(value: u64) -> TaskId {
        TaskId::new(value)
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse_line("add -p 4 Study  Prisma").unwrap(),
            Some(ShellCommand::Add {
                parent: Some(id(4)),
                text: vec!["Study  Prisma".into()],
            })
        );
        assert_eq!(
            parse_line("outdent 7").unwrap(),
            Some(ShellCommand::Unindent { id: id(7) })
        );
        assert_eq!(parse_line("tree").unwrap(), Some(ShellCommand::Ls));
    }

    #[test]
    fn skips_blank_lines_and_comments() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# setup").unwrap(), None);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_line("frobnicate 1").is_err());
        assert!(parse_line("done abc").is_err());
        assert!(parse_line("add").is_err());
    }

    #[test]
    fn text_keeps_dashes() {
        assert_eq!(
            parse_line("edit 3 Study - Prisma").unwrap(),
            Some(ShellCommand::Edit {
                id: id(3),
                text: vec!["Study - Prisma".into()],
            })
        );
    }

    #[test]
    fn add_and_edit_keep_inner_spacing() {
        let mut s = session();
        exec(&mut s, "add a  b").unwrap();
        assert_eq!(s.store().query(id(1)).unwrap().text, "a  b");

        exec(&mut s, "edit 1 \tStudy\t\tPrisma  now ").unwrap();
        assert_eq!(s.store().query(id(1)).unwrap().text, "Study\t\tPrisma  now");

        exec(&mut s, "add -p 1  x   y").unwrap();
        assert_eq!(s.store().query(id(2)).unwrap().text, "x   y");
    }

    #[test]
    fn trailing_words_slices_raw_line() {
        assert_eq!(trailing_words("add -p 4 a  b", 2), Some("a  b"));
        assert_eq!(trailing_words("add x", 1), Some("x"));
        assert_eq!(trailing_words("add", 2), None);
    }

    #[test]
    fn add_and_edit() {
        let mut s = session();
        let reply = exec(&mut s, "add Study").unwrap();
        assert!(matches!(reply, Reply::Created { ref task } if task.id == id(1)));

        exec(&mut s, "add -p 1 Study Typescript").unwrap();
        exec(&mut s, "edit 2 Study Rust").unwrap();

        assert_eq!(s.store().query(id(2)).unwrap().text, "Study Rust");
        assert_eq!(s.store().query(id(2)).unwrap().parent_id, Some(id(1)));
    }

    #[test]
    fn done_cascades_through_session() {
        let mut s = session();
        exec(&mut s, "add Study").unwrap();
        exec(&mut s, "add -p 1 Study Prisma").unwrap();

        exec(&mut s, "done 1").unwrap();
        assert!(s.store().query(id(2)).unwrap().completed);

        exec(&mut s, "toggle 1").unwrap();
        assert!(!s.store().query(id(2)).unwrap().completed);
    }

    #[test]
    fn invalid_moves_are_notices_not_failures() {
        let mut s = session();
        exec(&mut s, "add A").unwrap();

        let indent = exec(&mut s, "indent 1").unwrap();
        let expected = StoreError::InvalidPosition {
            id: id(1),
            reason: MoveRejection::NoPrecedingSibling,
        };
        assert_eq!(
            indent,
            Reply::Notice {
                message: expected.to_string()
            }
        );

        assert!(matches!(exec(&mut s, "unindent 1").unwrap(), Reply::Notice { .. }));
        assert_eq!(s.failures(), 0);
    }

    #[test]
    fn unknown_ids_count_as_failures() {
        let mut s = session();
        let err = exec(&mut s, "rm 42").unwrap_err();

        assert!(err.to_string().contains("Task not found: 42"));
        assert!(exec(&mut s, "indent 42").is_err());
        assert_eq!(s.failures(), 2);
    }

    #[test]
    fn run_reports_failures_at_the_end() {
        let input = "add A\nrm 99\nls\n";
        let output = Output::new(crate::storage::OutputFormat::Json);

        let err = run(TaskStore::new(), &output, input.as_bytes(), false).unwrap_err();
        assert!(err.to_string().contains("1 command(s) failed"));
    }

    #[test]
    fn run_stops_at_quit() {
        let input = "add A\nquit\nrm 99\n";
        let output = Output::new(crate::storage::OutputFormat::Json);

        assert!(run(TaskStore::new(), &output, input.as_bytes(), false).is_ok());
    }

    #[test]
    fn check_and_help() {
        let mut s = session();
        exec(&mut s, "add A").unwrap();

        assert_eq!(exec(&mut s, "check").unwrap(), Reply::Verified { tasks: 1 });
        match exec(&mut s, "help").unwrap() {
            Reply::Help { text } => assert!(text.contains("unindent")),
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn reply_serializes_with_kind_tag() {
        let reply = Reply::Deleted {
            id: id(3),
            removed: 2,
        };
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            serde_json::json!({"kind": "deleted", "id": 3, "removed": 2})
        );
    }
}
