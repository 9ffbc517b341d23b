//! Point-in-time snapshots of the host process table.
//!
//! A [`ProcessTree`] is rebuilt wholesale on every poll cycle and is never
//! mutated afterwards. Snapshot failures degrade to an empty tree so status
//! classification keeps working (it just loses process-based signals).

use std::collections::HashMap;
use std::process::Command;

use serde::{Deserialize, Serialize};
use sysinfo::System;
use tracing::{debug, trace, warn};

use crate::error::{ParseError, ParseResult};

/// Operating-system process identifier.
pub type Pid = u32;

// ============================================================================
// Process Node
// ============================================================================

/// One row of the process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessNode {
    pub pid: Pid,
    /// Parent pid, absent for roots.
    pub ppid: Option<Pid>,
    /// Command name as reported by the host (may carry a path prefix on macOS).
    pub comm: String,
    /// Full argument string, space-joined.
    pub args: String,
}

impl ProcessNode {
    /// Parses a `pid ppid comm args...` row as printed by `ps -eo pid,ppid,comm,args`.
    pub fn parse_ps_row(line: &str) -> ParseResult<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let (pid, ppid, comm) = match fields.as_slice() {
            [pid, ppid, comm, ..] => (*pid, *ppid, *comm),
            _ => {
                return Err(ParseError::FieldCount {
                    expected: 3,
                    found: fields.len(),
                })
            }
        };

        let pid = pid.parse().map_err(|e| ParseError::invalid("pid", e))?;
        let ppid = ppid.parse().map_err(|e| ParseError::invalid("ppid", e))?;

        Ok(Self {
            pid,
            ppid: Some(ppid),
            comm: comm.to_string(),
            args: fields.get(3..).map(|rest| rest.join(" ")).unwrap_or_default(),
        })
    }
}

// ============================================================================
// Process Tree
// ============================================================================

/// Read-only index over a process snapshot.
#[derive(Debug, Clone, Default)]
pub struct ProcessTree {
    children: HashMap<Pid, Vec<Pid>>,
    comm: HashMap<Pid, String>,
    args: HashMap<Pid, String>,
}

impl ProcessTree {
    /// Builds the index from a full set of nodes.
    pub fn from_nodes(nodes: impl IntoIterator<Item = ProcessNode>) -> Self {
        let mut tree = Self::default();
        for node in nodes {
            if let Some(ppid) = node.ppid {
                tree.children.entry(ppid).or_default().push(node.pid);
            }
            if !node.args.is_empty() {
                tree.args.insert(node.pid, node.args);
            }
            tree.comm.insert(node.pid, node.comm);
        }
        tree
    }

    /// Builds the index from raw `ps -eo pid,ppid,comm,args` output.
    ///
    /// The header line and any other malformed rows are skipped.
    pub fn parse_ps_output(output: &str) -> Self {
        let nodes = output.lines().filter_map(|line| match ProcessNode::parse_ps_row(line) {
            Ok(node) => Some(node),
            Err(e) => {
                trace!(line, error = %e, "Skipping process row");
                None
            }
        });
        Self::from_nodes(nodes)
    }

    /// Direct children of `pid`, in enumeration order.
    pub fn children(&self, pid: Pid) -> &[Pid] {
        self.children.get(&pid).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Command name of `pid`.
    pub fn comm(&self, pid: Pid) -> Option<&str> {
        self.comm.get(&pid).map(String::as_str)
    }

    /// Full argument string of `pid`.
    pub fn args(&self, pid: Pid) -> Option<&str> {
        self.args.get(&pid).map(String::as_str)
    }

    /// Number of processes in the snapshot.
    pub fn len(&self) -> usize {
        self.comm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comm.is_empty()
    }

    /// Returns true if any grandchild of `pid` runs a command called `name`.
    ///
    /// Matches both bare names and path-qualified ones (`/usr/bin/caffeinate`).
    pub fn has_grandchild(&self, pid: Pid, name: &str) -> bool {
        self.children(pid).iter().any(|&child| {
            self.children(child).iter().any(|&grandchild| {
                self.comm(grandchild)
                    .is_some_and(|comm| comm == name || comm.strip_suffix(name).is_some_and(|p| p.ends_with('/')))
            })
        })
    }
}

// ============================================================================
// Snapshot Sources
// ============================================================================

/// Anything that can produce a process snapshot.
///
/// Implementations must not fail; an unreadable process table is an empty tree.
pub trait ProcessSnapshot: Send + Sync {
    fn snapshot(&self) -> ProcessTree;
}

/// A fixed tree, returned as-is on every call.
impl ProcessSnapshot for ProcessTree {
    fn snapshot(&self) -> ProcessTree {
        self.clone()
    }
}

impl ProcessSnapshot for ProcessSource {
    fn snapshot(&self) -> ProcessTree {
        ProcessSource::snapshot(*self)
    }
}

/// Where process snapshots come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessSource {
    /// In-process enumeration via `sysinfo`.
    #[default]
    Sysinfo,
    /// A single `ps -eo pid,ppid,comm,args` call.
    Ps,
}

impl ProcessSource {
    /// Takes a full snapshot of the host process table.
    ///
    /// Never fails: enumeration errors produce an empty tree.
    /// This performs blocking I/O and should be called via `spawn_blocking`.
    pub fn snapshot(self) -> ProcessTree {
        let tree = match self {
            Self::Sysinfo => snapshot_sysinfo(),
            Self::Ps => snapshot_ps(),
        };
        debug!(source = ?self, processes = tree.len(), "Process snapshot taken");
        tree
    }
}

fn snapshot_sysinfo() -> ProcessTree {
    let system = System::new_all();

    let nodes = system
        .processes()
        .values()
        // Linux tasks show up as processes; only real processes matter here
        .filter(|process| process.thread_kind().is_none())
        .map(|process| ProcessNode {
            pid: process.pid().as_u32(),
            ppid: process.parent().map(|p| p.as_u32()),
            comm: process.name().to_string_lossy().into_owned(),
            args: process
                .cmd()
                .iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" "),
        });

    ProcessTree::from_nodes(nodes)
}

fn snapshot_ps() -> ProcessTree {
    let output = match Command::new("ps").args(["-eo", "pid,ppid,comm,args"]).output() {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            warn!(status = %output.status, "ps exited unsuccessfully");
            return ProcessTree::default();
        }
        Err(e) => {
            warn!(error = %e, "Failed to run ps");
            return ProcessTree::default();
        }
    };

    ProcessTree::parse_ps_output(&String::from_utf8_lossy(&output.stdout))
}
