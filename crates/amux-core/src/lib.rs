//! amux Core - agent discovery and status classification
//!
//! This crate holds the domain types and pure algorithms behind the
//! dashboard: process snapshots, agent detectors, pane status
//! classification, workspace grouping, activity history and cursor
//! navigation. It does no terminal or tmux I/O of its own.
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, `todo!()`, or direct indexing `[i]`.

pub mod detector;
pub mod error;
pub mod history;
pub mod navigation;
pub mod pane;
pub mod process;
pub mod status;
pub mod workspace;

// Re-exports for convenience
pub use detector::{AgentKind, BusyPredicate, Detector, DetectorRegistry};
pub use error::{ParseError, ParseResult};
pub use history::{ActivityHistory, ActivityMap};
pub use navigation::{NavItem, NavKind};
pub use pane::{Pane, Target};
pub use process::{Pid, ProcessNode, ProcessSnapshot, ProcessSource, ProcessTree};
pub use status::{classify, needs_attention, recent_lines, PaneStatus, ATTENTION_PATTERNS};
pub use workspace::{group_panes, Workspace};
