//! Grouping of panes into workspaces by working directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::pane::Pane;
use crate::status::PaneStatus;

/// Number of hash characters shown for a detached HEAD.
const DETACHED_HASH_LEN: usize = 8;

/// Panes sharing one working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Full working directory
    pub path: String,
    /// Display name (last path segment, or `~`-collapsed path)
    pub short_path: String,
    /// Checked-out branch, or abbreviated hash when detached
    pub branch: Option<String>,
    /// Panes in discovery order
    pub panes: Vec<Pane>,
}

impl Workspace {
    /// Number of panes in this workspace with the given status.
    pub fn count(&self, status: PaneStatus) -> usize {
        self.panes.iter().filter(|p| p.status == status).count()
    }
}

/// Groups panes by working directory, reading branches from disk.
///
/// Workspaces are sorted by full path; panes keep their input order.
pub fn group_panes(panes: Vec<Pane>, home: Option<&Path>) -> Vec<Workspace> {
    group_panes_with(panes, home, |path| git_branch(Path::new(path)))
}

/// Same as [`group_panes`] with a caller-supplied branch lookup.
pub fn group_panes_with<F>(panes: Vec<Pane>, home: Option<&Path>, branch_of: F) -> Vec<Workspace>
where
    F: Fn(&str) -> Option<String>,
{
    let mut groups: BTreeMap<String, Vec<Pane>> = BTreeMap::new();
    for pane in panes {
        groups.entry(pane.path.clone()).or_default().push(pane);
    }

    groups
        .into_iter()
        .map(|(path, panes)| Workspace {
            short_path: short_path(&path, home),
            branch: branch_of(&path),
            path,
            panes,
        })
        .collect()
}

/// Returns the display name for a workspace path.
///
/// The last segment of the path, unless that is degenerate (empty, `.`, `/`),
/// in which case the whole path is shown with `home` collapsed to `~`.
pub fn short_path(path: &str, home: Option<&Path>) -> String {
    let trimmed = path.trim_end_matches('/');
    let base = trimmed.rsplit('/').next().unwrap_or(trimmed);
    if !base.is_empty() && base != "." {
        return base.to_string();
    }

    collapse_home(path, home)
}

fn collapse_home(path: &str, home: Option<&Path>) -> String {
    let Some(home) = home.and_then(Path::to_str).filter(|h| !h.is_empty()) else {
        return path.to_string();
    };

    match path.strip_prefix(home) {
        Some("") => "~".to_string(),
        Some(rest) if rest.starts_with('/') => format!("~{rest}"),
        _ => path.to_string(),
    }
}

// ============================================================================
// Git Branch
// ============================================================================

/// Reads the branch checked out in `dir` straight from `.git/HEAD`.
///
/// Follows `gitdir:` indirection used by worktrees and submodules. Returns
/// `None` when `dir` is not a repository root or HEAD cannot be read.
pub fn git_branch(dir: &Path) -> Option<String> {
    let git = dir.join(".git");
    let git_dir = if git.is_file() {
        resolve_gitdir_file(dir, &git)?
    } else {
        git
    };

    match fs::read_to_string(git_dir.join("HEAD")) {
        Ok(head) => parse_head(&head),
        Err(e) => {
            trace!(dir = %dir.display(), error = %e, "No readable git HEAD");
            None
        }
    }
}

fn resolve_gitdir_file(dir: &Path, git_file: &Path) -> Option<PathBuf> {
    let content = fs::read_to_string(git_file).ok()?;
    let target = content.trim().strip_prefix("gitdir:")?.trim();
    if target.is_empty() {
        return None;
    }

    let target = Path::new(target);
    Some(if target.is_absolute() {
        target.to_path_buf()
    } else {
        dir.join(target)
    })
}

/// Interprets the contents of a HEAD file.
pub fn parse_head(head: &str) -> Option<String> {
    let head = head.trim();
    if head.is_empty() {
        return None;
    }

    if let Some(reference) = head.strip_prefix("ref:") {
        let reference = reference.trim();
        let branch = reference.strip_prefix("refs/heads/").unwrap_or(reference);
        return (!branch.is_empty()).then(|| branch.to_string());
    }

    Some(head.chars().take(DETACHED_HASH_LEN).collect())
}
