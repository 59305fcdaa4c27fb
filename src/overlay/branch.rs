use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::CowContext;
use crate::error::Result;
use crate::overlay::path::build_path;
use crate::overlay::whiteout::path_hidden;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BranchMode {
    Rw,
    #[default]
    Ro,
}

impl std::fmt::Display for BranchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BranchMode::Rw => write!(f, "rw"),
            BranchMode::Ro => write!(f, "ro"),
        }
    }
}

impl std::str::FromStr for BranchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rw" => Ok(BranchMode::Rw),
            "ro" => Ok(BranchMode::Ro),
            _ => Err(format!(
                "Invalid branch mode '{}'. Must be one of: rw, ro",
                s
            )),
        }
    }
}

/// One directory tree in the union. Lower `rank` means higher priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub rank: usize,
    pub root: String,
    pub mode: BranchMode,
}

impl Branch {
    pub fn path_len(&self) -> usize {
        self.root.len()
    }

    pub fn is_writable(&self) -> bool {
        self.mode == BranchMode::Rw
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Dir,
}

impl FileKind {
    /// Classify the entry at `path` without following a trailing symlink.
    ///
    /// Returns `None` when nothing exists there.
    pub fn probe(path: &Path) -> Option<FileKind> {
        match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => Some(FileKind::Dir),
            Ok(_) => Some(FileKind::File),
            Err(_) => None,
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::File => write!(f, "file"),
            FileKind::Dir => write!(f, "dir"),
        }
    }
}

/// Answers "which branch still backs this path?" for the whiteout manager.
pub trait BranchLookup: Send + Sync {
    /// Highest-priority branch ranked strictly below `rank` that still has an
    /// entry at `union_path`.
    fn find_branch_below(
        &self,
        ctx: &CowContext,
        union_path: &str,
        rank: usize,
    ) -> Result<Option<usize>>;
}

/// Default lookup: stat the path in each branch, in rank order.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchScan;

impl BranchScan {
    /// First branch at or after rank `from` that has `union_path`.
    ///
    /// The scan stops as soon as the path is hidden in a branch, since a
    /// marker there hides the entry in every lower branch too.
    pub fn find_branch(ctx: &CowContext, union_path: &str, from: usize) -> Result<Option<usize>> {
        for branch in ctx.branches().iter().skip(from) {
            let path = build_path(ctx.max_path_len(), &[branch.root.as_str(), union_path])?;

            if FileKind::probe(path.as_path()).is_some() {
                tracing::trace!("find_branch: {} found in branch {}", union_path, branch.rank);
                return Ok(Some(branch.rank));
            }

            if path_hidden(ctx, union_path, branch.rank) {
                tracing::trace!("find_branch: {} hidden in branch {}", union_path, branch.rank);
                return Ok(None);
            }
        }

        Ok(None)
    }
}

impl BranchLookup for BranchScan {
    fn find_branch_below(
        &self,
        ctx: &CowContext,
        union_path: &str,
        rank: usize,
    ) -> Result<Option<usize>> {
        BranchScan::find_branch(ctx, union_path, rank + 1)
    }
}
