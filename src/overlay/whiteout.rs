//! Whiteout handling for the copy-on-write union.
//!
//! A whiteout is a marker recording that an entry was deleted from the union
//! view while its data still lives in a lower, possibly read-only, branch.
//! Markers never touch the lower branch. They live in a shadow "metadata
//! tree" under `<branch>/<meta_dir>/`, which mirrors the branch's own
//! directory layout, and are named `<name><tag>`:
//!
//! ```text
//! /srv/rw/.unionfs/docs/note.txt_HIDDEN~   hides /docs/note.txt
//! /srv/rw/.unionfs/build_HIDDEN~/          hides /build and everything below
//! ```
//!
//! A marker hides its path in its own branch and in every lower-ranked one,
//! and a marker on a directory hides everything nested under it.

use serde::Serialize;
use std::fs::{self, DirBuilder, OpenOptions};
use std::io;
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};
use std::path::Path;
use std::sync::Arc;
use walkdir::WalkDir;

use crate::config::CowContext;
use crate::error::{CowError, Result};
use crate::overlay::branch::{Branch, BranchLookup, BranchScan, FileKind};
use crate::overlay::owner::{self, ProcessContext, RequestContext};
use crate::overlay::path::{build_path, components, strip_whiteout_tag, BoundedPath, SEPARATOR};

const META_DIR_MODE: u32 = 0o755;
const FILE_MARKER_MODE: u32 = 0o600;
const DIR_MARKER_MODE: u32 = 0o700;

/// Validated components of `union_path`, root-most first.
///
/// Empty components are dropped, so `/build/` and `//build` name the same
/// entry. `.` and `..` are rejected: a marker must stay inside the branch's
/// metadata tree.
fn union_components(union_path: &str) -> Result<Vec<&str>> {
    let parts: Vec<&str> = components(union_path).collect();
    if parts.is_empty() {
        return Err(CowError::InvalidArgument(format!(
            "'{}' names the union root, which cannot be hidden",
            union_path
        )));
    }
    if let Some(bad) = parts.iter().find(|c| **c == "." || **c == "..") {
        return Err(CowError::InvalidArgument(format!(
            "'{}' contains a '{}' component",
            union_path, bad
        )));
    }
    Ok(parts)
}

/// `<root>/<meta_dir>` of branch `rank`.
fn meta_root(ctx: &CowContext, rank: usize) -> Result<BoundedPath> {
    let branch = ctx.branch(rank)?;
    build_path(ctx.max_path_len(), &[branch.root.as_str(), ctx.meta_dir()])
}

/// `dir` with the whiteout tag appended to its last component.
fn tagged(ctx: &CowContext, dir: &BoundedPath) -> Result<BoundedPath> {
    let mut marker = dir.clone();
    marker.push_raw(ctx.hide_tag())?;
    Ok(marker)
}

/// Path of the marker that hides `union_path` in branch `rank`.
pub fn marker_path(ctx: &CowContext, union_path: &str, rank: usize) -> Result<BoundedPath> {
    let parts = union_components(union_path)?;
    let mut path = meta_root(ctx, rank)?;
    for component in parts {
        path.push_segment(component)?;
    }
    tagged(ctx, &path)
}

/// Whether `union_path`, or any directory above it, is whited out in branch `rank`.
///
/// Always `false` when COW is disabled, and for paths that cannot name a
/// marker at all (the root, `.`/`..` components).
pub fn path_hidden(ctx: &CowContext, union_path: &str, rank: usize) -> bool {
    if !ctx.cow_enabled() {
        return false;
    }

    let rendered = union_components(union_path)
        .and_then(|parts| meta_root(ctx, rank).map(|root| (parts, root)));
    let (parts, mut prefix) = match rendered {
        Ok(rendered) => rendered,
        Err(e) => {
            tracing::debug!("path_hidden: {} in branch {}: {}", union_path, rank, e);
            return false;
        }
    };

    for component in parts {
        let marker = match prefix
            .push_segment(component)
            .and_then(|()| tagged(ctx, &prefix))
        {
            Ok(marker) => marker,
            // no marker can exist past the path limit, nor below such a prefix
            Err(e) => {
                tracing::debug!("path_hidden: {} in branch {}: {}", union_path, rank, e);
                return false;
            }
        };

        let exists = FileKind::probe(marker.as_path()).is_some();
        tracing::trace!("path_hidden: {} exists={}", marker, exists);
        if exists {
            tracing::debug!("{} is hidden in branch {} by {}", union_path, rank, marker);
            return true;
        }
    }

    false
}

/// A marker found in a branch's metadata tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhiteoutEntry {
    pub rank: usize,
    pub union_path: String,
    pub kind: FileKind,
}

/// A marker that could not be removed during cleanup.
#[derive(Debug)]
pub struct CleanupFailure {
    pub rank: usize,
    pub path: String,
    pub error: io::Error,
}

/// Outcome of [`WhiteoutManager::remove_whiteouts`].
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Ranks whose marker was deleted.
    pub removed: Vec<usize>,
    pub failures: Vec<CleanupFailure>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Creates, checks, and removes whiteout markers.
///
/// Holds no mutable state, so one manager can serve any number of threads.
/// Concurrent operations on the same path rely on the host filesystem's own
/// atomicity for entry creation.
pub struct WhiteoutManager {
    ctx: Arc<CowContext>,
    lookup: Box<dyn BranchLookup>,
    requests: Box<dyn RequestContext>,
}

impl WhiteoutManager {
    /// Manager that scans branches on disk and acts as the running process.
    pub fn new(ctx: Arc<CowContext>) -> Self {
        Self::with_collaborators(ctx, BranchScan, ProcessContext)
    }

    pub fn with_collaborators(
        ctx: Arc<CowContext>,
        lookup: impl BranchLookup + 'static,
        requests: impl RequestContext + 'static,
    ) -> Self {
        WhiteoutManager {
            ctx,
            lookup: Box::new(lookup),
            requests: Box::new(requests),
        }
    }

    pub fn context(&self) -> &CowContext {
        &self.ctx
    }

    pub fn marker_path(&self, union_path: &str, rank: usize) -> Result<BoundedPath> {
        marker_path(&self.ctx, union_path, rank)
    }

    /// See [`path_hidden`].
    pub fn is_hidden(&self, union_path: &str, rank: usize) -> bool {
        path_hidden(&self.ctx, union_path, rank)
    }

    /// Create a marker of `kind` hiding `union_path` in branch `rank`.
    ///
    /// Missing metadata directories on the way are created. An existing
    /// marker of the same kind counts as success.
    pub fn create_whiteout(&self, union_path: &str, rank: usize, kind: FileKind) -> Result<()> {
        tracing::debug!("create_whiteout: {} in branch {} ({})", union_path, rank, kind);

        let branch = self.ctx.branch(rank)?;
        let marker = self.marker_path(union_path, rank)?;
        self.create_meta_dirs(branch, union_path)?;

        let created = match kind {
            FileKind::File => OpenOptions::new()
                .write(true)
                .create(true)
                .mode(FILE_MARKER_MODE)
                .open(marker.as_path())
                .map(drop),
            FileKind::Dir => match DirBuilder::new().mode(DIR_MARKER_MODE).create(marker.as_path()) {
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if FileKind::probe(marker.as_path()) == Some(FileKind::Dir) {
                        Ok(())
                    } else {
                        Err(e)
                    }
                }
                other => other,
            },
        };

        if let Err(e) = created {
            tracing::error!("Creating whiteout {} failed: {}", marker, e);
            return Err(CowError::Io(e));
        }

        self.fix_owner(marker.as_path());
        Ok(())
    }

    pub fn hide_file(&self, union_path: &str, rank: usize) -> Result<()> {
        self.create_whiteout(union_path, rank, FileKind::File)
    }

    pub fn hide_dir(&self, union_path: &str, rank: usize) -> Result<()> {
        self.create_whiteout(union_path, rank, FileKind::Dir)
    }

    /// Called after a real unlink/rmdir in branch `rank` succeeded or was
    /// refused: hide `union_path` only if a lower branch still provides it.
    pub fn maybe_create_whiteout(
        &self,
        union_path: &str,
        rank: usize,
        kind: FileKind,
    ) -> Result<()> {
        match self.lookup.find_branch_below(&self.ctx, union_path, rank)? {
            Some(lower) => {
                tracing::debug!(
                    "maybe_create_whiteout: {} still present in branch {}",
                    union_path,
                    lower
                );
                self.create_whiteout(union_path, rank, kind)
            }
            None => {
                tracing::debug!(
                    "maybe_create_whiteout: {} not present below branch {}, nothing to hide",
                    union_path,
                    rank
                );
                Ok(())
            }
        }
    }

    /// Best-effort removal of the markers for `union_path` in branches
    /// `0..=max_branch` (all branches when `None`).
    ///
    /// Per-branch deletion failures are logged and collected in the report,
    /// never returned as an error. Only path construction errors abort.
    pub fn remove_whiteouts(
        &self,
        union_path: &str,
        max_branch: Option<usize>,
    ) -> Result<CleanupReport> {
        let mut report = CleanupReport::default();
        if !self.ctx.cow_enabled() {
            return Ok(report);
        }

        let count = self.ctx.branches().len();
        let last = max_branch.map_or(count, |max| max.saturating_add(1).min(count));

        for rank in 0..last {
            let marker = self.marker_path(union_path, rank)?;

            let removed = match FileKind::probe(marker.as_path()) {
                Some(FileKind::File) => fs::remove_file(marker.as_path()),
                Some(FileKind::Dir) => fs::remove_dir(marker.as_path()),
                None => continue,
            };

            match removed {
                Ok(()) => {
                    tracing::debug!("Removed whiteout {}", marker);
                    report.removed.push(rank);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!("Failed to remove whiteout {}: {}", marker, e);
                    report.failures.push(CleanupFailure {
                        rank,
                        path: marker.into_string(),
                        error: e,
                    });
                }
            }
        }

        Ok(report)
    }

    /// Every marker in branch `rank`'s metadata tree, sorted by union path.
    pub fn list_whiteouts(&self, rank: usize) -> Result<Vec<WhiteoutEntry>> {
        let root = meta_root(&self.ctx, rank)?;

        if FileKind::probe(root.as_path()) != Some(FileKind::Dir) {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(root.as_path())
            .min_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| CowError::Io(e.into()))?;
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            let Some(hidden) = strip_whiteout_tag(name, self.ctx.hide_tag()) else {
                continue;
            };

            let Ok(relative) = entry.path().strip_prefix(root.as_path()) else {
                continue;
            };
            let parent = relative.parent().unwrap_or_else(|| Path::new(""));
            let mut union_path = String::new();
            for component in parent.iter() {
                union_path.push(SEPARATOR);
                union_path.push_str(&component.to_string_lossy());
            }
            union_path.push(SEPARATOR);
            union_path.push_str(hidden);

            let kind = if entry.file_type().is_dir() {
                FileKind::Dir
            } else {
                FileKind::File
            };

            entries.push(WhiteoutEntry {
                rank,
                union_path,
                kind,
            });
        }

        Ok(entries)
    }

    /// Ownership fix-up for an entry this manager just created.
    pub fn set_owner(&self, path: &Path) -> Result<()> {
        owner::set_owner(path, self.requests.as_ref())
    }

    fn fix_owner(&self, path: &Path) {
        if let Err(e) = self.set_owner(path) {
            tracing::warn!("Ignoring ownership failure: {}", e);
        }
    }

    /// Mirror the ancestors of `union_path` inside the branch's metadata tree.
    fn create_meta_dirs(&self, branch: &Branch, union_path: &str) -> Result<()> {
        let parts = union_components(union_path)?;
        let ancestors = &parts[..parts.len() - 1];

        let mut dir = meta_root(&self.ctx, branch.rank)?;
        self.ensure_dir(&dir)?;

        for component in ancestors {
            dir.push_segment(component)?;
            self.ensure_dir(&dir)?;
        }

        Ok(())
    }

    fn ensure_dir(&self, dir: &BoundedPath) -> Result<()> {
        match DirBuilder::new().mode(META_DIR_MODE).create(dir.as_path()) {
            Ok(()) => {
                tracing::debug!("Created metadata directory {}", dir);
                self.fix_owner(dir.as_path());
                Ok(())
            }
            // another request may have created it first
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                if FileKind::probe(dir.as_path()) == Some(FileKind::Dir) {
                    Ok(())
                } else {
                    tracing::error!("Metadata path {} exists but is not a directory", dir);
                    Err(CowError::Io(e))
                }
            }
            Err(e) => {
                tracing::error!("Creating metadata directory {} failed: {}", dir, e);
                Err(CowError::Io(e))
            }
        }
    }
}
