use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use unionfs_cow::config::{BranchConfig, CowConfig, CowContext};
use unionfs_cow::overlay::{BranchMode, BranchScan, FileKind, WhiteoutManager};

/// Temporary branch directories stacked into one union.
/// #[allow(dead_code)] because not every test file uses every helper.
#[allow(dead_code)]
pub struct TestUnion {
    pub temp_dir: TempDir,
    pub roots: Vec<PathBuf>,
    pub manager: Arc<WhiteoutManager>,
}

#[allow(dead_code)]
impl TestUnion {
    pub fn new(modes: &[BranchMode]) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

        let roots: Vec<PathBuf> = (0..modes.len())
            .map(|i| {
                let root = temp_dir.path().join(format!("branch{}", i));
                fs::create_dir_all(&root).expect("Failed to create branch dir");
                root
            })
            .collect();

        let config = CowConfig {
            branches: roots
                .iter()
                .zip(modes)
                .map(|(root, mode)| BranchConfig {
                    path: root.to_string_lossy().to_string(),
                    mode: *mode,
                })
                .collect(),
            ..CowConfig::default()
        };
        let ctx = CowContext::from_config(&config).expect("Invalid test config");

        Self {
            temp_dir,
            roots,
            manager: Arc::new(WhiteoutManager::new(Arc::new(ctx))),
        }
    }

    /// Branch 0 read-write, branch 1 read-only.
    pub fn rw_over_ro() -> Self {
        Self::new(&[BranchMode::Rw, BranchMode::Ro])
    }

    pub fn write(&self, rank: usize, rel: &str, content: &str) {
        let path = self.roots[rank].join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(path, content).expect("Failed to write file");
    }

    pub fn marker(&self, rank: usize, rel: &str) -> PathBuf {
        self.roots[rank]
            .join(".unionfs")
            .join(format!("{}_HIDDEN~", rel))
    }

    /// Branch that the union view resolves `union_path` to.
    pub fn visible_in(&self, union_path: &str) -> Option<usize> {
        BranchScan::find_branch(self.manager.context(), union_path, 0)
            .expect("lookup failed")
    }

    /// Delete `union_path` the way a dispatch layer would: remove it from the
    /// branch that backs it if that branch is writable, then hide whatever a
    /// lower branch still provides from the top writable branch.
    pub fn union_unlink(&self, union_path: &str) -> io::Result<()> {
        let rank = self
            .visible_in(union_path)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
        let rel = union_path.trim_start_matches('/');

        if self.manager.context().branch(rank).expect("unknown branch").is_writable() {
            fs::remove_file(self.roots[rank].join(rel))?;
        } else {
            eprintln!("branch {} is read-only, leaving {} in place", rank, union_path);
        }

        let rw = self
            .manager
            .context()
            .branches()
            .iter()
            .find(|b| b.is_writable())
            .map(|b| b.rank)
            .ok_or_else(|| io::Error::from_raw_os_error(libc::EROFS))?;

        self.manager
            .maybe_create_whiteout(union_path, rw, FileKind::File)
            .map_err(|e| io::Error::from_raw_os_error(e.errno()))
    }
}
