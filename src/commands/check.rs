use unionfs_cow::error::Result;
use unionfs_cow::overlay::{build_path, BranchScan, WhiteoutManager};

use super::selected_ranks;

pub fn check_path(manager: &WhiteoutManager, path: &str, branch: Option<usize>) -> Result<i32> {
    for rank in selected_ranks(manager, branch)? {
        let mode = manager.context().branch(rank)?.mode;
        let status = if manager.is_hidden(path, rank) {
            "hidden"
        } else {
            "visible"
        };
        println!("{}\t{}\t{}", rank, mode, status);
    }
    Ok(0)
}

/// Exit code 1 when no branch provides the path.
pub fn resolve_path(manager: &WhiteoutManager, path: &str) -> Result<i32> {
    let ctx = manager.context();
    match BranchScan::find_branch(ctx, path, 0)? {
        Some(rank) => {
            let branch = ctx.branch(rank)?;
            let full = build_path(ctx.max_path_len(), &[branch.root.as_str(), path])?;
            println!("{}\t{}\t{}", rank, branch.mode, full);
            Ok(0)
        }
        None => {
            eprintln!("{}: not present in the union", path);
            Ok(1)
        }
    }
}
