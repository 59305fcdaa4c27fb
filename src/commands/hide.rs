use unionfs_cow::error::Result;
use unionfs_cow::overlay::{FileKind, WhiteoutManager};

pub fn hide_path(manager: &WhiteoutManager, path: &str, branch: usize, dir: bool) -> Result<i32> {
    let kind = if dir { FileKind::Dir } else { FileKind::File };
    manager.create_whiteout(path, branch, kind)?;
    println!("Hid {} in branch {} ({} marker)", path, branch, kind);
    Ok(0)
}

pub fn unhide_path(manager: &WhiteoutManager, path: &str, max_branch: Option<usize>) -> Result<i32> {
    let report = manager.remove_whiteouts(path, max_branch)?;

    for rank in &report.removed {
        println!("Removed whiteout for {} in branch {}", path, rank);
    }
    for failure in &report.failures {
        eprintln!(
            "Warning: could not remove {} in branch {}: {}",
            failure.path, failure.rank, failure.error
        );
    }
    if report.removed.is_empty() && report.is_clean() {
        println!("No whiteouts for {}", path);
    }
    Ok(0)
}
