use unionfs_cow::error::Result;
use unionfs_cow::overlay::WhiteoutManager;

use super::selected_ranks;

pub fn list_whiteouts(manager: &WhiteoutManager, branch: Option<usize>, json: bool) -> Result<i32> {
    let mut entries = Vec::new();
    for rank in selected_ranks(manager, branch)? {
        entries.extend(manager.list_whiteouts(rank)?);
    }

    if json {
        println!("{}", serde_json::to_string(&entries)?);
    } else {
        for entry in &entries {
            println!("{}\t{}\t{}", entry.rank, entry.kind, entry.union_path);
        }
    }
    Ok(0)
}
