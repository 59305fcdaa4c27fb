pub mod check;
pub mod hash;
pub mod hide;
pub mod list;

pub use check::{check_path, resolve_path};
pub use hash::print_hash;
pub use hide::{hide_path, unhide_path};
pub use list::list_whiteouts;

use std::path::Path;
use std::sync::Arc;
use unionfs_cow::config::{load_config, load_config_from, BranchConfig, CowContext};
use unionfs_cow::error::Result;
use unionfs_cow::overlay::WhiteoutManager;

/// Build a manager from the config file, with `--branches` taking precedence.
pub fn open_union(config_path: Option<&Path>, branches: Option<&str>) -> Result<WhiteoutManager> {
    let mut config = match config_path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    if let Some(spec) = branches {
        config.branches = BranchConfig::parse_list(spec)?;
    }

    let ctx = CowContext::from_config(&config)?;
    tracing::debug!(
        "Opened union with {} branches (cow_enabled={})",
        ctx.branches().len(),
        ctx.cow_enabled()
    );
    Ok(WhiteoutManager::new(Arc::new(ctx)))
}

/// `Some(rank)` as a one-element list, otherwise every rank.
fn selected_ranks(manager: &WhiteoutManager, rank: Option<usize>) -> Result<Vec<usize>> {
    match rank {
        Some(rank) => {
            manager.context().branch(rank)?;
            Ok(vec![rank])
        }
        None => Ok((0..manager.context().branches().len()).collect()),
    }
}
