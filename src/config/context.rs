use crate::config::paths::expand_tilde;
use crate::config::schema::CowConfig;
use crate::error::{CowError, Result};
use crate::overlay::branch::Branch;
use crate::overlay::path::{whiteout_tag, SEPARATOR};

/// Validated, read-only view of the union shared by every operation.
///
/// Built once from a [`CowConfig`] and passed explicitly (usually behind an
/// `Arc`) instead of living in process-wide state.
#[derive(Debug, Clone)]
pub struct CowContext {
    branches: Vec<Branch>,
    cow_enabled: bool,
    max_path_len: usize,
    meta_dir: String,
    hide_tag: String,
}

impl CowContext {
    pub fn from_config(config: &CowConfig) -> Result<Self> {
        let max_path_len = config.get_max_path_len();
        let meta_dir = config.get_meta_dir();
        let hide_tag = config.get_hide_tag();

        if max_path_len == 0 {
            return Err(CowError::Config(
                "max_path_len must be greater than zero".to_string(),
            ));
        }
        validate_name("meta_dir", &meta_dir)?;
        validate_name("hide_tag", &hide_tag)?;

        if config.branches.is_empty() {
            return Err(CowError::Config("No branches configured".to_string()));
        }

        let branches = config
            .branches
            .iter()
            .enumerate()
            .map(|(rank, branch)| {
                let root = expand_tilde(&branch.path).to_string_lossy().to_string();
                if root.is_empty() {
                    return Err(CowError::Config(format!("Branch {} has an empty path", rank)));
                }
                if root.len() + 1 > max_path_len {
                    return Err(CowError::Config(format!(
                        "Branch {} path '{}' exceeds max_path_len {}",
                        rank, root, max_path_len
                    )));
                }
                Ok(Branch {
                    rank,
                    root,
                    mode: branch.mode,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CowContext {
            branches,
            cow_enabled: config.cow_enabled,
            max_path_len,
            meta_dir,
            hide_tag,
        })
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn branch(&self, rank: usize) -> Result<&Branch> {
        self.branches.get(rank).ok_or_else(|| {
            CowError::InvalidArgument(format!(
                "branch {} does not exist ({} configured)",
                rank,
                self.branches.len()
            ))
        })
    }

    pub fn cow_enabled(&self) -> bool {
        self.cow_enabled
    }

    pub fn max_path_len(&self) -> usize {
        self.max_path_len
    }

    pub fn meta_dir(&self) -> &str {
        &self.meta_dir
    }

    pub fn hide_tag(&self) -> &str {
        &self.hide_tag
    }

    /// [`whiteout_tag`] with this union's tag.
    pub fn whiteout_tag(&self, name: &str) -> Option<usize> {
        whiteout_tag(name, &self.hide_tag)
    }
}

fn validate_name(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(CowError::Config(format!("{} must not be empty", field)));
    }
    if value.contains(SEPARATOR) {
        return Err(CowError::Config(format!(
            "{} '{}' must not contain '{}'",
            field, value, SEPARATOR
        )));
    }
    Ok(())
}
