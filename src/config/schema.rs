use crate::error::{CowError, Result};
use crate::overlay::branch::BranchMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchConfig {
    pub path: String,
    #[serde(default)]
    pub mode: BranchMode,
}

impl BranchConfig {
    /// Parse the union-mount branch syntax `dir1=RW:dir2=RO:dir3`.
    ///
    /// A branch without `=MODE` is read-only.
    pub fn parse_list(spec: &str) -> Result<Vec<BranchConfig>> {
        let branches = spec
            .split(':')
            .filter(|part| !part.trim().is_empty())
            .map(|part| {
                let (path, mode) = match part.rsplit_once('=') {
                    Some((path, mode)) => {
                        let mode = mode.parse::<BranchMode>().map_err(CowError::Config)?;
                        (path, mode)
                    }
                    None => (part, BranchMode::Ro),
                };

                if path.trim().is_empty() {
                    return Err(CowError::Config(format!(
                        "Invalid branch '{}': missing directory",
                        part
                    )));
                }

                Ok(BranchConfig {
                    path: path.trim().to_string(),
                    mode,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if branches.is_empty() {
            return Err(CowError::Config(format!(
                "No branches in branch list '{}'",
                spec
            )));
        }

        Ok(branches)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CowConfig {
    #[serde(default = "super::default_cow_enabled")]
    pub cow_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_path_len: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_tag: Option<String>,
    #[serde(default)]
    pub branches: Vec<BranchConfig>,
}

impl Default for CowConfig {
    fn default() -> Self {
        Self {
            cow_enabled: super::default_cow_enabled(),
            max_path_len: None,
            meta_dir: None,
            hide_tag: None,
            branches: Vec::new(),
        }
    }
}

impl CowConfig {
    pub fn get_max_path_len(&self) -> usize {
        self.max_path_len
            .unwrap_or_else(super::default_max_path_len)
    }

    pub fn get_meta_dir(&self) -> String {
        self.meta_dir
            .clone()
            .unwrap_or_else(super::default_meta_dir)
    }

    pub fn get_hide_tag(&self) -> String {
        self.hide_tag
            .clone()
            .unwrap_or_else(super::default_hide_tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CowConfig::default();
        assert!(config.cow_enabled);
        assert_eq!(config.get_meta_dir(), ".unionfs");
        assert_eq!(config.get_hide_tag(), "_HIDDEN~");
        assert_eq!(config.get_max_path_len(), libc::PATH_MAX as usize);
    }

    #[test]
    fn test_parse_toml() {
        let config: CowConfig = toml::from_str(
            r#"
cow_enabled = false
hide_tag = "~gone"

[[branches]]
path = "/srv/rw"
mode = "rw"

[[branches]]
path = "/srv/ro"
"#,
        )
        .unwrap();

        assert!(!config.cow_enabled);
        assert_eq!(config.get_hide_tag(), "~gone");
        assert_eq!(config.get_meta_dir(), ".unionfs");
        assert_eq!(config.branches.len(), 2);
        assert_eq!(config.branches[0].mode, BranchMode::Rw);
        assert_eq!(config.branches[1].mode, BranchMode::Ro);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: CowConfig = toml::from_str("").unwrap();
        assert!(config.cow_enabled);
        assert!(config.branches.is_empty());
    }

    #[test]
    fn test_parse_branch_list() {
        let branches = BranchConfig::parse_list("/srv/rw=RW:/srv/ro=ro:/srv/base").unwrap();
        assert_eq!(
            branches,
            vec![
                BranchConfig {
                    path: "/srv/rw".to_string(),
                    mode: BranchMode::Rw,
                },
                BranchConfig {
                    path: "/srv/ro".to_string(),
                    mode: BranchMode::Ro,
                },
                BranchConfig {
                    path: "/srv/base".to_string(),
                    mode: BranchMode::Ro,
                },
            ]
        );
    }

    #[test]
    fn test_parse_branch_list_errors() {
        assert!(BranchConfig::parse_list("").is_err());
        assert!(BranchConfig::parse_list("=RW").is_err());
        assert!(BranchConfig::parse_list("/srv/rw=XX").is_err());
    }
}
