pub mod config;
pub mod error;
pub mod overlay;

pub use config::load_config;
pub use config::load_config_from;
pub use config::BranchConfig;
pub use config::CowConfig;
pub use config::CowContext;

pub use error::{CowError, Result};

pub use overlay::{
    build_path, dirname, string_hash, whiteout_tag, BoundedPath, Branch, BranchMode, FileKind,
    WhiteoutManager,
};
