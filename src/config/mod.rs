pub mod context;
pub mod paths;
pub mod persistence;
pub mod schema;

pub use context::*;
pub use paths::*;
pub use persistence::*;
pub use schema::*;

use crate::overlay::path::{DEFAULT_HIDE_TAG, DEFAULT_MAX_PATH_LEN};

fn default_cow_enabled() -> bool {
    true
}

fn default_max_path_len() -> usize {
    DEFAULT_MAX_PATH_LEN
}

fn default_meta_dir() -> String {
    ".unionfs".to_string()
}

fn default_hide_tag() -> String {
    DEFAULT_HIDE_TAG.to_string()
}
