//! Copy-on-write whiteout core of the union.

pub mod branch;
pub mod hash;
pub mod owner;
pub mod path;
pub mod whiteout;

pub use branch::{Branch, BranchLookup, BranchMode, BranchScan, FileKind};
pub use hash::string_hash;
pub use owner::{set_owner, FixedIdentity, Identity, ProcessContext, RequestContext};
pub use path::{build_path, dirname, strip_whiteout_tag, whiteout_tag, BoundedPath};
pub use whiteout::{CleanupFailure, CleanupReport, WhiteoutEntry, WhiteoutManager};
