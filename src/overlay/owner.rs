//! Ownership fix-up for entries this crate creates.

use std::path::Path;

use crate::error::{CowError, Result};

/// The user and group a filesystem request acts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub uid: u32,
    pub gid: u32,
}

impl Identity {
    /// Root user or root group. Entries created for them keep the process owner.
    pub fn is_privileged(&self) -> bool {
        self.uid == 0 || self.gid == 0
    }
}

/// Source of the acting identity for the request being served.
pub trait RequestContext: Send + Sync {
    fn identity(&self) -> Identity;
}

/// Acts as the identity of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessContext;

impl RequestContext for ProcessContext {
    fn identity(&self) -> Identity {
        Identity {
            uid: nix::unistd::getuid().as_raw(),
            gid: nix::unistd::getgid().as_raw(),
        }
    }
}

/// Acts as a fixed identity, e.g. the uid/gid carried by a FUSE request.
#[derive(Debug, Clone, Copy)]
pub struct FixedIdentity(pub Identity);

impl RequestContext for FixedIdentity {
    fn identity(&self) -> Identity {
        self.0
    }
}

/// Give a freshly created entry to the acting identity.
///
/// Does not follow a trailing symlink. Failures are logged and returned as
/// [`CowError::Ownership`]; callers treat them as non-fatal.
pub fn set_owner(path: &Path, requests: &dyn RequestContext) -> Result<()> {
    let identity = requests.identity();
    if identity.is_privileged() {
        return Ok(());
    }

    std::os::unix::fs::lchown(path, Some(identity.uid), Some(identity.gid)).map_err(|e| {
        tracing::warn!(
            "Setting owner {}:{} on {} failed: {}",
            identity.uid,
            identity.gid,
            path.display(),
            e
        );
        CowError::Ownership(format!("{}: {}", path.display(), e))
    })
}
