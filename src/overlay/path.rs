//! Capacity-checked path construction.
//!
//! Every path this crate hands to the host filesystem is assembled through
//! [`BoundedPath`], whose append operations refuse to grow the buffer past its
//! declared maximum. The limit counts a trailing terminator the same way a
//! `PATH_MAX`-sized C buffer would, so a path of `max_len - 1` bytes is the
//! longest one that fits.

use std::fmt;
use std::path::Path;

use crate::error::{CowError, Result};

pub const SEPARATOR: char = '/';

/// Default whiteout tag appended to hidden names.
pub const DEFAULT_HIDE_TAG: &str = "_HIDDEN~";

/// Default maximum path length, including the terminator slot.
pub const DEFAULT_MAX_PATH_LEN: usize = libc::PATH_MAX as usize;

/// A path buffer that can never exceed `max_len - 1` bytes.
///
/// On a failed append the buffer keeps its previous, valid contents. Callers
/// must still treat the value as unusable once an append has failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedPath {
    buf: String,
    max_len: usize,
}

impl BoundedPath {
    pub fn new(max_len: usize) -> Self {
        BoundedPath {
            buf: String::new(),
            max_len,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.buf)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_string(self) -> String {
        self.buf
    }

    /// Append a path segment, keeping exactly one separator at the join.
    ///
    /// If both the buffer and `segment` carry a separator at the join, one is
    /// dropped; if neither does, one is inserted.
    pub fn push_segment(&mut self, segment: &str) -> Result<()> {
        if segment.is_empty() {
            return Err(CowError::InvalidArgument(
                "empty path segment".to_string(),
            ));
        }

        if self.buf.is_empty() {
            return self.push_raw(segment);
        }

        let ends_with_sep = self.buf.ends_with(SEPARATOR);
        let starts_with_sep = segment.starts_with(SEPARATOR);

        let (rest, insert_sep) = match (ends_with_sep, starts_with_sep) {
            (true, true) => (&segment[1..], false),
            (false, false) => (segment, true),
            _ => (segment, false),
        };

        let new_len = self.buf.len() + usize::from(insert_sep) + rest.len();
        self.check_fits(new_len)?;

        if insert_sep {
            self.buf.push(SEPARATOR);
        }
        self.buf.push_str(rest);
        Ok(())
    }

    /// Append `suffix` verbatim, with no separator handling. Used for tags.
    pub fn push_raw(&mut self, suffix: &str) -> Result<()> {
        self.check_fits(self.buf.len() + suffix.len())?;
        self.buf.push_str(suffix);
        Ok(())
    }

    fn check_fits(&self, new_len: usize) -> Result<()> {
        // +1 for the terminator slot
        if new_len + 1 > self.max_len {
            tracing::warn!(
                "Path too long: {} bytes (limit {}) while extending {:?}",
                new_len,
                self.max_len,
                self.buf
            );
            return Err(CowError::NameTooLong {
                len: new_len,
                max: self.max_len,
            });
        }
        Ok(())
    }
}

impl fmt::Display for BoundedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}

impl AsRef<Path> for BoundedPath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

/// Join `segments` into one path no longer than `max_len - 1` bytes.
///
/// The first segment must be present and non-empty.
pub fn build_path<S: AsRef<str>>(max_len: usize, segments: &[S]) -> Result<BoundedPath> {
    let Some((first, rest)) = segments.split_first() else {
        return Err(CowError::InvalidArgument(
            "no path segment given".to_string(),
        ));
    };

    let mut path = BoundedPath::new(max_len);
    path.push_segment(first.as_ref())?;
    for segment in rest {
        path.push_segment(segment.as_ref())?;
    }

    tracing::trace!("build_path: {}", path);
    Ok(path)
}

/// Parent directory of `path`, or `"."` when it has no separator.
///
/// Returns a freshly owned string, so concurrent callers share nothing.
pub fn dirname(path: &str) -> String {
    match path.rfind(SEPARATOR) {
        Some(pos) => path[..pos].to_string(),
        None => ".".to_string(),
    }
}

/// Offset at which `tag` starts in `name`, if `name` is a whiteout marker name.
///
/// The first occurrence of `tag` must sit at the very end of `name` and must
/// not be all of it.
pub fn whiteout_tag(name: &str, tag: &str) -> Option<usize> {
    if tag.is_empty() {
        return None;
    }
    match name.find(tag) {
        Some(pos) if pos > 0 && name.len() - pos == tag.len() => Some(pos),
        _ => None,
    }
}

/// The hidden entry's name for a marker name, e.g. `foo` for `foo_HIDDEN~`.
pub fn strip_whiteout_tag<'a>(name: &'a str, tag: &str) -> Option<&'a str> {
    whiteout_tag(name, tag).map(|pos| &name[..pos])
}

/// Non-empty components of a union path, root-most first.
pub fn components(union_path: &str) -> impl Iterator<Item = &str> {
    union_path.split(SEPARATOR).filter(|c| !c.is_empty())
}
