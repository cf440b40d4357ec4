//! Mount path matching.
//!
//! # Responsibilities
//! - Decide whether a request path belongs to a mount path
//! - Return the part of the request path below the mount
//!
//! # Design Decisions
//! - A match requires a segment boundary: `mount/pointXXX` never matches
//!   `mount/point`
//! - Case-insensitive matching folds ASCII only, so the result does not depend
//!   on the process locale
//! - No allocation on the match path

/// Prefix matcher with a segment-boundary check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathMatcher {
    case_sensitive: bool,
}

impl Default for PathMatcher {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PathMatcher {
    pub fn new(case_sensitive: bool) -> Self {
        Self { case_sensitive }
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// True when `request_path` is `mount_path` or lies below it.
    pub fn matches(&self, request_path: &str, mount_path: &str) -> bool {
        self.remainder(request_path, mount_path).is_some()
    }

    /// The part of `request_path` after `mount_path`: empty or starting with `/`.
    pub fn remainder<'a>(&self, request_path: &'a str, mount_path: &str) -> Option<&'a str> {
        let rest = self.strip_prefix(request_path, mount_path)?;
        (rest.is_empty() || rest.starts_with('/')).then_some(rest)
    }

    /// Strip `mount_path` without the boundary check.
    pub fn strip_prefix<'a>(&self, request_path: &'a str, mount_path: &str) -> Option<&'a str> {
        let head = request_path.get(..mount_path.len())?;
        let equal = if self.case_sensitive {
            head == mount_path
        } else {
            head.eq_ignore_ascii_case(mount_path)
        };
        equal.then(|| &request_path[mount_path.len()..])
    }
}
