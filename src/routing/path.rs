//! Validated mount paths.

use std::fmt;

use crate::routing::MountError;

const RESERVED_SEGMENT: &str = "resources";

/// A mount path, stored without leading or trailing slashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MountPath(String);

impl MountPath {
    pub fn new(path: &str) -> Result<Self, MountError> {
        if path.is_empty() {
            return Err(MountError::EmptyPath);
        }
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Err(MountError::HomePath);
        }
        let first_segment = trimmed.split('/').next().unwrap_or(trimmed);
        if first_segment == RESERVED_SEGMENT {
            return Err(MountError::ReservedPath(path.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key used in the mount table; folded when mounts are case-insensitive.
    pub fn key(&self, case_sensitive: bool) -> String {
        if case_sensitive {
            self.0.clone()
        } else {
            self.0.to_ascii_lowercase()
        }
    }
}

impl fmt::Display for MountPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slashes_are_trimmed() {
        assert_eq!(MountPath::new("/blog/").unwrap().as_str(), "blog");
        assert_eq!(MountPath::new("a/b").unwrap().to_string(), "/a/b");
    }

    #[test]
    fn test_invalid_paths() {
        assert_eq!(MountPath::new(""), Err(MountError::EmptyPath));
        assert_eq!(MountPath::new("/"), Err(MountError::HomePath));
        assert!(matches!(
            MountPath::new("/resources/css"),
            Err(MountError::ReservedPath(_))
        ));
        assert!(MountPath::new("resourcesx").is_ok());
    }

    #[test]
    fn test_case_folded_key() {
        let path = MountPath::new("Blog").unwrap();
        assert_eq!(path.key(true), "Blog");
        assert_eq!(path.key(false), "blog");
    }
}
