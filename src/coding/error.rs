//! URL coding errors.

use thiserror::Error;

/// How the hosting application should treat a coding failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed URL sent by a client. Respond with a 404-class outcome.
    ClientInput,
    /// A listener callback addressed a page that is no longer stored.
    PageExpired,
    /// Bug in the embedding application (bad configuration or wrong target type).
    Programmer,
}

impl ErrorKind {
    /// Label used in metrics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ClientInput => "client_error",
            ErrorKind::PageExpired => "page_expired",
            ErrorKind::Programmer => "programmer_error",
        }
    }
}

/// Errors raised while decoding or encoding URLs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodingError {
    /// Named parameters must come in `/key/value` pairs.
    #[error("odd number of path segments in `{fragment}`")]
    OddSegmentCount { fragment: String },

    /// More path segments than declared parameter names (strict mixed mounts).
    #[error("too many path segments: {found} found, {declared} declared")]
    TooManySegments { found: usize, declared: usize },

    /// The `ui:interface` token could not be parsed.
    #[error("malformed interface parameter `{value}`: {reason}")]
    MalformedInterfaceParameter { value: String, reason: &'static str },

    /// The URL names a page that is not mounted under this path.
    #[error("no page `{0}` under this mount")]
    UnknownPage(String),

    /// A listener callback addressed a page that is no longer stored.
    #[error("Request cannot be processed. The target page does not exist anymore.")]
    PageExpired {
        page_map: Option<String>,
        page_id: u32,
    },

    /// Indexed mounts only accept the keys `0`, `1`, ... in consecutive order.
    #[error("not all parameters were encoded; parameter names must be integers in consecutive order starting with zero, found {keys:?}")]
    NonConsecutiveIndexedParameters { keys: Vec<String> },

    /// `encode` was given a target the strategy does not handle.
    #[error("unsupported request target for {strategy}")]
    UnsupportedTarget { strategy: String },

    /// PageInfo fields violate the id/version/page-map invariant.
    #[error("either both page id and version number must be set or none of them, and a page info without an id needs a page-map name")]
    InvalidPageInfo,
}

impl CodingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodingError::OddSegmentCount { .. }
            | CodingError::TooManySegments { .. }
            | CodingError::MalformedInterfaceParameter { .. }
            | CodingError::UnknownPage(_) => ErrorKind::ClientInput,
            CodingError::PageExpired { .. } => ErrorKind::PageExpired,
            CodingError::NonConsecutiveIndexedParameters { .. }
            | CodingError::UnsupportedTarget { .. }
            | CodingError::InvalidPageInfo => ErrorKind::Programmer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = CodingError::OddSegmentCount {
            fragment: "/a".into(),
        };
        assert_eq!(err.kind(), ErrorKind::ClientInput);

        let err = CodingError::PageExpired {
            page_map: None,
            page_id: 3,
        };
        assert_eq!(err.kind(), ErrorKind::PageExpired);

        let err = CodingError::UnsupportedTarget {
            strategy: "x".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Programmer);
    }

    #[test]
    fn test_error_display() {
        let err = CodingError::TooManySegments {
            found: 4,
            declared: 2,
        };
        assert_eq!(err.to_string(), "too many path segments: 4 found, 2 declared");
    }
}
