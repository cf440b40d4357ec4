//! Page info token: page id, version and page-map name in one URL suffix.
//!
//! # Token forms
//! ```text
//! pageId                   default page-map, version 0
//! pageId.version           default page-map
//! pageMap                  no instance, page-map name with a non-digit
//! .pageMap                 no instance, all-digit page-map name
//! pageMap.pageId           page-map name with a non-digit, version 0
//! pageMap.pageId.version   any other combination
//! ```
//!
//! # Design Decisions
//! - Parsing never fails loudly: an unparseable token is "no page info"
//! - Numeric vs. named segments are told apart by "all ASCII digits"
//! - `pageMap.pageId.` is accepted for URLs generated by older releases but is
//!   never produced
//! - Separators inside encoded path values are percent-escaped, so the backward
//!   scan only ever meets separators that belong to a token

use std::fmt;

use percent_encoding::{percent_encode, NON_ALPHANUMERIC};

use crate::coding::CodingError;
use crate::routing::MountError;

const SEPARATOR: char = '.';

/// Identity of a page instance (or just a page-map) carried in a hybrid URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    page_id: Option<u32>,
    version: Option<u32>,
    page_map: Option<String>,
}

impl PageInfo {
    /// Checked constructor: id and version are set together, and a page info
    /// without an id must name a page-map.
    pub fn new(
        page_id: Option<u32>,
        version: Option<u32>,
        page_map: Option<String>,
    ) -> Result<Self, CodingError> {
        match (page_id, version, &page_map) {
            (Some(_), Some(_), _) | (None, None, Some(_)) => Ok(Self {
                page_id,
                version,
                page_map,
            }),
            _ => Err(CodingError::InvalidPageInfo),
        }
    }

    /// Page info pointing at a stored instance.
    pub fn instance(page_id: u32, version: u32, page_map: Option<String>) -> Self {
        Self {
            page_id: Some(page_id),
            version: Some(version),
            page_map,
        }
    }

    /// Page info naming only a page-map.
    pub fn page_map_only(page_map: impl Into<String>) -> Self {
        Self {
            page_id: None,
            version: None,
            page_map: Some(page_map.into()),
        }
    }

    pub fn page_id(&self) -> Option<u32> {
        self.page_id
    }

    pub fn version(&self) -> Option<u32> {
        self.version
    }

    pub fn page_map(&self) -> Option<&str> {
        self.page_map.as_deref()
    }

    /// Render the token. With `omit_page_map` the page-map name is dropped
    /// whenever a page id is present (ids are unique per session).
    pub fn encode(&self, omit_page_map: bool) -> String {
        let page_map = match (&self.page_map, self.page_id) {
            (Some(_), Some(_)) if omit_page_map => None,
            (page_map, _) => page_map.as_deref(),
        };
        let pm_empty = page_map.map_or(true, str::is_empty);
        let pm_has_letter = !pm_empty && !page_map.map_or(false, is_number);
        let page_map = page_map.unwrap_or("");

        match (self.page_id, self.version) {
            (Some(id), Some(0)) if pm_empty => id.to_string(),
            (Some(id), Some(version)) if pm_empty => format!("{id}{SEPARATOR}{version}"),
            (None, _) if pm_has_letter => page_map.to_string(),
            (None, _) if !pm_empty => format!("{SEPARATOR}{page_map}"),
            (Some(id), Some(0)) if pm_has_letter => format!("{page_map}{SEPARATOR}{id}"),
            (Some(id), Some(version)) => format!("{page_map}{SEPARATOR}{id}{SEPARATOR}{version}"),
            _ => String::new(),
        }
    }

    /// Parse a token. Returns `None` for anything that is not a page info.
    pub fn parse(src: &str) -> Option<Self> {
        if src.is_empty() {
            return None;
        }
        let segments: Vec<&str> = src.split(SEPARATOR).collect();
        if segments.len() > 3 {
            return None;
        }
        let valid_chars = segments
            .iter()
            .all(|s| s.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_'));
        if !valid_chars {
            return None;
        }

        match segments.as_slice() {
            [id] if is_number(id) => Some(Self::instance(id.parse().ok()?, 0, None)),
            [id, version] if is_number(id) && is_number(version) => {
                Some(Self::instance(id.parse().ok()?, version.parse().ok()?, None))
            }
            [page_map] => Some(Self::page_map_only(*page_map)),
            ["", page_map] if !page_map.is_empty() => Some(Self::page_map_only(*page_map)),
            [page_map, id] if !page_map.is_empty() && !is_number(page_map) && is_number(id) => {
                Some(Self::instance(id.parse().ok()?, 0, non_empty(page_map)))
            }
            [page_map, id, ""] if is_number(id) => {
                Some(Self::instance(id.parse().ok()?, 0, non_empty(page_map)))
            }
            [page_map, id, version] if is_number(id) && is_number(version) => Some(
                Self::instance(id.parse().ok()?, version.parse().ok()?, non_empty(page_map)),
            ),
            _ => None,
        }
    }
}

impl fmt::Display for PageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode(false))
    }
}

/// True when `s` is non-empty and all ASCII digits.
fn is_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Separators hold no alphanumerics, so this escapes every byte.
fn escape_all(separator: &str) -> String {
    percent_encode(separator.as_bytes(), NON_ALPHANUMERIC).to_string()
}

/// Result of splitting a URL into its leading part and a trailing page info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfoExtraction<'a> {
    /// URL with the page info suffix removed.
    pub remainder: &'a str,
    pub page_info: Option<PageInfo>,
}

/// Appends page info tokens to URLs and finds them again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfoCodec {
    begin: String,
    end: String,
    page_id_unique_per_session: bool,
}

impl Default for PageInfoCodec {
    fn default() -> Self {
        Self {
            begin: SEPARATOR.to_string(),
            end: String::new(),
            page_id_unique_per_session: false,
        }
    }
}

impl PageInfoCodec {
    /// Codec with custom separators. The begin separator may not be empty and
    /// neither separator may contain characters valid inside a token or URL
    /// delimiters (`/`, `?`, `#`, `%`).
    pub fn with_separators(
        begin: impl Into<String>,
        end: impl Into<String>,
    ) -> Result<Self, MountError> {
        let begin = begin.into();
        let end = end.into();
        let reserved =
            |c: char| c.is_alphanumeric() || matches!(c, '-' | '_' | '/' | '?' | '#' | '%');
        if begin.is_empty() || begin.chars().any(reserved) || end.chars().any(reserved) {
            return Err(MountError::InvalidSeparator { begin, end });
        }
        Ok(Self {
            begin,
            end,
            page_id_unique_per_session: false,
        })
    }

    /// Drop page-map names from instance tokens; ids identify pages on their own.
    pub fn page_id_unique_per_session(mut self, unique: bool) -> Self {
        self.page_id_unique_per_session = unique;
        self
    }

    pub fn is_page_id_unique_per_session(&self) -> bool {
        self.page_id_unique_per_session
    }

    pub fn begin_separator(&self) -> &str {
        &self.begin
    }

    /// Percent-encode every separator inside an already encoded path, so the
    /// only separators left in a generated URL are those of the appended token.
    pub fn escape_separators(&self, path: &str) -> String {
        let mut escaped = path.replace(self.begin.as_str(), &escape_all(&self.begin));
        if !self.end.is_empty() {
            escaped = escaped.replace(self.end.as_str(), &escape_all(&self.end));
        }
        escaped
    }

    /// Append `info` (if any) to `url`.
    pub fn append(&self, url: &mut String, info: Option<&PageInfo>) {
        if let Some(info) = info {
            url.push_str(&self.begin);
            url.push_str(&info.encode(self.page_id_unique_per_session));
            url.push_str(&self.end);
        }
    }

    /// Parse `suffix` when it is exactly one delimited page info token.
    pub fn parse_suffix(&self, suffix: &str) -> Option<PageInfo> {
        self.token(suffix).and_then(PageInfo::parse)
    }

    /// Find the page info at the end of `url`.
    ///
    /// Scans backward over begin separators. Each candidate suffix that parses
    /// extends the match to the left; the scan stops at the first candidate that
    /// has the token shape but does not parse. The leftmost successful candidate
    /// wins, so `pm.3.1` is taken whole rather than as `1`.
    pub fn extract<'a>(&self, url: &'a str) -> PageInfoExtraction<'a> {
        let mut last: Option<(usize, PageInfo)> = None;
        let mut search_end = url.len();

        while let Some(begin) = url[..search_end].rfind(self.begin.as_str()) {
            if let Some(token) = self.token(&url[begin..]) {
                match PageInfo::parse(token) {
                    Some(info) => last = Some((begin, info)),
                    None => break,
                }
            }
            search_end = begin;
        }

        match last {
            Some((begin, info)) => PageInfoExtraction {
                remainder: &url[..begin],
                page_info: Some(info),
            },
            None => PageInfoExtraction {
                remainder: url,
                page_info: None,
            },
        }
    }

    fn token<'a>(&self, candidate: &'a str) -> Option<&'a str> {
        if candidate.len() <= self.begin.len() + self.end.len() {
            return None;
        }
        candidate
            .strip_prefix(self.begin.as_str())?
            .strip_suffix(self.end.as_str())
    }
}
