//! Parameter encoding policies.
//!
//! # Policies
//! - `Named`: `/key/value` pairs in parameter order; repeated keys repeat the pair
//! - `Indexed`: positional segments for the keys `0`, `1`, ...
//! - `Mixed`: declared names as positional segments, everything else in the query
//!
//! # Design Decisions
//! - One enum instead of one strategy type per policy; strategies hold a
//!   `ParameterEncoding` and delegate to it
//! - Path output and query output are kept apart so a hybrid mount can put the
//!   page info token between them
//! - `Null` values code as empty strings and decode as empty strings
//! - An empty fragment decodes to no parameters under every policy, so the
//!   mount root round-trips an empty set. A mixed mount does not bind its
//!   first declared name to `""` for it.

use std::collections::HashSet;
use std::fmt;

use crate::coding::encoding::{decode_path_segment, encode_path_segment, encode_query_component};
use crate::coding::CodingError;
use crate::request::{PageParameters, PAGE_MAP_PARAMETER_NAME};
use crate::routing::MountError;

/// Output of encoding a parameter set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedParameters {
    /// Path suffix, empty or starting with `/`.
    pub path: String,
    /// Encoded query string without the leading `?`.
    pub query: String,
}

impl EncodedParameters {
    /// Append an encoded `key=value` pair to the query.
    pub fn push_query(&mut self, key: &str, value: &str) {
        if !self.query.is_empty() {
            self.query.push('&');
        }
        self.query.push_str(&encode_query_component(key));
        self.query.push('=');
        self.query.push_str(&encode_query_component(value));
    }

    fn push_segment(&mut self, value: &str) {
        self.path.push('/');
        self.path.push_str(&encode_path_segment(value));
    }
}

impl fmt::Display for EncodedParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        Ok(())
    }
}

/// Declared parameter names of a mixed mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixedParameters {
    names: Vec<String>,
    ignore_undeclared: bool,
}

impl MixedParameters {
    /// Names must be non-empty and unique; their order is the path order.
    pub fn new(names: Vec<String>, ignore_undeclared: bool) -> Result<Self, MountError> {
        if names.is_empty() {
            return Err(MountError::NoParameterNames);
        }
        let mut seen = HashSet::new();
        for name in &names {
            if name.is_empty() {
                return Err(MountError::EmptyParameterName);
            }
            if !seen.insert(name.as_str()) {
                return Err(MountError::DuplicateParameterName(name.clone()));
            }
        }
        Ok(Self {
            names,
            ignore_undeclared,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// How page parameters map onto the URL below a mount path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterEncoding {
    Named,
    Indexed,
    Mixed(MixedParameters),
}

impl ParameterEncoding {
    /// Encode `params` into a path suffix and a query string.
    pub fn encode(&self, params: &PageParameters) -> Result<EncodedParameters, CodingError> {
        match self {
            ParameterEncoding::Named => Ok(encode_named(params)),
            ParameterEncoding::Indexed => encode_indexed(params),
            ParameterEncoding::Mixed(mixed) => Ok(encode_mixed(mixed, params)),
        }
    }

    /// Decode the URL part after the mount path and merge in the query parameters.
    pub fn decode(
        &self,
        fragment: &str,
        query: &PageParameters,
    ) -> Result<PageParameters, CodingError> {
        let mut params = match self {
            ParameterEncoding::Named => decode_named(fragment)?,
            ParameterEncoding::Indexed => decode_indexed(fragment),
            ParameterEncoding::Mixed(mixed) => decode_mixed(mixed, fragment)?,
        };
        params.merge(query);
        Ok(params)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ParameterEncoding::Named => "named",
            ParameterEncoding::Indexed => "indexed",
            ParameterEncoding::Mixed(_) => "mixed",
        }
    }
}

fn encode_named(params: &PageParameters) -> EncodedParameters {
    let mut out = EncodedParameters::default();
    for (key, value) in params.iter() {
        for v in value.coded_values() {
            out.push_segment(key);
            out.push_segment(v);
        }
    }
    out
}

fn decode_named(fragment: &str) -> Result<PageParameters, CodingError> {
    let mut params = PageParameters::new();
    let trimmed = fragment.strip_prefix('/').unwrap_or(fragment);
    if trimmed.is_empty() {
        return Ok(params);
    }

    let mut segments: Vec<&str> = trimmed.split('/').collect();
    // Trailing slashes are not values, unless they close a `/key/` pair.
    while let Some(last) = segments.last() {
        let len = segments.len();
        let odd = len % 2 == 1;
        let empty_pair = len >= 2 && segments[len - 2].is_empty();
        if last.is_empty() && (odd || empty_pair) {
            segments.pop();
        } else {
            break;
        }
    }

    if segments.len() % 2 != 0 {
        return Err(CodingError::OddSegmentCount {
            fragment: fragment.to_string(),
        });
    }
    for pair in segments.chunks(2) {
        params.append(decode_path_segment(pair[0]), decode_path_segment(pair[1]));
    }
    Ok(params)
}

fn encode_indexed(params: &PageParameters) -> Result<EncodedParameters, CodingError> {
    let mut out = EncodedParameters::default();
    let mut index = 0usize;
    while let Some(value) = params.get(&index.to_string()) {
        out.push_segment(value.first().unwrap_or(""));
        index += 1;
    }

    let mut encoded = index;
    if let Some(page_map) = params.get(PAGE_MAP_PARAMETER_NAME) {
        out.push_segment(PAGE_MAP_PARAMETER_NAME);
        out.push_segment(page_map.first().unwrap_or(""));
        encoded += 1;
    }

    if encoded != params.len() {
        return Err(CodingError::NonConsecutiveIndexedParameters {
            keys: params.keys().map(str::to_string).collect(),
        });
    }
    Ok(out)
}

fn decode_indexed(fragment: &str) -> PageParameters {
    let mut params = PageParameters::new();
    let trimmed = fragment.strip_prefix('/').unwrap_or(fragment);
    let trimmed = trimmed.trim_end_matches('/');
    if trimmed.is_empty() {
        return params;
    }

    let segments: Vec<&str> = trimmed.split('/').collect();
    let mut index = 0usize;
    let mut i = 0;
    while i < segments.len() {
        if segments[i] == PAGE_MAP_PARAMETER_NAME && i + 1 < segments.len() {
            params.insert(PAGE_MAP_PARAMETER_NAME, decode_path_segment(segments[i + 1]));
            i += 2;
            continue;
        }
        params.insert(index.to_string(), decode_path_segment(segments[i]));
        index += 1;
        i += 1;
    }
    params
}

fn encode_mixed(mixed: &MixedParameters, params: &PageParameters) -> EncodedParameters {
    let mut out = EncodedParameters::default();

    // Every declared name up to the last present one goes into the path.
    let last_present = mixed
        .names
        .iter()
        .rposition(|name| params.contains_key(name));
    let in_path: &[String] = match last_present {
        Some(last) => &mixed.names[..=last],
        None => &[],
    };
    for name in in_path {
        // Arrays keep only their first element here.
        let value = params.get(name).and_then(|v| v.first()).unwrap_or("");
        out.push_segment(value);
    }

    for (key, value) in params.iter() {
        if in_path.iter().any(|name| name == key) {
            continue;
        }
        for v in value.coded_values() {
            out.push_query(key, v);
        }
    }
    out
}

fn decode_mixed(mixed: &MixedParameters, fragment: &str) -> Result<PageParameters, CodingError> {
    let mut params = PageParameters::new();
    let trimmed = fragment.strip_prefix('/').unwrap_or(fragment);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Ok(params);
    }

    let parts: Vec<&str> = trimmed.split('/').collect();
    if parts.len() > mixed.names.len() {
        if mixed.ignore_undeclared {
            tracing::warn!(
                found = parts.len(),
                declared = mixed.names.len(),
                fragment = %fragment,
                "Ignoring undeclared path segments"
            );
        } else {
            return Err(CodingError::TooManySegments {
                found: parts.len(),
                declared: mixed.names.len(),
            });
        }
    }

    for (name, part) in mixed.names.iter().zip(parts) {
        params.insert(name.clone(), decode_path_segment(part));
    }
    Ok(params)
}
