//! Inbound request parameters.
//!
//! # Responsibilities
//! - Carry the request path and pre-parsed query parameters to a strategy
//! - Carry the listener fields (page-map, interface, component path, version)
//!   resolved by the request-parsing layer or by a strategy
//!
//! # Design Decisions
//! - The path is stored without its leading slash, like mount paths
//! - Query decoding uses form encoding (`+` is a space)

use url::form_urlencoded;

use crate::coding::CodingError;
use crate::request::interface::InterfaceParameter;
use crate::request::page_parameters::PageParameters;

/// Request-scoped parameters consumed by `UrlCodingStrategy::decode`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParameters {
    path: String,
    query: PageParameters,
    pub page_map: Option<String>,
    pub interface_name: Option<String>,
    pub component_path: Option<String>,
    pub version: Option<u32>,
    pub behavior_id: Option<String>,
    pub url_depth: Option<i32>,
    /// Set for AJAX requests (`X-Requested-With: XMLHttpRequest`).
    pub ajax: bool,
}

impl RequestParameters {
    /// Parameters for `path` with no query string.
    pub fn new(path: &str) -> Self {
        Self {
            path: path.trim_start_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Parameters for `path` and a raw (still encoded) query string.
    pub fn with_query(path: &str, query: Option<&str>) -> Self {
        let mut params = Self::new(path);
        if let Some(query) = query {
            for (key, value) in form_urlencoded::parse(query.as_bytes()) {
                params.query.append(key.into_owned(), value.into_owned());
            }
        }
        params
    }

    /// Split a request URL of the form `path?query` and parse both parts.
    pub fn from_url(url: &str) -> Self {
        match url.split_once('?') {
            Some((path, query)) => Self::with_query(path, Some(query)),
            None => Self::new(url),
        }
    }

    /// Request path, without a leading slash.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Decoded query parameters.
    pub fn query(&self) -> &PageParameters {
        &self.query
    }

    /// Apply a raw `ui:interface` token to the listener fields.
    pub fn apply_interface_parameter(&mut self, raw: &str) -> Result<(), CodingError> {
        let parsed = InterfaceParameter::parse(raw)?;
        self.page_map = parsed.page_map;
        self.component_path = Some(parsed.component_path);
        self.version = Some(parsed.version);
        self.interface_name = Some(parsed.interface);
        self.behavior_id = parsed.behavior_id;
        self.url_depth = Some(parsed.url_depth);
        Ok(())
    }
}
