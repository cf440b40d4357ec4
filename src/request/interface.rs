//! Listener callback token carried by the `ui:interface` parameter.
//!
//! Wire form: `pageMap:componentPath:version:interface:behaviorId:urlDepth`.
//! The component path sits between the page-map name and the version and may
//! itself contain `:` (it starts with the page id).

use std::fmt;

use crate::coding::CodingError;
use crate::request::REDIRECT_LISTENER;

const SEPARATOR: char = ':';

/// Parsed listener callback token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceParameter {
    pub page_map: Option<String>,
    pub component_path: String,
    pub version: u32,
    pub interface: String,
    pub behavior_id: Option<String>,
    /// -1 when the url depth is unknown.
    pub url_depth: i32,
}

impl InterfaceParameter {
    /// Token for invoking `interface` on the component at `component_path`.
    pub fn new(component_path: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            page_map: None,
            component_path: component_path.into(),
            version: 0,
            interface: interface.into(),
            behavior_id: None,
            url_depth: -1,
        }
    }

    /// Parse the raw parameter value.
    pub fn parse(raw: &str) -> Result<Self, CodingError> {
        let parts: Vec<&str> = raw.split(SEPARATOR).collect();
        if parts.len() < 6 {
            return Err(malformed(raw, "expected at least 6 components"));
        }
        let n = parts.len();

        let version = match parts[n - 4] {
            "" => 0,
            v => v
                .parse::<u32>()
                .map_err(|_| malformed(raw, "version is not a number"))?,
        };
        let url_depth = match parts[n - 1] {
            "" => -1,
            d => d
                .parse::<i32>()
                .map_err(|_| malformed(raw, "url depth is not a number"))?,
        };
        let interface = match parts[n - 3] {
            "" => REDIRECT_LISTENER.to_string(),
            name => name.to_string(),
        };

        Ok(Self {
            page_map: non_empty(parts[0]),
            component_path: parts[1..n - 4].join(":"),
            version,
            interface,
            behavior_id: non_empty(parts[n - 2]),
            url_depth,
        })
    }
}

impl fmt::Display for InterfaceParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let depth = if self.url_depth < 0 {
            String::new()
        } else {
            self.url_depth.to_string()
        };
        write!(
            f,
            "{}:{}:{}:{}:{}:{}",
            self.page_map.as_deref().unwrap_or(""),
            self.component_path,
            if self.version == 0 { String::new() } else { self.version.to_string() },
            self.interface,
            self.behavior_id.as_deref().unwrap_or(""),
            depth
        )
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn malformed(raw: &str, reason: &'static str) -> CodingError {
    CodingError::MalformedInterfaceParameter {
        value: raw.to_string(),
        reason,
    }
}
