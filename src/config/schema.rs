//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files. Every
//! section has defaults, so a file only needs the pages and mounts it declares.

use serde::{Deserialize, Serialize};

use crate::coding::ExpiredPagePolicy;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct MountsConfig {
    /// Path prefixes no mount may handle (static files and the like).
    pub ignore_paths: Vec<String>,

    /// Listener configuration (bind address, timeouts).
    pub listener: ListenerConfig,

    /// URL coding settings shared by all mounts.
    pub settings: SettingsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Page types known to the application.
    pub pages: Vec<PageConfig>,

    /// Mount definitions.
    pub mounts: Vec<MountConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Per-request timeout.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Settings shared by every mount.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SettingsConfig {
    pub mounts_case_sensitive: bool,

    /// Page ids are unique across page-maps, so hybrid URLs can omit the page-map.
    pub page_id_unique_per_session: bool,

    pub page_info_begin_separator: String,
    pub page_info_end_separator: String,

    /// Maximum number of stored page instances.
    pub page_store_capacity: usize,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            mounts_case_sensitive: true,
            page_id_unique_per_session: false,
            page_info_begin_separator: ".".to_string(),
            page_info_end_separator: String::new(),
            page_store_capacity: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// A page type the application can construct.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PageConfig {
    /// Page type identifier, `package.SimpleName`.
    pub name: String,

    /// Stateless pages are never stored and never redirected to a hybrid URL.
    #[serde(default)]
    pub stateless: bool,

    /// Title shown in the rendered page; defaults to the simple name.
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Named,
    Indexed,
    Mixed,
    Hybrid,
    Package,
}

/// Parameter policy inside a hybrid mount.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EncodingKind {
    #[default]
    Named,
    Indexed,
    Mixed,
}

/// One mount.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MountConfig {
    pub path: String,

    /// Page type (all strategies except `package`).
    #[serde(default)]
    pub page: Option<String>,

    #[serde(default)]
    pub strategy: StrategyKind,

    /// Declared parameter names for mixed encoding.
    #[serde(default)]
    pub parameters: Vec<String>,

    /// Drop extra path segments instead of rejecting the URL (mixed encoding).
    #[serde(default = "default_true")]
    pub ignore_undeclared: bool,

    /// Restrict a bookmarkable mount to one page-map.
    #[serde(default)]
    pub page_map: Option<String>,

    /// Redirect to the hybrid URL after creating a stateful page (hybrid only).
    #[serde(default = "default_true")]
    pub redirect_on_bookmarkable: bool,

    /// Parameter policy of a hybrid mount.
    #[serde(default)]
    pub encoding: EncodingKind,

    /// Expired callback handling (hybrid only).
    #[serde(default)]
    pub on_expired: ExpiredPagePolicy,

    /// Package name (package mounts only).
    #[serde(default)]
    pub package: Option<String>,
}

fn default_true() -> bool {
    true
}

impl MountConfig {
    /// A named-parameter mount of `page` at `path`.
    pub fn new(path: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            page: Some(page.into()),
            strategy: StrategyKind::Named,
            parameters: Vec::new(),
            ignore_undeclared: true,
            page_map: None,
            redirect_on_bookmarkable: true,
            encoding: EncodingKind::Named,
            on_expired: ExpiredPagePolicy::Fail,
            package: None,
        }
    }

    /// Whether this mount decodes parameters with the mixed policy.
    pub fn uses_mixed_encoding(&self) -> bool {
        match self.strategy {
            StrategyKind::Mixed => true,
            StrategyKind::Hybrid => self.encoding == EncodingKind::Mixed,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config: MountsConfig = toml::from_str("").unwrap();
        assert_eq!(config, MountsConfig::default());
        assert!(config.settings.mounts_case_sensitive);
        assert_eq!(config.settings.page_info_begin_separator, ".");
    }

    #[test]
    fn test_full_config() {
        let config: MountsConfig = toml::from_str(
            r#"
            ignore_paths = ["static"]

            [listener]
            bind_address = "0.0.0.0:9000"

            [observability]
            log_format = "json"

            [[pages]]
            name = "blog.Article"

            [[mounts]]
            path = "blog"
            page = "blog.Article"
            strategy = "hybrid"
            encoding = "mixed"
            parameters = ["year", "slug"]
            on_expired = "recreate"
            "#,
        )
        .unwrap();

        assert_eq!(config.ignore_paths, vec!["static".to_string()]);
        assert_eq!(config.listener.request_timeout_secs, 30);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        let mount = &config.mounts[0];
        assert_eq!(mount.strategy, StrategyKind::Hybrid);
        assert_eq!(mount.on_expired, ExpiredPagePolicy::Recreate);
        assert!(mount.redirect_on_bookmarkable);
        assert!(mount.ignore_undeclared);
        assert!(mount.uses_mixed_encoding());
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let result: Result<MountsConfig, _> = toml::from_str(
            r#"
            [[mounts]]
            path = "a"
            strategy = "magic"
            "#,
        );
        assert!(result.is_err());
    }
}
