//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (mounts reference declared pages)
//! - Validate mount paths, parameter names and separators
//! - Detect conflicting mounts
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: MountsConfig → Result<(), Vec<ValidationError>>
//! - Runs before a config is accepted, at startup and on every reload

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::coding::{MixedParameters, PageInfoCodec};
use crate::config::schema::{MountConfig, MountsConfig, StrategyKind};
use crate::routing::{MountError, MountPath};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),

    #[error("listener.request_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("settings.page_store_capacity must be greater than zero")]
    ZeroPageStoreCapacity,

    #[error("settings: {0}")]
    Settings(MountError),

    #[error("page `{0}` is declared twice")]
    DuplicatePage(String),

    #[error("mount `{path}` needs a page")]
    MissingPage { path: String },

    #[error("mount `{path}`: {source}")]
    Mount {
        path: String,
        #[source]
        source: MountError,
    },
}

impl ValidationError {
    fn mount(path: &str, source: MountError) -> Self {
        ValidationError::Mount {
            path: path.to_string(),
            source,
        }
    }
}

/// Check `config` for semantic errors.
pub fn validate_config(config: &MountsConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let settings = &config.settings;
    if settings.page_store_capacity == 0 {
        errors.push(ValidationError::ZeroPageStoreCapacity);
    }
    if let Err(e) = PageInfoCodec::with_separators(
        settings.page_info_begin_separator.as_str(),
        settings.page_info_end_separator.as_str(),
    ) {
        errors.push(ValidationError::Settings(e));
    }

    let mut pages = HashSet::new();
    for page in &config.pages {
        if !pages.insert(page.name.as_str()) {
            errors.push(ValidationError::DuplicatePage(page.name.clone()));
        }
    }

    let mut mounted = HashSet::new();
    for path in &config.ignore_paths {
        match MountPath::new(path) {
            Ok(mount_path) => {
                if !mounted.insert(mount_path.key(settings.mounts_case_sensitive)) {
                    errors.push(ValidationError::mount(
                        path,
                        MountError::AlreadyMounted(mount_path.to_string()),
                    ));
                }
            }
            Err(e) => errors.push(ValidationError::mount(path, e)),
        }
    }

    for mount in &config.mounts {
        match MountPath::new(&mount.path) {
            Ok(mount_path) => {
                if !mounted.insert(mount_path.key(settings.mounts_case_sensitive)) {
                    errors.push(ValidationError::mount(
                        &mount.path,
                        MountError::AlreadyMounted(mount_path.to_string()),
                    ));
                }
            }
            Err(e) => errors.push(ValidationError::mount(&mount.path, e)),
        }
        validate_mount(mount, &pages, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_mount(mount: &MountConfig, pages: &HashSet<&str>, errors: &mut Vec<ValidationError>) {
    let path = mount.path.as_str();

    if mount.strategy == StrategyKind::Package {
        let package = mount.package.as_deref().unwrap_or("");
        if package.is_empty() {
            errors.push(ValidationError::mount(
                path,
                MountError::MissingPackage(path.to_string()),
            ));
        } else {
            let prefix = format!("{package}.");
            let has_members = pages.iter().any(|page| {
                page.strip_prefix(&prefix)
                    .is_some_and(|simple| !simple.is_empty() && !simple.contains('.'))
            });
            if !has_members {
                errors.push(ValidationError::mount(
                    path,
                    MountError::EmptyPackage(package.to_string()),
                ));
            }
        }
        if mount.page.is_some() {
            errors.push(ValidationError::mount(
                path,
                MountError::UnsupportedOption {
                    path: path.to_string(),
                    option: "page",
                },
            ));
        }
    } else {
        match mount.page.as_deref() {
            None => errors.push(ValidationError::MissingPage {
                path: path.to_string(),
            }),
            Some(page) if !pages.contains(page) => errors.push(ValidationError::mount(
                path,
                MountError::UnknownPage(page.to_string()),
            )),
            Some(_) => {}
        }
    }

    if mount.uses_mixed_encoding() {
        if let Err(e) = MixedParameters::new(mount.parameters.clone(), mount.ignore_undeclared) {
            errors.push(ValidationError::mount(path, e));
        }
    }

    let page_map_allowed = matches!(
        mount.strategy,
        StrategyKind::Named | StrategyKind::Indexed | StrategyKind::Mixed
    );
    if mount.page_map.is_some() && !page_map_allowed {
        errors.push(ValidationError::mount(
            path,
            MountError::UnsupportedOption {
                path: path.to_string(),
                option: "page_map",
            },
        ));
    }
}
