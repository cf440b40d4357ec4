//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the page registry from the declared pages
//! - Build one coding strategy per mount and the mount table
//! - Rebuild the table the same way on every config reload
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Construction errors name the offending mount path

use std::sync::Arc;

use thiserror::Error;

use crate::coding::{
    BookmarkableStrategy, HybridStrategy, MixedParameters, PackageStrategy, PageInfoCodec,
    ParameterEncoding, UrlCodingStrategy,
};
use crate::config::{
    ConfigError, EncodingKind, MountConfig, MountsConfig, PageConfig, SettingsConfig,
    StrategyKind,
};
use crate::page::{PageContent, PageRegistry, PageType, RegistryError};
use crate::routing::{MountError, MountPath, MountTable};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("mount `{path}`: {source}")]
    Mount {
        path: String,
        #[source]
        source: MountError,
    },
}

/// Register every declared page with a factory that renders its title.
pub fn build_page_registry(pages: &[PageConfig]) -> Result<PageRegistry, RegistryError> {
    let mut registry = PageRegistry::new();
    for page in pages {
        let page_type = PageType::new(&page.name);
        let title = page
            .title
            .clone()
            .unwrap_or_else(|| page_type.simple_name().to_string());
        let content = if page.stateless {
            PageContent::stateless(title)
        } else {
            PageContent::stateful(title)
        };
        registry.register_static(page_type, content)?;
    }
    tracing::info!(pages = pages.len(), "Page registry built");
    Ok(registry)
}

/// Build the mount table for `config`.
pub fn build_mount_table(
    config: &MountsConfig,
    registry: &PageRegistry,
) -> Result<MountTable, StartupError> {
    let settings = &config.settings;
    let mut table = MountTable::new(settings.mounts_case_sensitive);
    for path in &config.ignore_paths {
        table.ignore(path).map_err(mount_error(path))?;
    }
    for mount in &config.mounts {
        let strategy = build_strategy(mount, settings, registry).map_err(mount_error(&mount.path))?;
        table.mount(strategy).map_err(mount_error(&mount.path))?;
    }
    Ok(table)
}

fn mount_error(path: &str) -> impl FnOnce(MountError) -> StartupError + '_ {
    move |source| StartupError::Mount {
        path: path.to_string(),
        source,
    }
}

/// Build the coding strategy described by `mount`.
pub fn build_strategy(
    mount: &MountConfig,
    settings: &SettingsConfig,
    registry: &PageRegistry,
) -> Result<Arc<dyn UrlCodingStrategy>, MountError> {
    let path = MountPath::new(&mount.path)?;

    let strategy: Arc<dyn UrlCodingStrategy> = match mount.strategy {
        StrategyKind::Package => {
            let package = mount
                .package
                .as_deref()
                .filter(|package| !package.is_empty())
                .ok_or_else(|| MountError::MissingPackage(path.to_string()))?;
            let members = registry.package_members(package);
            Arc::new(PackageStrategy::new(path, package, members)?)
        }
        StrategyKind::Named => Arc::new(
            BookmarkableStrategy::new(path, registered_page(mount, registry)?, ParameterEncoding::Named)
                .with_page_map(mount.page_map.clone()),
        ),
        StrategyKind::Indexed => Arc::new(
            BookmarkableStrategy::new(
                path,
                registered_page(mount, registry)?,
                ParameterEncoding::Indexed,
            )
            .with_page_map(mount.page_map.clone()),
        ),
        StrategyKind::Mixed => Arc::new(
            BookmarkableStrategy::new(path, registered_page(mount, registry)?, mixed_encoding(mount)?)
                .with_page_map(mount.page_map.clone()),
        ),
        StrategyKind::Hybrid => {
            let encoding = match mount.encoding {
                EncodingKind::Named => ParameterEncoding::Named,
                EncodingKind::Indexed => ParameterEncoding::Indexed,
                EncodingKind::Mixed => mixed_encoding(mount)?,
            };
            let codec = PageInfoCodec::with_separators(
                settings.page_info_begin_separator.as_str(),
                settings.page_info_end_separator.as_str(),
            )?
            .page_id_unique_per_session(settings.page_id_unique_per_session);
            Arc::new(
                HybridStrategy::new(path, registered_page(mount, registry)?)
                    .with_encoding(encoding)
                    .with_codec(codec)
                    .redirect_on_bookmarkable(mount.redirect_on_bookmarkable)
                    .on_expired(mount.on_expired),
            )
        }
    };
    Ok(strategy)
}

fn registered_page(mount: &MountConfig, registry: &PageRegistry) -> Result<PageType, MountError> {
    let page = mount.page.as_deref().unwrap_or("");
    let page_type = PageType::new(page);
    if registry.contains(&page_type) {
        Ok(page_type)
    } else {
        Err(MountError::UnknownPage(page.to_string()))
    }
}

fn mixed_encoding(mount: &MountConfig) -> Result<ParameterEncoding, MountError> {
    let mixed = MixedParameters::new(mount.parameters.clone(), mount.ignore_undeclared)?;
    Ok(ParameterEncoding::Mixed(mixed))
}
