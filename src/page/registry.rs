//! Page type registry.
//!
//! Maps a page type identifier to the closure that builds a page from its
//! parameters. Populated at startup, read-only afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::page::PageType;
use crate::request::PageParameters;

/// What a factory produces for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub title: String,
    pub stateless: bool,
}

impl PageContent {
    pub fn stateful(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            stateless: false,
        }
    }

    pub fn stateless(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            stateless: true,
        }
    }
}

/// Builds page content from the page parameters.
pub type PageFactory = Arc<dyn Fn(&PageParameters) -> PageContent + Send + Sync>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("page type `{0}` is already registered")]
    Duplicate(PageType),
}

/// Page type → factory mapping.
#[derive(Clone, Default)]
pub struct PageRegistry {
    factories: BTreeMap<PageType, PageFactory>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for `page_type`.
    pub fn register<F>(&mut self, page_type: PageType, factory: F) -> Result<(), RegistryError>
    where
        F: Fn(&PageParameters) -> PageContent + Send + Sync + 'static,
    {
        if self.factories.contains_key(&page_type) {
            return Err(RegistryError::Duplicate(page_type));
        }
        tracing::debug!(page_type = %page_type, "Page type registered");
        self.factories.insert(page_type, Arc::new(factory));
        Ok(())
    }

    /// Register a page type whose content does not depend on its parameters.
    pub fn register_static(
        &mut self,
        page_type: PageType,
        content: PageContent,
    ) -> Result<(), RegistryError> {
        self.register(page_type, move |_| content.clone())
    }

    pub fn contains(&self, page_type: &PageType) -> bool {
        self.factories.contains_key(page_type)
    }

    /// Build content for `page_type`, or `None` if it is not registered.
    pub fn create(&self, page_type: &PageType, params: &PageParameters) -> Option<PageContent> {
        self.factories.get(page_type).map(|factory| factory(params))
    }

    /// Registered page types whose package is exactly `package`.
    pub fn package_members(&self, package: &str) -> Vec<PageType> {
        self.factories
            .keys()
            .filter(|page_type| page_type.package() == Some(package))
            .cloned()
            .collect()
    }

    pub fn page_types(&self) -> impl Iterator<Item = &PageType> {
        self.factories.keys()
    }
}

impl fmt::Debug for PageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageRegistry")
            .field("page_types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_uses_parameters() {
        let mut registry = PageRegistry::new();
        registry
            .register(PageType::new("blog.Article"), |params| {
                PageContent::stateful(params.get_str("slug").unwrap_or("untitled"))
            })
            .unwrap();

        let params: PageParameters = [("slug", "hello")].into_iter().collect();
        let content = registry.create(&"blog.Article".into(), &params).unwrap();
        assert_eq!(content.title, "hello");
        assert!(registry.create(&"blog.Missing".into(), &params).is_none());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = PageRegistry::new();
        registry
            .register_static("Home".into(), PageContent::stateless("Home"))
            .unwrap();
        assert!(registry
            .register_static("Home".into(), PageContent::stateless("Home"))
            .is_err());
    }

    #[test]
    fn test_package_members() {
        let mut registry = PageRegistry::new();
        for name in ["blog.Article", "blog.Index", "blog.admin.Edit", "Home"] {
            registry
                .register_static(name.into(), PageContent::stateful(name))
                .unwrap();
        }
        let members: Vec<_> = registry
            .package_members("blog")
            .iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(members, vec!["blog.Article", "blog.Index"]);
    }
}
