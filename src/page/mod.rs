//! Page subsystem.
//!
//! # Data Flow
//! ```text
//! Bookmarkable target (page type + parameters)
//!     → registry.rs (page type → factory closure)
//!     → Page instance (id, version, page-map, metadata)
//!     → store.rs (stateful pages kept for hybrid resume)
//!
//! Hybrid resume:
//!     PageInfo (page-map, id, version)
//!     → store.rs lookup
//!     → Page or None (expired / evicted)
//! ```
//!
//! # Design Decisions
//! - Page types are stable string identifiers, not runtime type lookups
//! - The registry owns its factories for the application's lifetime
//! - Stored pages are immutable and shared via `Arc`

pub mod registry;
pub mod store;

use std::fmt;
use std::sync::Arc;

use crate::request::PageParameters;

pub use registry::{PageContent, PageFactory, PageRegistry, RegistryError};
pub use store::{InMemoryPageStore, PageStore};

/// Stable identifier of a page type, e.g. `blog.Article`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageType(Arc<str>);

impl PageType {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Package part of the identifier (everything before the last `.`).
    pub fn package(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(package, _)| package)
    }

    /// Name without the package.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit_once('.').map(|(_, name)| name).unwrap_or(self.as_str())
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageType {
    fn from(name: &str) -> Self {
        PageType::new(name)
    }
}

/// Data attached to a page instance when it is created from a URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    /// Parameters the page was constructed with; used to re-encode its URL.
    pub initial_parameters: Option<PageParameters>,
    /// Trailing slashes of the URL the page was created from, before the page info.
    pub trailing_slashes: Option<usize>,
}

/// A page instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    id: u32,
    version: u32,
    page_map: Option<String>,
    page_type: PageType,
    content: PageContent,
    pub metadata: PageMetadata,
}

impl Page {
    pub fn new(id: u32, page_type: PageType, content: PageContent) -> Self {
        Self {
            id,
            version: 0,
            page_map: None,
            page_type,
            content,
            metadata: PageMetadata::default(),
        }
    }

    pub fn with_page_map(mut self, page_map: Option<String>) -> Self {
        self.page_map = page_map.filter(|name| !name.is_empty());
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn page_map(&self) -> Option<&str> {
        self.page_map.as_deref()
    }

    pub fn page_type(&self) -> &PageType {
        &self.page_type
    }

    pub fn content(&self) -> &PageContent {
        &self.content
    }
}
