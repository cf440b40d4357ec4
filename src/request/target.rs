//! Request targets produced by decoding and consumed by encoding.

use std::fmt;
use std::sync::Arc;

use crate::page::{Page, PageType};
use crate::request::{InterfaceParameter, PageParameters, REDIRECT_LISTENER};

/// Extra state a hybrid mount attaches to a bookmarkable target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HybridOptions {
    /// Trailing slashes of the URL before the page info token.
    pub trailing_slashes: usize,
    /// Redirect to the hybrid URL once a stateful page has been created.
    pub redirect: bool,
}

/// Construct a fresh page from parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkablePageTarget {
    pub page_type: PageType,
    pub parameters: PageParameters,
    pub page_map: Option<String>,
    /// Set when the target was decoded by a hybrid mount.
    pub hybrid: Option<HybridOptions>,
}

impl BookmarkablePageTarget {
    pub fn new(page_type: PageType, parameters: PageParameters) -> Self {
        Self {
            page_type,
            parameters,
            page_map: None,
            hybrid: None,
        }
    }

    pub fn with_page_map(mut self, page_map: Option<String>) -> Self {
        self.page_map = page_map;
        self
    }
}

/// Invoke a listener interface on an existing page instance.
#[derive(Debug, Clone)]
pub struct ListenerInterfaceTarget {
    pub page: Arc<Page>,
    pub component_path: Option<String>,
    pub interface: String,
    pub version: Option<u32>,
}

impl ListenerInterfaceTarget {
    /// Target that re-renders `page` (hybrid resume).
    pub fn redirect(page: Arc<Page>) -> Self {
        Self {
            page,
            component_path: None,
            interface: REDIRECT_LISTENER.to_string(),
            version: None,
        }
    }

    pub fn is_redirect(&self) -> bool {
        self.interface == REDIRECT_LISTENER
    }
}

impl PartialEq for ListenerInterfaceTarget {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.page, &other.page)
            && self.component_path == other.component_path
            && self.interface == other.interface
            && self.version == other.version
    }
}

/// Invoke a listener interface on a freshly constructed page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatelessListenerTarget {
    pub page_type: PageType,
    pub parameters: PageParameters,
    pub page_map: Option<String>,
    pub component_path: String,
    pub interface: String,
    pub version: Option<u32>,
}

impl StatelessListenerTarget {
    /// The `ui:interface` token addressing this listener.
    pub fn interface_parameter(&self) -> InterfaceParameter {
        InterfaceParameter {
            page_map: self.page_map.clone(),
            component_path: self.component_path.clone(),
            version: self.version.unwrap_or(0),
            interface: self.interface.clone(),
            behavior_id: None,
            url_depth: -1,
        }
    }
}

/// What a URL resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestTarget {
    BookmarkablePage(BookmarkablePageTarget),
    ListenerInterface(ListenerInterfaceTarget),
    StatelessListener(StatelessListenerTarget),
}

impl From<BookmarkablePageTarget> for RequestTarget {
    fn from(target: BookmarkablePageTarget) -> Self {
        RequestTarget::BookmarkablePage(target)
    }
}

impl From<ListenerInterfaceTarget> for RequestTarget {
    fn from(target: ListenerInterfaceTarget) -> Self {
        RequestTarget::ListenerInterface(target)
    }
}

impl From<StatelessListenerTarget> for RequestTarget {
    fn from(target: StatelessListenerTarget) -> Self {
        RequestTarget::StatelessListener(target)
    }
}

impl fmt::Display for RequestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestTarget::BookmarkablePage(t) => {
                write!(f, "bookmarkable page {} {}", t.page_type, t.parameters)?;
                if let Some(page_map) = &t.page_map {
                    write!(f, " in page-map {}", page_map)?;
                }
                if let Some(hybrid) = t.hybrid {
                    write!(
                        f,
                        " (hybrid, redirect={}, trailing slashes={})",
                        hybrid.redirect, hybrid.trailing_slashes
                    )?;
                }
                Ok(())
            }
            RequestTarget::ListenerInterface(t) => write!(
                f,
                "{} on page {} #{}.{}",
                t.interface,
                t.page.page_type(),
                t.page.id(),
                t.page.version()
            ),
            RequestTarget::StatelessListener(t) => write!(
                f,
                "stateless {} on {}:{} {}",
                t.interface, t.page_type, t.component_path, t.parameters
            ),
        }
    }
}
