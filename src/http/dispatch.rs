//! The request cycle: decode, create or resume a page, respond.
//!
//! # Data Flow
//! ```text
//! RequestParameters
//!     → MountTable::target_for_request
//!     → BookmarkablePage   → create page (store if stateful)
//!                            → hybrid + stateful + redirect: Redirect(hybrid URL)
//!                            → otherwise Render
//!     → ListenerInterface  → Render the stored page
//!     → StatelessListener  → create page, Render with the listener
//!     → no mount / client error → NotFound
//!     → page expired            → Expired
//!     → programmer error        → Error
//! ```

use serde::Serialize;

use crate::coding::{CodingError, ErrorKind};
use crate::observability::metrics;
use crate::page::{Page, PageRegistry, PageStore, PageType};
use crate::request::{
    BookmarkablePageTarget, ListenerInterfaceTarget, PageParameters, RequestParameters,
    RequestTarget, StatelessListenerTarget,
};
use crate::routing::MountTable;

/// Listener invoked by the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListenerView {
    pub component_path: Option<String>,
    pub interface: String,
}

/// What the demo host renders for a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub page_type: String,
    pub title: String,
    pub stateless: bool,
    pub page_id: Option<u32>,
    pub version: Option<u32>,
    pub page_map: Option<String>,
    pub parameters: PageParameters,
    /// URL that resumes this instance, for stored pages on hybrid mounts.
    pub url: Option<String>,
    pub listener: Option<ListenerView>,
}

/// Result of one request cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Render(Box<PageView>),
    Redirect(String),
    NotFound(String),
    Expired(String),
    Error(String),
}

/// Runs requests against one mount table snapshot.
pub struct RequestCycle<'a> {
    mounts: &'a MountTable,
    pages: &'a dyn PageStore,
    registry: &'a PageRegistry,
}

impl<'a> RequestCycle<'a> {
    pub fn new(mounts: &'a MountTable, pages: &'a dyn PageStore, registry: &'a PageRegistry) -> Self {
        Self {
            mounts,
            pages,
            registry,
        }
    }

    pub fn process(&self, mut request: RequestParameters) -> Outcome {
        match self.mounts.target_for_request(&mut request, self.pages) {
            Ok(Some(target)) => self.respond(target),
            Ok(None) => Outcome::NotFound(format!("no mount for /{}", request.path())),
            Err(err) => failure(err),
        }
    }

    fn respond(&self, target: RequestTarget) -> Outcome {
        match target {
            RequestTarget::BookmarkablePage(target) => self.bookmarkable(target),
            RequestTarget::ListenerInterface(target) => self.resume(target),
            RequestTarget::StatelessListener(target) => self.stateless_listener(target),
        }
    }

    fn bookmarkable(&self, target: BookmarkablePageTarget) -> Outcome {
        let Some(content) = self.registry.create(&target.page_type, &target.parameters) else {
            return unknown_page(&target.page_type);
        };

        if content.stateless {
            return render(PageView {
                page_type: target.page_type.to_string(),
                title: content.title,
                stateless: true,
                page_id: None,
                version: None,
                page_map: target.page_map,
                parameters: target.parameters,
                url: None,
                listener: None,
            });
        }

        let mut page = Page::new(self.pages.next_page_id(), target.page_type, content)
            .with_page_map(target.page_map);
        if let Some(hybrid) = target.hybrid {
            page.metadata.initial_parameters = Some(target.parameters.clone());
            page.metadata.trailing_slashes = Some(hybrid.trailing_slashes);
        }
        let page = self.pages.store(page);
        tracing::debug!(
            page_type = %page.page_type(),
            page_id = page.id(),
            "Created page"
        );

        let url = match self.resume_url(&page) {
            Ok(url) => url,
            Err(err) => return failure(err),
        };
        if let (Some(url), Some(hybrid)) = (&url, target.hybrid) {
            if hybrid.redirect {
                metrics::record_hybrid_redirect();
                tracing::debug!(location = %url, "Redirecting to hybrid URL");
                return Outcome::Redirect(url.clone());
            }
        }
        render(stored_view(&page, target.parameters, url, None))
    }

    fn resume(&self, target: ListenerInterfaceTarget) -> Outcome {
        let url = match self.resume_url(&target.page) {
            Ok(url) => url,
            Err(err) => return failure(err),
        };
        let parameters = target
            .page
            .metadata
            .initial_parameters
            .clone()
            .unwrap_or_default();
        let listener = ListenerView {
            component_path: target.component_path.clone(),
            interface: target.interface.clone(),
        };
        render(stored_view(&target.page, parameters, url, Some(listener)))
    }

    fn stateless_listener(&self, target: StatelessListenerTarget) -> Outcome {
        let Some(content) = self.registry.create(&target.page_type, &target.parameters) else {
            return unknown_page(&target.page_type);
        };
        render(PageView {
            page_type: target.page_type.to_string(),
            title: content.title,
            stateless: content.stateless,
            page_id: None,
            version: None,
            page_map: target.page_map,
            parameters: target.parameters,
            url: None,
            listener: Some(ListenerView {
                component_path: Some(target.component_path),
                interface: target.interface,
            }),
        })
    }

    /// Hybrid URL of a stored page, if some mount can encode it.
    fn resume_url(&self, page: &std::sync::Arc<Page>) -> Result<Option<String>, CodingError> {
        let target = ListenerInterfaceTarget::redirect(page.clone()).into();
        self.mounts.path_for_target(&target)
    }
}

fn render(view: PageView) -> Outcome {
    Outcome::Render(Box::new(view))
}

fn stored_view(
    page: &Page,
    parameters: PageParameters,
    url: Option<String>,
    listener: Option<ListenerView>,
) -> PageView {
    PageView {
        page_type: page.page_type().to_string(),
        title: page.content().title.clone(),
        stateless: false,
        page_id: Some(page.id()),
        version: Some(page.version()),
        page_map: page.page_map().map(str::to_string),
        parameters,
        url,
        listener,
    }
}

fn unknown_page(page_type: &PageType) -> Outcome {
    tracing::error!(page_type = %page_type, "Mounted page type is not registered");
    Outcome::Error(format!("page type `{page_type}` is not registered"))
}

fn failure(err: CodingError) -> Outcome {
    match err.kind() {
        ErrorKind::ClientInput => Outcome::NotFound(err.to_string()),
        ErrorKind::PageExpired => {
            metrics::record_page_expired();
            Outcome::Expired(err.to_string())
        }
        ErrorKind::Programmer => {
            tracing::error!(error = %err, "URL coding failed");
            Outcome::Error(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::coding::{BookmarkableStrategy, HybridStrategy, ParameterEncoding};
    use crate::page::{InMemoryPageStore, PageContent};
    use crate::routing::MountPath;

    struct Fixture {
        mounts: MountTable,
        pages: InMemoryPageStore,
        registry: PageRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            let mut registry = PageRegistry::new();
            registry
                .register_static(PageType::new("app.Wizard"), PageContent::stateful("Wizard"))
                .unwrap();
            registry
                .register_static(PageType::new("app.About"), PageContent::stateless("About"))
                .unwrap();

            let mut mounts = MountTable::new(true);
            mounts
                .mount(Arc::new(HybridStrategy::new(
                    MountPath::new("wizard").unwrap(),
                    PageType::new("app.Wizard"),
                )))
                .unwrap();
            mounts
                .mount(Arc::new(BookmarkableStrategy::new(
                    MountPath::new("about").unwrap(),
                    PageType::new("app.About"),
                    ParameterEncoding::Named,
                )))
                .unwrap();

            Self {
                mounts,
                pages: InMemoryPageStore::default(),
                registry,
            }
        }

        fn process(&self, url: &str) -> Outcome {
            RequestCycle::new(&self.mounts, &self.pages, &self.registry)
                .process(RequestParameters::from_url(url))
        }
    }

    #[test]
    fn test_stateful_hybrid_page_redirects() {
        let fixture = Fixture::new();
        let Outcome::Redirect(location) = fixture.process("/wizard/step/1/") else {
            panic!("expected a redirect");
        };
        assert_eq!(location, "/wizard/step/1/.0");
        assert_eq!(fixture.pages.len(), 1);

        let Outcome::Render(view) = fixture.process(&location) else {
            panic!("expected the stored page");
        };
        assert_eq!(view.page_id, Some(0));
        assert_eq!(view.parameters.get_str("step"), Some("1"));
        assert_eq!(view.url.as_deref(), Some("/wizard/step/1/.0"));
        assert_eq!(fixture.pages.len(), 1);
    }

    #[test]
    fn test_stateless_page_renders() {
        let fixture = Fixture::new();
        let Outcome::Render(view) = fixture.process("/about/lang/en") else {
            panic!("expected a rendered page");
        };
        assert!(view.stateless);
        assert_eq!(view.page_id, None);
        assert!(fixture.pages.is_empty());
    }

    #[test]
    fn test_error_outcomes() {
        let fixture = Fixture::new();
        assert!(matches!(fixture.process("/nowhere"), Outcome::NotFound(_)));
        assert!(matches!(fixture.process("/about/odd"), Outcome::NotFound(_)));

        let mut request = RequestParameters::from_url("/wizard.9");
        request.interface_name = Some("ILinkListener".into());
        let outcome = RequestCycle::new(&fixture.mounts, &fixture.pages, &fixture.registry)
            .process(request);
        assert!(matches!(outcome, Outcome::Expired(_)));
    }

    #[test]
    fn test_stateless_listener() {
        let fixture = Fixture::new();
        let outcome = fixture.process("/about?ui:interface=:form:1:IFormSubmitListener::");
        let Outcome::Render(view) = outcome else {
            panic!("expected a rendered page");
        };
        assert_eq!(
            view.listener,
            Some(ListenerView {
                component_path: Some("form".into()),
                interface: "IFormSubmitListener".into(),
            })
        );
    }
}
