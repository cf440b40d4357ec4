//! URL coding strategies.
//!
//! # Responsibilities
//! - Define the contract every mounted strategy implements
//! - Provide the plain bookmarkable strategy (named, indexed or mixed parameters)
//!
//! # Design Decisions
//! - `encode` refuses targets that `matches_target` rejects; that is a
//!   programmer error, reported as `CodingError::UnsupportedTarget`
//! - The listener callback token always travels in the query string, so every
//!   parameter policy can carry it

use std::fmt;

use crate::coding::{CodingError, ParameterEncoding};
use crate::page::{PageStore, PageType};
use crate::request::{
    BookmarkablePageTarget, PageParameters, RequestParameters, RequestTarget,
    StatelessListenerTarget, INTERFACE_PARAMETER_NAME, PAGE_MAP_PARAMETER_NAME,
    REDIRECT_LISTENER,
};
use crate::routing::{MountPath, PathMatcher};

/// Bidirectional mapping between the URLs under one mount path and request targets.
pub trait UrlCodingStrategy: Send + Sync + fmt::Debug {
    /// The path this strategy is mounted on.
    fn mount_path(&self) -> &MountPath;

    /// Resolve a request under the mount path to a target.
    ///
    /// May fill in listener fields of `request` (page-map, interface name).
    /// `pages` is only consulted by strategies that resume stored pages.
    fn decode(
        &self,
        request: &mut RequestParameters,
        pages: &dyn PageStore,
    ) -> Result<RequestTarget, CodingError>;

    /// Build the URL for `target`, starting with `/`.
    fn encode(&self, target: &RequestTarget) -> Result<String, CodingError>;

    /// Whether `encode` accepts `target`.
    fn matches_target(&self, target: &RequestTarget) -> bool;

    /// Whether `path` (no leading slash) belongs to this mount.
    fn matches_path(&self, path: &str, matcher: PathMatcher) -> bool {
        matcher.matches(path, self.mount_path().as_str())
    }

    /// Whether the request belongs to this mount.
    fn matches_request(&self, request: &RequestParameters, matcher: PathMatcher) -> bool {
        self.matches_path(request.path(), matcher)
    }

    /// Short kind name used in listings and logs.
    fn kind(&self) -> &'static str;

    /// Page types this strategy can produce.
    fn page_types(&self) -> Vec<PageType>;
}

/// The part of the request path after the mount path.
pub(crate) fn fragment<'a>(request: &'a RequestParameters, mount: &MountPath) -> &'a str {
    request.path().get(mount.as_str().len()..).unwrap_or("")
}

/// Remove the `ui:interface` parameter and apply it to the request's listener
/// fields. Returns whether one was present.
pub(crate) fn take_interface_parameter(
    request: &mut RequestParameters,
    parameters: &mut PageParameters,
) -> Result<bool, CodingError> {
    let raw = match parameters.remove(INTERFACE_PARAMETER_NAME) {
        Some(value) => value.first().map(str::to_string),
        None => None,
    };
    match raw {
        Some(raw) => {
            request.apply_interface_parameter(&raw)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Stateless listener target built from the listener fields of `request`.
pub(crate) fn stateless_target(
    page_type: PageType,
    parameters: PageParameters,
    page_map: Option<String>,
    request: &RequestParameters,
) -> StatelessListenerTarget {
    StatelessListenerTarget {
        page_type,
        parameters,
        page_map,
        component_path: request.component_path.clone().unwrap_or_default(),
        interface: request
            .interface_name
            .clone()
            .unwrap_or_else(|| REDIRECT_LISTENER.to_string()),
        version: request.version,
    }
}

/// Finish decoding a bookmarkable URL: resolve the page-map and turn a
/// `ui:interface` parameter into a stateless listener target.
pub(crate) fn bookmarkable_target(
    page_type: PageType,
    mut parameters: PageParameters,
    mount_page_map: Option<&str>,
    request: &mut RequestParameters,
) -> Result<RequestTarget, CodingError> {
    let from_url = parameters
        .remove(PAGE_MAP_PARAMETER_NAME)
        .and_then(|value| value.first().map(str::to_string))
        .filter(|name| !name.is_empty());
    let page_map = match &request.page_map {
        Some(page_map) => Some(page_map.clone()),
        None => {
            request.page_map = from_url.clone();
            from_url.or_else(|| mount_page_map.map(str::to_string))
        }
    };

    if take_interface_parameter(request, &mut parameters)? {
        return Ok(stateless_target(page_type, parameters, page_map, request).into());
    }
    Ok(BookmarkablePageTarget::new(page_type, parameters)
        .with_page_map(page_map)
        .into())
}

/// Encode a bookmarkable or stateless listener target below `path`.
/// Returns `None` for listener targets on stored pages.
pub(crate) fn encode_bookmarkable(
    mut path: String,
    encoding: &ParameterEncoding,
    mount_has_page_map: bool,
    target: &RequestTarget,
) -> Option<Result<String, CodingError>> {
    let (parameters, page_map, interface) = match target {
        RequestTarget::BookmarkablePage(t) => (&t.parameters, &t.page_map, None),
        RequestTarget::StatelessListener(t) => {
            (&t.parameters, &t.page_map, Some(t.interface_parameter()))
        }
        RequestTarget::ListenerInterface(_) => return None,
    };

    let mut parameters = parameters.clone();
    if !mount_has_page_map {
        if let Some(page_map) = page_map {
            parameters.insert(PAGE_MAP_PARAMETER_NAME, page_map.as_str());
        }
    }

    let mut encoded = match encoding.encode(&parameters) {
        Ok(encoded) => encoded,
        Err(err) => return Some(Err(err)),
    };
    if let Some(interface) = interface {
        encoded.push_query(INTERFACE_PARAMETER_NAME, &interface.to_string());
    }
    path.push_str(&encoded.to_string());
    Some(Ok(path))
}

/// Mounts one bookmarkable page type; every URL under the mount constructs a
/// fresh instance.
#[derive(Debug, Clone)]
pub struct BookmarkableStrategy {
    mount: MountPath,
    page_type: PageType,
    page_map: Option<String>,
    encoding: ParameterEncoding,
}

impl BookmarkableStrategy {
    pub fn new(mount: MountPath, page_type: PageType, encoding: ParameterEncoding) -> Self {
        Self {
            mount,
            page_type,
            page_map: None,
            encoding,
        }
    }

    /// Restrict the strategy to targets in `page_map`.
    pub fn with_page_map(mut self, page_map: Option<String>) -> Self {
        self.page_map = page_map.filter(|name| !name.is_empty());
        self
    }

    pub fn page_type(&self) -> &PageType {
        &self.page_type
    }

    pub fn page_map(&self) -> Option<&str> {
        self.page_map.as_deref()
    }

    pub fn encoding(&self) -> &ParameterEncoding {
        &self.encoding
    }

    fn unsupported(&self) -> CodingError {
        CodingError::UnsupportedTarget {
            strategy: format!("{} mount {}", self.kind(), self.mount),
        }
    }
}

impl UrlCodingStrategy for BookmarkableStrategy {
    fn mount_path(&self) -> &MountPath {
        &self.mount
    }

    fn decode(
        &self,
        request: &mut RequestParameters,
        _pages: &dyn PageStore,
    ) -> Result<RequestTarget, CodingError> {
        let parameters = self
            .encoding
            .decode(fragment(request, &self.mount), request.query())?;
        bookmarkable_target(
            self.page_type.clone(),
            parameters,
            self.page_map.as_deref(),
            request,
        )
    }

    fn encode(&self, target: &RequestTarget) -> Result<String, CodingError> {
        if !self.matches_target(target) {
            return Err(self.unsupported());
        }
        let path = format!("/{}", self.mount.as_str());
        encode_bookmarkable(path, &self.encoding, self.page_map.is_some(), target)
            .unwrap_or_else(|| Err(self.unsupported()))
    }

    fn matches_target(&self, target: &RequestTarget) -> bool {
        let (page_type, page_map) = match target {
            RequestTarget::BookmarkablePage(t) => (&t.page_type, &t.page_map),
            RequestTarget::StatelessListener(t) => (&t.page_type, &t.page_map),
            RequestTarget::ListenerInterface(_) => return false,
        };
        if page_type != &self.page_type {
            return false;
        }
        match &self.page_map {
            None => true,
            Some(own) => page_map.as_deref() == Some(own.as_str()),
        }
    }

    fn kind(&self) -> &'static str {
        self.encoding.name()
    }

    fn page_types(&self) -> Vec<PageType> {
        vec![self.page_type.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coding::MixedParameters;
    use crate::page::InMemoryPageStore;

    fn strategy(encoding: ParameterEncoding) -> BookmarkableStrategy {
        BookmarkableStrategy::new(
            MountPath::new("/blog").unwrap(),
            PageType::new("blog.Article"),
            encoding,
        )
    }

    fn mixed() -> ParameterEncoding {
        let names = vec!["year".to_string(), "slug".to_string()];
        ParameterEncoding::Mixed(MixedParameters::new(names, true).unwrap())
    }

    fn decode(strategy: &BookmarkableStrategy, url: &str) -> Result<RequestTarget, CodingError> {
        let mut request = RequestParameters::from_url(url);
        strategy.decode(&mut request, &InMemoryPageStore::default())
    }

    #[test]
    fn test_named_decode_and_encode() {
        let strategy = strategy(ParameterEncoding::Named);
        let target = decode(&strategy, "/blog/id/7/lang/en").unwrap();
        let RequestTarget::BookmarkablePage(page) = &target else {
            panic!("expected a bookmarkable target, got {target}");
        };
        assert_eq!(page.parameters.get_str("id"), Some("7"));
        assert_eq!(page.parameters.get_str("lang"), Some("en"));
        assert_eq!(page.page_map, None);

        assert_eq!(strategy.encode(&target).unwrap(), "/blog/id/7/lang/en");
    }

    #[test]
    fn test_bare_mount_encodes_without_slash() {
        let strategy = strategy(ParameterEncoding::Named);
        let target = BookmarkablePageTarget::new(PageType::new("blog.Article"), PageParameters::new());
        assert_eq!(strategy.encode(&target.into()).unwrap(), "/blog");
    }

    #[test]
    fn test_odd_segments_are_client_errors() {
        let strategy = strategy(ParameterEncoding::Named);
        let err = decode(&strategy, "/blog/id/7/lang").unwrap_err();
        assert_eq!(err.kind(), crate::coding::ErrorKind::ClientInput);
    }

    #[test]
    fn test_page_map_parameter_round_trip() {
        let strategy = strategy(mixed());
        let target = BookmarkablePageTarget::new(
            PageType::new("blog.Article"),
            [("year", "2024")].into_iter().collect(),
        )
        .with_page_map(Some("tab".into()));

        let url = strategy.encode(&target.clone().into()).unwrap();
        assert_eq!(url, "/blog/2024?ui%3ApageMapName=tab");

        let mut request = RequestParameters::from_url(&url);
        let decoded = strategy
            .decode(&mut request, &InMemoryPageStore::default())
            .unwrap();
        assert_eq!(decoded, target.into());
        assert_eq!(request.page_map.as_deref(), Some("tab"));
    }

    #[test]
    fn test_stateless_listener_round_trip() {
        let strategy = strategy(ParameterEncoding::Named);
        let target = StatelessListenerTarget {
            page_type: PageType::new("blog.Article"),
            parameters: [("id", "7")].into_iter().collect(),
            page_map: None,
            component_path: "form:submit".into(),
            interface: "IFormSubmitListener".into(),
            version: Some(0),
        };

        let url = strategy.encode(&target.clone().into()).unwrap();
        assert!(url.starts_with("/blog/id/7?ui%3Ainterface="));

        let mut request = RequestParameters::from_url(&url);
        let decoded = strategy
            .decode(&mut request, &InMemoryPageStore::default())
            .unwrap();
        assert_eq!(decoded, target.into());
        assert_eq!(request.interface_name.as_deref(), Some("IFormSubmitListener"));
    }

    #[test]
    fn test_page_map_restricts_matching() {
        let strategy = strategy(ParameterEncoding::Named).with_page_map(Some("tab".into()));
        let in_tab = BookmarkablePageTarget::new(PageType::new("blog.Article"), PageParameters::new())
            .with_page_map(Some("tab".into()));
        let elsewhere =
            BookmarkablePageTarget::new(PageType::new("blog.Article"), PageParameters::new());
        let other_page = BookmarkablePageTarget::new(PageType::new("Home"), PageParameters::new())
            .with_page_map(Some("tab".into()));

        assert!(strategy.matches_target(&in_tab.clone().into()));
        assert!(!strategy.matches_target(&elsewhere.clone().into()));
        assert!(!strategy.matches_target(&other_page.into()));

        // The mount's own page-map is implied, not written into the URL.
        assert_eq!(strategy.encode(&in_tab.into()).unwrap(), "/blog");
        assert!(matches!(
            strategy.encode(&elsewhere.into()),
            Err(CodingError::UnsupportedTarget { .. })
        ));
    }

    #[test]
    fn test_mount_page_map_applies_on_decode() {
        let strategy = strategy(ParameterEncoding::Named).with_page_map(Some("tab".into()));
        let target = decode(&strategy, "/blog").unwrap();
        let RequestTarget::BookmarkablePage(page) = target else {
            panic!("expected a bookmarkable target");
        };
        assert_eq!(page.page_map.as_deref(), Some("tab"));
    }

    #[test]
    fn test_indexed_mount() {
        let strategy = strategy(ParameterEncoding::Indexed);
        let target = decode(&strategy, "/blog/2024/05/").unwrap();
        assert_eq!(strategy.encode(&target).unwrap(), "/blog/2024/05");

        let bad = BookmarkablePageTarget::new(
            PageType::new("blog.Article"),
            [("0", "a"), ("x", "b")].into_iter().collect(),
        );
        let err = strategy.encode(&bad.into()).unwrap_err();
        assert_eq!(err.kind(), crate::coding::ErrorKind::Programmer);
    }
}
