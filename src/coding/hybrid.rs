//! Hybrid mounts: bookmarkable URLs that can also resume a stored page.
//!
//! # Data Flow
//! ```text
//! /blog/2024          → bookmarkable (fresh page, maybe redirect to hybrid URL)
//! /blog/2024.5.1      → resume page 5 version 1 from the page store
//!                       missing page → fresh page, or page expired for callbacks
//! /blog/2024?ui:interface=...
//!                     → stateless listener (callback wins over page info)
//! ```
//!
//! # Design Decisions
//! - Wraps a `BookmarkableStrategy` for parameter coding and adds the page info
//!   codec on top
//! - The trailing slash count of the original URL is kept on the target and
//!   restored when a created page is re-encoded, so relative URLs keep working
//! - What happens on an expired callback is a policy value, not an override
//! - Parameter values are written with their separators escaped, so a dotted
//!   value never reads back as part of the page info

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::coding::strategy::{fragment, stateless_target, take_interface_parameter};
use crate::coding::{
    BookmarkableStrategy, CodingError, PageInfo, PageInfoCodec, ParameterEncoding,
    UrlCodingStrategy,
};
use crate::page::{Page, PageStore, PageType};
use crate::request::{
    BookmarkablePageTarget, HybridOptions, ListenerInterfaceTarget, PageParameters,
    RequestParameters, RequestTarget, INTERFACE_PARAMETER_NAME, REDIRECT_LISTENER,
};
use crate::routing::{MountPath, PathMatcher};

/// What a hybrid mount does when a listener callback addresses a page that
/// is no longer stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiredPagePolicy {
    /// Report `CodingError::PageExpired`.
    #[default]
    Fail,
    /// Construct a fresh page from the URL parameters instead.
    Recreate,
}

#[derive(Debug, Clone)]
pub struct HybridStrategy {
    inner: BookmarkableStrategy,
    codec: PageInfoCodec,
    redirect_on_bookmarkable: bool,
    on_expired: ExpiredPagePolicy,
}

impl HybridStrategy {
    pub fn new(mount: MountPath, page_type: PageType) -> Self {
        Self {
            inner: BookmarkableStrategy::new(mount, page_type, ParameterEncoding::Named),
            codec: PageInfoCodec::default(),
            redirect_on_bookmarkable: true,
            on_expired: ExpiredPagePolicy::Fail,
        }
    }

    pub fn with_encoding(mut self, encoding: ParameterEncoding) -> Self {
        self.inner = BookmarkableStrategy::new(
            self.inner.mount_path().clone(),
            self.inner.page_type().clone(),
            encoding,
        );
        self
    }

    pub fn with_codec(mut self, codec: PageInfoCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn redirect_on_bookmarkable(mut self, redirect: bool) -> Self {
        self.redirect_on_bookmarkable = redirect;
        self
    }

    pub fn on_expired(mut self, policy: ExpiredPagePolicy) -> Self {
        self.on_expired = policy;
        self
    }

    pub fn page_type(&self) -> &PageType {
        self.inner.page_type()
    }

    fn bookmarkable(
        &self,
        parameters: PageParameters,
        page_map: Option<String>,
        options: HybridOptions,
    ) -> RequestTarget {
        let mut target = BookmarkablePageTarget::new(self.page_type().clone(), parameters)
            .with_page_map(page_map);
        target.hybrid = Some(options);
        target.into()
    }

    fn lookup(
        &self,
        pages: &dyn PageStore,
        page_map: Option<&str>,
        id: u32,
        version: u32,
    ) -> Option<Arc<Page>> {
        let page = if page_map.is_none() && self.codec.is_page_id_unique_per_session() {
            pages.page_by_id(id, version)
        } else {
            pages.page(page_map, id, version)
        };
        page.filter(|page| page.page_type() == self.page_type())
    }

    fn unsupported(&self) -> CodingError {
        CodingError::UnsupportedTarget {
            strategy: format!("hybrid mount {}", self.mount_path()),
        }
    }
}

impl UrlCodingStrategy for HybridStrategy {
    fn mount_path(&self) -> &MountPath {
        self.inner.mount_path()
    }

    fn decode(
        &self,
        request: &mut RequestParameters,
        pages: &dyn PageStore,
    ) -> Result<RequestTarget, CodingError> {
        let fragment = fragment(request, self.mount_path()).to_string();
        let extraction = self.codec.extract(&fragment);
        let page_info = extraction.page_info;

        let mut parameters = self
            .inner
            .encoding()
            .decode(extraction.remainder, request.query())?;

        let page_map = match &request.page_map {
            Some(page_map) => Some(page_map.clone()),
            None => {
                let from_url = page_info
                    .as_ref()
                    .and_then(|info| info.page_map())
                    .map(str::to_string);
                request.page_map = from_url.clone();
                from_url
            }
        };

        let options = HybridOptions {
            trailing_slashes: trailing_slashes(extraction.remainder),
            redirect: self.redirect_on_bookmarkable
                || (page_map.as_deref().is_some_and(|pm| !pm.is_empty())
                    && self.codec.is_page_id_unique_per_session()),
        };

        // A callback parameter takes precedence over any page info.
        if take_interface_parameter(request, &mut parameters)? {
            let target = stateless_target(self.page_type().clone(), parameters, page_map, request);
            return Ok(target.into());
        }

        let Some((id, version)) = page_info
            .as_ref()
            .and_then(|info| Some((info.page_id()?, info.version().unwrap_or(0))))
        else {
            return Ok(self.bookmarkable(parameters, page_map, options));
        };

        if let Some(page) = self.lookup(pages, page_map.as_deref(), id, version) {
            tracing::debug!(
                mount = %self.mount_path(),
                page_id = id,
                version,
                "Resuming stored page"
            );
            request.interface_name = Some(REDIRECT_LISTENER.to_string());
            return Ok(ListenerInterfaceTarget::redirect(page).into());
        }

        if request.interface_name.is_some() && self.on_expired == ExpiredPagePolicy::Fail {
            tracing::warn!(
                mount = %self.mount_path(),
                page_map = ?page_map,
                page_id = id,
                version,
                "Listener callback addressed an expired page"
            );
            return Err(CodingError::PageExpired {
                page_map,
                page_id: id,
            });
        }

        tracing::debug!(
            mount = %self.mount_path(),
            page_id = id,
            "Stored page not found, constructing a fresh one"
        );
        Ok(self.bookmarkable(parameters, page_map, options))
    }

    fn encode(&self, target: &RequestTarget) -> Result<String, CodingError> {
        if !self.matches_target(target) {
            return Err(self.unsupported());
        }

        let (parameters, page_info, trailing, interface) = match target {
            RequestTarget::BookmarkablePage(t) => (
                Some(t.parameters.clone()),
                t.page_map.clone().map(PageInfo::page_map_only),
                None,
                None,
            ),
            RequestTarget::StatelessListener(t) => (
                Some(t.parameters.clone()),
                t.page_map.clone().map(PageInfo::page_map_only),
                None,
                Some(t.interface_parameter()),
            ),
            RequestTarget::ListenerInterface(t) => (
                t.page.metadata.initial_parameters.clone(),
                Some(PageInfo::instance(
                    t.page.id(),
                    t.page.version(),
                    t.page.page_map().map(str::to_string),
                )),
                t.page.metadata.trailing_slashes,
                None,
            ),
        };

        let mut encoded = match &parameters {
            Some(parameters) => self.inner.encoding().encode(parameters)?,
            None => Default::default(),
        };
        if let Some(interface) = interface {
            encoded.push_query(INTERFACE_PARAMETER_NAME, &interface.to_string());
        }

        let mut url = format!(
            "/{}{}",
            self.mount_path().as_str(),
            self.codec.escape_separators(&encoded.path)
        );
        if let Some(count) = trailing {
            fix_trailing_slashes(&mut url, count);
        }
        self.codec.append(&mut url, page_info.as_ref());
        if !encoded.query.is_empty() {
            url.push('?');
            url.push_str(&encoded.query);
        }
        Ok(url)
    }

    fn matches_target(&self, target: &RequestTarget) -> bool {
        match target {
            RequestTarget::BookmarkablePage(t) => &t.page_type == self.page_type(),
            RequestTarget::StatelessListener(t) => &t.page_type == self.page_type(),
            RequestTarget::ListenerInterface(t) => {
                t.page.page_type() == self.page_type() && t.is_redirect()
            }
        }
    }

    fn matches_path(&self, path: &str, matcher: PathMatcher) -> bool {
        let Some(rest) = matcher.strip_prefix(path, self.mount_path().as_str()) else {
            return false;
        };
        rest.is_empty() || rest.starts_with('/') || self.codec.parse_suffix(rest).is_some()
    }

    fn matches_request(&self, request: &RequestParameters, matcher: PathMatcher) -> bool {
        // Redirecting an AJAX request to a hybrid URL makes no sense.
        !request.ajax && self.matches_path(request.path(), matcher)
    }

    fn kind(&self) -> &'static str {
        "hybrid"
    }

    fn page_types(&self) -> Vec<PageType> {
        vec![self.page_type().clone()]
    }
}

fn trailing_slashes(s: &str) -> usize {
    s.bytes().rev().take_while(|&b| b == b'/').count()
}

fn fix_trailing_slashes(url: &mut String, desired: usize) {
    let current = trailing_slashes(url);
    if current > desired {
        url.truncate(url.len() - (current - desired));
    } else {
        url.extend(std::iter::repeat('/').take(desired - current));
    }
}
