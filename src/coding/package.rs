//! Package mounts: every page of a package under one path.
//!
//! `blog/Article/id/7` on a mount `blog` bound to package `app.blog` resolves to
//! page type `app.blog.Article` with parameters `id=7`.

use std::collections::BTreeMap;

use crate::coding::encoding::{decode_path_segment, encode_path_segment};
use crate::coding::strategy::{bookmarkable_target, encode_bookmarkable, fragment};
use crate::coding::{CodingError, ParameterEncoding, UrlCodingStrategy};
use crate::page::{PageStore, PageType};
use crate::request::{RequestParameters, RequestTarget};
use crate::routing::{MountError, MountPath};

#[derive(Debug, Clone)]
pub struct PackageStrategy {
    mount: MountPath,
    package: String,
    /// Simple name → page type, captured when the mount is created.
    members: BTreeMap<String, PageType>,
}

impl PackageStrategy {
    /// Mount the given members of `package`. Page types outside the package
    /// are skipped.
    pub fn new(
        mount: MountPath,
        package: impl Into<String>,
        page_types: impl IntoIterator<Item = PageType>,
    ) -> Result<Self, MountError> {
        let package = package.into();
        if package.is_empty() {
            return Err(MountError::MissingPackage(mount.to_string()));
        }
        let members: BTreeMap<String, PageType> = page_types
            .into_iter()
            .filter(|page_type| page_type.package() == Some(package.as_str()))
            .map(|page_type| (page_type.simple_name().to_string(), page_type))
            .collect();
        if members.is_empty() {
            return Err(MountError::EmptyPackage(package));
        }
        Ok(Self {
            mount,
            package,
            members,
        })
    }

    pub fn package(&self) -> &str {
        &self.package
    }
}

impl UrlCodingStrategy for PackageStrategy {
    fn mount_path(&self) -> &MountPath {
        &self.mount
    }

    fn decode(
        &self,
        request: &mut RequestParameters,
        _pages: &dyn PageStore,
    ) -> Result<RequestTarget, CodingError> {
        let remainder = fragment(request, &self.mount);
        let remainder = remainder.strip_prefix('/').unwrap_or(remainder);
        let (simple_name, parameters_fragment) = match remainder.find('/') {
            Some(ix) => remainder.split_at(ix),
            None => (remainder, ""),
        };

        let simple_name = decode_path_segment(simple_name);
        let page_type = self
            .members
            .get(&simple_name)
            .cloned()
            .ok_or_else(|| CodingError::UnknownPage(format!("{}.{}", self.package, simple_name)))?;

        let parameters = ParameterEncoding::Named.decode(parameters_fragment, request.query())?;
        bookmarkable_target(page_type, parameters, None, request)
    }

    fn encode(&self, target: &RequestTarget) -> Result<String, CodingError> {
        let unsupported = || CodingError::UnsupportedTarget {
            strategy: format!("package mount {}", self.mount),
        };
        if !self.matches_target(target) {
            return Err(unsupported());
        }
        let page_type = match target {
            RequestTarget::BookmarkablePage(t) => &t.page_type,
            RequestTarget::StatelessListener(t) => &t.page_type,
            RequestTarget::ListenerInterface(_) => return Err(unsupported()),
        };
        let path = format!(
            "/{}/{}",
            self.mount.as_str(),
            encode_path_segment(page_type.simple_name())
        );
        encode_bookmarkable(path, &ParameterEncoding::Named, false, target)
            .unwrap_or_else(|| Err(unsupported()))
    }

    fn matches_target(&self, target: &RequestTarget) -> bool {
        let page_type = match target {
            RequestTarget::BookmarkablePage(t) => &t.page_type,
            RequestTarget::StatelessListener(t) => &t.page_type,
            RequestTarget::ListenerInterface(_) => return false,
        };
        self.members.get(page_type.simple_name()) == Some(page_type)
    }

    fn kind(&self) -> &'static str {
        "package"
    }

    fn page_types(&self) -> Vec<PageType> {
        self.members.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::InMemoryPageStore;
    use crate::request::{BookmarkablePageTarget, PageParameters};

    fn strategy() -> PackageStrategy {
        PackageStrategy::new(
            MountPath::new("blog").unwrap(),
            "app.blog",
            [
                PageType::new("app.blog.Article"),
                PageType::new("app.blog.Archive"),
                PageType::new("app.Home"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_decode_simple_name() {
        let mut request = RequestParameters::from_url("/blog/Article/id/7");
        let target = strategy()
            .decode(&mut request, &InMemoryPageStore::default())
            .unwrap();
        let RequestTarget::BookmarkablePage(target) = target else {
            panic!("expected a bookmarkable target");
        };
        assert_eq!(target.page_type, PageType::new("app.blog.Article"));
        assert_eq!(target.parameters.get_str("id"), Some("7"));

        let mut request = RequestParameters::from_url("/blog/Archive");
        let target = strategy()
            .decode(&mut request, &InMemoryPageStore::default())
            .unwrap();
        assert_eq!(strategy().encode(&target).unwrap(), "/blog/Archive");
    }

    #[test]
    fn test_unknown_page_is_client_error() {
        for url in ["/blog/Missing", "/blog", "/blog/Home"] {
            let mut request = RequestParameters::from_url(url);
            let err = strategy()
                .decode(&mut request, &InMemoryPageStore::default())
                .unwrap_err();
            assert!(matches!(err, CodingError::UnknownPage(_)), "{url}: {err}");
        }
    }

    #[test]
    fn test_encode() {
        let target = BookmarkablePageTarget::new(
            PageType::new("app.blog.Article"),
            [("id", "7")].into_iter().collect(),
        );
        assert_eq!(strategy().encode(&target.into()).unwrap(), "/blog/Article/id/7");

        let outside = BookmarkablePageTarget::new(PageType::new("app.Home"), PageParameters::new());
        assert!(!strategy().matches_target(&outside.clone().into()));
        assert!(strategy().encode(&outside.into()).is_err());
    }

    #[test]
    fn test_package_must_have_members() {
        let err = PackageStrategy::new(
            MountPath::new("x").unwrap(),
            "nothing",
            [PageType::new("app.Home")],
        )
        .unwrap_err();
        assert_eq!(err, MountError::EmptyPackage("nothing".into()));
    }
}
