//! The mount table: mount path → coding strategy.
//!
//! # Responsibilities
//! - Register, remove and ignore mount paths
//! - Find the strategy for an inbound request (longest mount first)
//! - Find the URL for an outbound target (first strategy that accepts it)
//!
//! # Design Decisions
//! - Entries are kept in descending key order, so `a/b` is tried before `a`
//! - An ignored path shadows every mount below it and resolves to nothing
//! - The table is built, then frozen behind `MountRegistry`; it is never
//!   mutated while requests are served

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::coding::{CodingError, UrlCodingStrategy};
use crate::observability::metrics;
use crate::page::PageStore;
use crate::request::{RequestParameters, RequestTarget};
use crate::routing::{MountError, MountPath, PathMatcher};

/// One registered mount.
#[derive(Debug, Clone)]
pub enum MountEntry {
    Strategy(Arc<dyn UrlCodingStrategy>),
    /// Pass-through path: requests below it are not handled by any mount.
    Ignored(MountPath),
}

impl MountEntry {
    fn path(&self) -> &MountPath {
        match self {
            MountEntry::Strategy(strategy) => strategy.mount_path(),
            MountEntry::Ignored(path) => path,
        }
    }

    fn matches(&self, request: &RequestParameters, matcher: PathMatcher) -> bool {
        match self {
            MountEntry::Strategy(strategy) => strategy.matches_request(request, matcher),
            MountEntry::Ignored(path) => matcher.matches(request.path(), path.as_str()),
        }
    }
}

/// Listing entry for a mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountInfo {
    pub path: String,
    pub kind: &'static str,
    pub pages: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MountTable {
    entries: BTreeMap<Reverse<String>, MountEntry>,
    matcher: PathMatcher,
}

impl MountTable {
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            entries: BTreeMap::new(),
            matcher: PathMatcher::new(case_sensitive),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mount `strategy` on its own mount path.
    pub fn mount(&mut self, strategy: Arc<dyn UrlCodingStrategy>) -> Result<(), MountError> {
        let path = strategy.mount_path().clone();
        tracing::info!(
            path = %path,
            kind = strategy.kind(),
            "Mounting strategy"
        );
        self.insert(path, MountEntry::Strategy(strategy))
    }

    /// Make `path` and everything below it bypass the mounts.
    pub fn ignore(&mut self, path: &str) -> Result<(), MountError> {
        let path = MountPath::new(path)?;
        tracing::info!(path = %path, "Ignoring mount path");
        self.insert(path.clone(), MountEntry::Ignored(path))
    }

    /// Remove whatever is mounted at `path`.
    pub fn unmount(&mut self, path: &str) -> Result<MountEntry, MountError> {
        let path = MountPath::new(path)?;
        let key = Reverse(path.key(self.matcher.is_case_sensitive()));
        let entry = self
            .entries
            .remove(&key)
            .ok_or_else(|| MountError::NotMounted(path.to_string()))?;
        tracing::info!(path = %path, "Unmounted");
        Ok(entry)
    }

    fn insert(&mut self, path: MountPath, entry: MountEntry) -> Result<(), MountError> {
        let key = Reverse(path.key(self.matcher.is_case_sensitive()));
        if self.entries.contains_key(&key) {
            return Err(MountError::AlreadyMounted(path.to_string()));
        }
        self.entries.insert(key, entry);
        Ok(())
    }

    fn entry_for_request(&self, request: &RequestParameters) -> Option<&MountEntry> {
        self.entries
            .values()
            .find(|entry| entry.matches(request, self.matcher))
    }

    /// The strategy responsible for `request`, if any.
    pub fn strategy_for_request(
        &self,
        request: &RequestParameters,
    ) -> Option<Arc<dyn UrlCodingStrategy>> {
        match self.entry_for_request(request)? {
            MountEntry::Strategy(strategy) => Some(strategy.clone()),
            MountEntry::Ignored(_) => None,
        }
    }

    /// The strategy responsible for `path` (leading slash optional).
    pub fn strategy_for_path(&self, path: &str) -> Option<Arc<dyn UrlCodingStrategy>> {
        self.strategy_for_request(&RequestParameters::new(path))
    }

    /// Decode `request` with the responsible strategy.
    /// `Ok(None)` when no mount handles the path.
    pub fn target_for_request(
        &self,
        request: &mut RequestParameters,
        pages: &dyn PageStore,
    ) -> Result<Option<RequestTarget>, CodingError> {
        let Some(strategy) = self.strategy_for_request(request) else {
            tracing::debug!(path = %request.path(), "No mount for path");
            metrics::record_decode("no_mount");
            return Ok(None);
        };

        match strategy.decode(request, pages) {
            Ok(target) => {
                metrics::record_decode("ok");
                tracing::debug!(
                    mount = %strategy.mount_path(),
                    target = %target,
                    "Decoded request"
                );
                Ok(Some(target))
            }
            Err(err) => {
                metrics::record_decode(err.kind().as_str());
                tracing::debug!(
                    mount = %strategy.mount_path(),
                    error = %err,
                    "Failed to decode request"
                );
                Err(err)
            }
        }
    }

    /// URL of `target` under the first mount that accepts it.
    /// `Ok(None)` when no mount does.
    pub fn path_for_target(&self, target: &RequestTarget) -> Result<Option<String>, CodingError> {
        let strategy = self.entries.values().find_map(|entry| match entry {
            MountEntry::Strategy(strategy) if strategy.matches_target(target) => Some(strategy),
            _ => None,
        });
        let Some(strategy) = strategy else {
            metrics::record_encode("no_mount");
            return Ok(None);
        };

        match strategy.encode(target) {
            Ok(url) => {
                metrics::record_encode("ok");
                Ok(Some(url))
            }
            Err(err) => {
                metrics::record_encode(err.kind().as_str());
                tracing::error!(
                    mount = %strategy.mount_path(),
                    error = %err,
                    "Failed to encode target"
                );
                Err(err)
            }
        }
    }

    /// Mounts in lookup order.
    pub fn list(&self) -> Vec<MountInfo> {
        self.entries
            .values()
            .map(|entry| match entry {
                MountEntry::Strategy(strategy) => MountInfo {
                    path: entry.path().to_string(),
                    kind: strategy.kind(),
                    pages: strategy
                        .page_types()
                        .iter()
                        .map(|page_type| page_type.to_string())
                        .collect(),
                },
                MountEntry::Ignored(path) => MountInfo {
                    path: path.to_string(),
                    kind: "ignored",
                    pages: Vec::new(),
                },
            })
            .collect()
    }
}
