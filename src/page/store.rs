//! Session page store.
//!
//! # Responsibilities
//! - Allocate page ids
//! - Keep stateful page instances for later hybrid resume
//! - Look pages up by (page-map, id, version) or by (id, version) alone
//! - Evict the oldest pages once the capacity is reached
//!
//! # Design Decisions
//! - Backed by `DashMap` so request handlers share it without an outer lock
//! - Eviction is oldest-insert-first; an evicted page behaves like an expired one
//! - Insert order and the id lookup are kept in side indexes, so neither a
//!   full store nor a unique-id lookup scans the page map

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::observability::metrics;
use crate::page::Page;

/// Lookup and storage of page instances.
pub trait PageStore: Send + Sync {
    /// Page stored under `page_map` (`None` = default page-map).
    fn page(&self, page_map: Option<&str>, id: u32, version: u32) -> Option<Arc<Page>>;

    /// Page stored under any page-map. Valid when page ids are unique per session.
    fn page_by_id(&self, id: u32, version: u32) -> Option<Arc<Page>>;

    /// Store a page, returning the shared instance.
    fn store(&self, page: Page) -> Arc<Page>;

    /// Allocate the next page id.
    fn next_page_id(&self) -> u32;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PageKey {
    page_map: String,
    id: u32,
    version: u32,
}

impl PageKey {
    fn new(page_map: Option<&str>, id: u32, version: u32) -> Self {
        Self {
            page_map: page_map.unwrap_or_default().to_string(),
            id,
            version,
        }
    }
}

#[derive(Debug)]
struct StoredPage {
    sequence: u64,
    page: Arc<Page>,
}

/// In-memory page store with a fixed capacity.
#[derive(Debug)]
pub struct InMemoryPageStore {
    pages: DashMap<PageKey, StoredPage>,
    /// (id, version) → key of the page stored last under that id.
    by_id: DashMap<(u32, u32), PageKey>,
    /// Insert sequence → key, oldest first. Writers serialize on this lock.
    order: Mutex<BTreeMap<u64, PageKey>>,
    next_id: AtomicU32,
    sequence: AtomicU64,
    capacity: usize,
}

impl InMemoryPageStore {
    /// Create a store keeping at most `capacity` page versions.
    pub fn new(capacity: usize) -> Self {
        Self {
            pages: DashMap::new(),
            by_id: DashMap::new(),
            order: Mutex::new(BTreeMap::new()),
            next_id: AtomicU32::new(0),
            sequence: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    /// Remove every version of a page.
    pub fn evict(&self, page_map: Option<&str>, id: u32) {
        let page_map = page_map.unwrap_or_default();
        let mut order = self.order.lock().expect("page order mutex poisoned");
        let evicted: Vec<PageKey> = order
            .values()
            .filter(|key| key.page_map == page_map && key.id == id)
            .cloned()
            .collect();
        order.retain(|_, key| !(key.page_map == page_map && key.id == id));
        for key in &evicted {
            self.remove(key);
        }
        metrics::record_page_store_size(self.pages.len());
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn remove(&self, key: &PageKey) {
        self.pages.remove(key);
        self.by_id
            .remove_if(&(key.id, key.version), |_, indexed| indexed == key);
    }
}

impl Default for InMemoryPageStore {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl PageStore for InMemoryPageStore {
    fn page(&self, page_map: Option<&str>, id: u32, version: u32) -> Option<Arc<Page>> {
        self.pages
            .get(&PageKey::new(page_map, id, version))
            .map(|entry| entry.value().page.clone())
    }

    fn page_by_id(&self, id: u32, version: u32) -> Option<Arc<Page>> {
        let key = self.by_id.get(&(id, version))?.value().clone();
        self.pages.get(&key).map(|entry| entry.value().page.clone())
    }

    fn store(&self, page: Page) -> Arc<Page> {
        let key = PageKey::new(page.page_map(), page.id(), page.version());
        let page = Arc::new(page);
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);

        let mut order = self.order.lock().expect("page order mutex poisoned");
        let replaced = self.pages.insert(
            key.clone(),
            StoredPage {
                sequence,
                page: page.clone(),
            },
        );
        if let Some(replaced) = replaced {
            order.remove(&replaced.sequence);
        }
        order.insert(sequence, key.clone());
        self.by_id.insert((key.id, key.version), key);

        while self.pages.len() > self.capacity {
            let Some((_, oldest)) = order.pop_first() else {
                break;
            };
            tracing::debug!(page_map = %oldest.page_map, page_id = oldest.id, version = oldest.version, "Evicting page");
            self.remove(&oldest);
        }
        metrics::record_page_store_size(self.pages.len());
        page
    }

    fn next_page_id(&self) -> u32 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{PageContent, PageType};

    fn page(id: u32, page_map: Option<&str>) -> Page {
        Page::new(id, PageType::new("Home"), PageContent::stateful("Home"))
            .with_page_map(page_map.map(str::to_string))
    }

    #[test]
    fn test_lookup_by_page_map_and_version() {
        let store = InMemoryPageStore::new(10);
        store.store(page(7, Some("m")).with_version(1));

        assert!(store.page(Some("m"), 7, 1).is_some());
        assert!(store.page(Some("m"), 7, 0).is_none());
        assert!(store.page(None, 7, 1).is_none());
        assert!(store.page_by_id(7, 1).is_some());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let store = InMemoryPageStore::new(2);
        store.store(page(1, None));
        store.store(page(2, None));
        store.store(page(3, None));

        assert_eq!(store.len(), 2);
        assert!(store.page(None, 1, 0).is_none());
        assert!(store.page(None, 3, 0).is_some());
    }

    #[test]
    fn test_evict_removes_all_versions() {
        let store = InMemoryPageStore::new(10);
        store.store(page(4, None));
        store.store(page(4, None).with_version(1));
        store.store(page(5, None));
        store.evict(None, 4);

        assert_eq!(store.len(), 1);
        assert!(store.page(None, 4, 1).is_none());
    }

    #[test]
    fn test_restore_refreshes_eviction_order() {
        let store = InMemoryPageStore::new(2);
        store.store(page(1, None));
        store.store(page(2, None));
        store.store(page(1, None));
        store.store(page(3, None));

        assert_eq!(store.len(), 2);
        assert!(store.page(None, 1, 0).is_some());
        assert!(store.page(None, 2, 0).is_none());
    }

    #[test]
    fn test_id_index_follows_eviction() {
        let store = InMemoryPageStore::new(2);
        store.store(page(1, Some("a")));
        store.store(page(2, Some("b")));
        assert_eq!(store.page_by_id(2, 0).unwrap().page_map(), Some("b"));

        store.store(page(3, None));
        assert!(store.page_by_id(1, 0).is_none());
        assert!(store.page_by_id(3, 0).is_some());

        store.evict(Some("b"), 2);
        assert!(store.page_by_id(2, 0).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_page_ids_are_sequential() {
        let store = InMemoryPageStore::default();
        assert_eq!(store.next_page_id(), 0);
        assert_eq!(store.next_page_id(), 1);
    }
}
