//! Client-side list cache.
//!
//! Entries are keyed by request path plus query string. Each entry is a
//! `OnceCell`, so concurrent readers of a key share a single fetch.

use crate::client::Resource;
use crate::domain::{Page, PageRequest, Pagination};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

type Entry<R> = Arc<OnceCell<Page<R>>>;

pub struct ListCache<R> {
    entries: Mutex<HashMap<String, Entry<R>>>,
}

impl<R> Default for ListCache<R> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<R: Resource> ListCache<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached page for `key`, running `fetch` at most once per key
    /// no matter how many callers race on it. A failed fetch leaves the entry empty.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<Page<R>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Page<R>, E>>,
    {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries.entry(key.to_string()).or_default().clone()
        };
        let page = cell.get_or_try_init(fetch).await?;
        Ok(page.clone())
    }

    pub async fn cached(&self, key: &str) -> Option<Page<R>> {
        let entries = self.entries.lock().await;
        entries.get(key).and_then(|cell| cell.get().cloned())
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn invalidate_all(&self) {
        self.entries.lock().await.clear();
    }

    /// Swaps `item` into every cached page that holds its id.
    pub async fn replace_item(&self, item: &R) {
        self.rewrite(|page| {
            let mut changed = false;
            for slot in page.items.iter_mut().filter(|slot| slot.id() == item.id()) {
                *slot = item.clone();
                changed = true;
            }
            changed
        })
        .await;
    }

    /// Drops the item from every cached page and shrinks the totals to match.
    pub async fn remove_item(&self, id: i32) {
        self.rewrite(|page| {
            let before = page.items.len();
            page.items.retain(|slot| slot.id() != id);
            if page.items.len() == before {
                return false;
            }
            let request = PageRequest {
                page: page.pagination.page,
                limit: page.pagination.limit,
            };
            page.pagination = Pagination::new(request, page.pagination.total.saturating_sub(1));
            true
        })
        .await;
    }

    // Cells are immutable once set, so changed pages get a fresh cell.
    // Entries still being fetched are dropped; their result would be stale.
    async fn rewrite<F>(&self, mut edit: F)
    where
        F: FnMut(&mut Page<R>) -> bool,
    {
        let mut entries = self.entries.lock().await;
        let mut stale = Vec::new();
        for (key, cell) in entries.iter_mut() {
            match cell.get() {
                Some(page) => {
                    let mut page = page.clone();
                    if edit(&mut page) {
                        *cell = Arc::new(OnceCell::new_with(Some(page)));
                    }
                }
                None => stale.push(key.clone()),
            }
        }
        for key in stale {
            entries.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Brand;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn brand(id: i32, name: &str) -> Brand {
        Brand {
            id,
            name: name.to_string(),
        }
    }

    fn page_of(items: Vec<Brand>, total: u64) -> Page<Brand> {
        Page::new(items, PageRequest { page: 1, limit: 2 }, total)
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_fetch() {
        let cache = Arc::new(ListCache::<Brand>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch("brands?", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        Ok::<_, Infallible>(page_of(vec![brand(1, "Fiat")], 1))
                    })
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().items.len(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_fetch_is_retried() {
        let cache = ListCache::<Brand>::new();
        let first: Result<_, &str> = cache.get_or_fetch("k", || async { Err("down") }).await;
        assert!(first.is_err());

        let second: Result<_, &str> = cache
            .get_or_fetch("k", || async { Ok(page_of(vec![brand(1, "Fiat")], 1)) })
            .await;
        assert_eq!(second.unwrap().items[0].name, "Fiat");
    }

    #[tokio::test]
    async fn replace_and_remove_edit_cached_pages() {
        let cache = ListCache::<Brand>::new();
        cache
            .get_or_fetch("k", || async {
                Ok::<_, Infallible>(page_of(vec![brand(1, "Fiat"), brand(2, "Ford")], 3))
            })
            .await
            .unwrap();

        cache.replace_item(&brand(2, "Ford Motor")).await;
        let page = cache.cached("k").await.unwrap();
        assert_eq!(page.items[1].name, "Ford Motor");

        cache.remove_item(1).await;
        let page = cache.cached("k").await.unwrap();
        assert_eq!(page.items, vec![brand(2, "Ford Motor")]);
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.pagination.total_pages, 1);
        assert!(!page.pagination.has_next);

        cache.invalidate_all().await;
        assert!(cache.is_empty().await);
    }
}
