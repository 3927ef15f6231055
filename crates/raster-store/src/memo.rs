//! In-process memo for rendered layer handles.
//!
//! One instance per process, injected into `RasterCache`; repeated requests
//! for the same key within a session are served without touching storage.
//! The lru bound keeps a long session from accumulating handles forever.

use lru::LruCache;
use std::num::NonZeroUsize;
use tokio::sync::RwLock;

use crate::cache::RasterHandles;

pub struct LayerMemo {
    inner: RwLock<LruCache<String, RasterHandles>>,
}

impl LayerMemo {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: RwLock::new(LruCache::new(capacity)),
        }
    }

    pub async fn get(&self, key: &str) -> Option<RasterHandles> {
        self.inner.write().await.get(key).cloned()
    }

    pub async fn put(&self, key: String, handles: RasterHandles) {
        self.inner.write().await.put(key, handles);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
