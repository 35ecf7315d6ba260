//! Cache storage for parsed posts
//!
//! The content store keeps two independent slots: the full, sorted post list
//! and a per-slug map filled by single-post lookups. A per-slug entry is either
//! the post or a recorded miss (missing or unparseable file). Storage is behind
//! the [`PostCache`] trait so a store can be built over any backing map.

use indexmap::IndexSet;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::content::Post;

/// Misses kept by [`MemoryCache`] before the oldest is forgotten
pub const DEFAULT_MISS_CAPACITY: usize = 128;

/// Storage for the content store's caches.
///
/// Implementations only hold values; deciding when to fill or drop them is
/// the store's job. Every method must be safe to call concurrently.
pub trait PostCache: Send + Sync {
    /// The cached full post list, if any
    fn all(&self) -> Option<Arc<Vec<Post>>>;

    /// Replace the full post list
    fn set_all(&self, posts: Arc<Vec<Post>>);

    /// The cached lookup result for a slug.
    ///
    /// `None` when the slug was never looked up, `Some(None)` for a recorded miss.
    fn get(&self, slug: &str) -> Option<Option<Arc<Post>>>;

    /// Record the lookup result for a slug
    fn insert(&self, slug: &str, post: Option<Arc<Post>>);

    /// Drop everything
    fn clear(&self);
}

/// In-memory cache.
///
/// Posts never expire. Misses are kept in insertion order up to a fixed
/// capacity, so requests for made-up slugs cannot grow the cache without bound.
#[derive(Debug)]
pub struct MemoryCache {
    all: RwLock<Option<Arc<Vec<Post>>>>,
    by_slug: RwLock<HashMap<String, Arc<Post>>>,
    misses: RwLock<IndexSet<String>>,
    miss_capacity: usize,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_miss_capacity(DEFAULT_MISS_CAPACITY)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `capacity` misses
    pub fn with_miss_capacity(capacity: usize) -> Self {
        Self {
            all: RwLock::new(None),
            by_slug: RwLock::new(HashMap::new()),
            misses: RwLock::new(IndexSet::new()),
            miss_capacity: capacity,
        }
    }

    /// Number of posts cached by slug
    pub fn slug_count(&self) -> usize {
        self.by_slug
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of recorded misses
    pub fn miss_count(&self) -> usize {
        self.misses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

// Slots are only ever replaced whole; a poisoned lock is recovered.
impl PostCache for MemoryCache {
    fn all(&self) -> Option<Arc<Vec<Post>>> {
        self.all
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_all(&self, posts: Arc<Vec<Post>>) {
        *self.all.write().unwrap_or_else(PoisonError::into_inner) = Some(posts);
    }

    fn get(&self, slug: &str) -> Option<Option<Arc<Post>>> {
        if let Some(post) = self
            .by_slug
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(slug)
        {
            return Some(Some(Arc::clone(post)));
        }

        self.misses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(slug)
            .then_some(None)
    }

    fn insert(&self, slug: &str, post: Option<Arc<Post>>) {
        match post {
            Some(post) => {
                self.by_slug
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(slug.to_string(), post);
            }
            None => {
                if self.miss_capacity == 0 {
                    return;
                }
                let mut misses = self.misses.write().unwrap_or_else(PoisonError::into_inner);
                misses.insert(slug.to_string());
                while misses.len() > self.miss_capacity {
                    misses.shift_remove_index(0);
                }
            }
        }
    }

    fn clear(&self) {
        *self.all.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.by_slug
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.misses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<C: PostCache + ?Sized> PostCache for Arc<C> {
    fn all(&self) -> Option<Arc<Vec<Post>>> {
        (**self).all()
    }

    fn set_all(&self, posts: Arc<Vec<Post>>) {
        (**self).set_all(posts)
    }

    fn get(&self, slug: &str) -> Option<Option<Arc<Post>>> {
        (**self).get(slug)
    }

    fn insert(&self, slug: &str, post: Option<Arc<Post>>) {
        (**self).insert(slug, post)
    }

    fn clear(&self) {
        (**self).clear()
    }
}
