//! Content store - cached queries over the posts directory
//!
//! Posts are parsed from disk on first use and kept until [`ContentStore::clear_cache`].
//! Nothing expires on its own: edits to the files are only picked up after a
//! clear or a restart.
//!
//! A cache fill reads the directory and parses every file without holding any
//! lock, then publishes the finished list in one step. Clearing bumps a
//! generation number under the same mutex that guards publishing, so a fill
//! that started before a clear is returned to its caller but never cached.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use walkdir::WalkDir;

use crate::cache::{MemoryCache, PostCache};
use crate::config::HighlightConfig;
use crate::content::{normalize_tag, ParseFailure, Post, PostParser};

/// Number of posts returned by `load_recent` when the caller has no preference
pub const DEFAULT_RECENT_LIMIT: usize = 3;

/// Work done by a store since it was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Times the posts directory was listed
    pub directory_scans: usize,
    /// Documents handed to the parser, successful or not
    pub files_parsed: usize,
}

/// Read-through cache over a directory of markdown posts
pub struct ContentStore<C: PostCache = MemoryCache> {
    posts_dir: PathBuf,
    parser: PostParser,
    cache: C,
    stylesheet: RwLock<Option<Arc<str>>>,
    generation: Mutex<u64>,
    directory_scans: AtomicUsize,
    files_parsed: AtomicUsize,
}

impl ContentStore<MemoryCache> {
    /// Create a store with an in-memory cache
    pub fn new<P: Into<PathBuf>>(posts_dir: P, highlight: &HighlightConfig) -> Self {
        Self::with_cache(posts_dir, highlight, MemoryCache::new())
    }
}

impl<C: PostCache> ContentStore<C> {
    /// Create a store over the given cache storage
    pub fn with_cache<P: Into<PathBuf>>(posts_dir: P, highlight: &HighlightConfig, cache: C) -> Self {
        Self {
            posts_dir: posts_dir.into(),
            parser: PostParser::new(highlight),
            cache,
            stylesheet: RwLock::new(None),
            generation: Mutex::new(0),
            directory_scans: AtomicUsize::new(0),
            files_parsed: AtomicUsize::new(0),
        }
    }

    /// Directory the posts are read from
    pub fn posts_dir(&self) -> &Path {
        &self.posts_dir
    }

    /// All posts, newest first
    pub fn load_all(&self) -> Arc<Vec<Post>> {
        if let Some(posts) = self.cache.all() {
            tracing::debug!("Post list cache hit ({} posts)", posts.len());
            return posts;
        }

        let started = self.generation();
        let posts = Arc::new(self.scan());
        self.publish(started, || self.cache.set_all(Arc::clone(&posts)));
        posts
    }

    /// The newest `limit` posts
    pub fn load_recent(&self, limit: usize) -> Vec<Post> {
        self.load_all().iter().take(limit).cloned().collect()
    }

    /// A single post by slug, `None` if it is missing or cannot be parsed.
    ///
    /// Both outcomes are cached: a slug that was not found stays not found
    /// until the cache is cleared, even if its file appears meanwhile.
    pub fn load_by_slug(&self, slug: &str) -> Option<Arc<Post>> {
        if !is_valid_slug(slug) {
            tracing::debug!("Rejected slug {:?}", slug);
            return None;
        }

        if let Some(entry) = self.cache.get(slug) {
            tracing::debug!("Post cache hit: {} (found: {})", slug, entry.is_some());
            return entry;
        }

        let started = self.generation();
        let path = self.posts_dir.join(format!("{}.md", slug));
        let post = if !path.is_file() {
            tracing::debug!("No post for slug {:?}", slug);
            None
        } else {
            match self.parse(&path) {
                Ok(post) => Some(Arc::new(post)),
                Err(e) => {
                    tracing::warn!("Failed to load post {:?}: {}", slug, e);
                    None
                }
            }
        };

        self.publish(started, || self.cache.insert(slug, post.clone()));
        post
    }

    /// Posts carrying `tag`, newest first. The tag is matched case-insensitively.
    pub fn load_by_tag(&self, tag: &str) -> Vec<Post> {
        let tag = normalize_tag(tag);
        self.load_all()
            .iter()
            .filter(|post| post.has_tag(&tag))
            .cloned()
            .collect()
    }

    /// Every tag in use, sorted and without duplicates
    pub fn list_all_tags(&self) -> Vec<String> {
        let posts = self.load_all();
        let tags: BTreeSet<&str> = posts
            .iter()
            .flat_map(|post| post.tags.iter().map(String::as_str))
            .collect();
        tags.into_iter().map(str::to_string).collect()
    }

    /// Number of posts per tag, most used first, ties by name
    pub fn tag_counts(&self) -> Vec<(String, usize)> {
        let posts = self.load_all();
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for post in posts.iter() {
            let distinct: BTreeSet<&str> = post.tags.iter().map(String::as_str).collect();
            for tag in distinct {
                *counts.entry(tag).or_insert(0) += 1;
            }
        }

        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(tag, count)| (tag.to_string(), count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }

    /// CSS for highlighted code blocks
    pub fn get_highlight_stylesheet(&self) -> String {
        if let Some(css) = self
            .stylesheet
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return css.to_string();
        }

        let started = self.generation();
        let css: Arc<str> = Arc::from(self.parser.renderer().stylesheet());
        self.publish(started, || {
            *self
                .stylesheet
                .write()
                .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&css));
        });
        css.to_string()
    }

    /// Forget every cached post and the stylesheet. Performs no I/O.
    pub fn clear_cache(&self) {
        let mut generation = self
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.cache.clear();
        *self
            .stylesheet
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        *generation += 1;
        tracing::debug!("Content cache cleared (generation {})", *generation);
    }

    /// Directory scans and parses performed so far
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            directory_scans: self.directory_scans.load(Ordering::Relaxed),
            files_parsed: self.files_parsed.load(Ordering::Relaxed),
        }
    }

    fn generation(&self) -> u64 {
        *self
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `store` unless the cache was cleared after `started`
    fn publish(&self, started: u64, store: impl FnOnce()) -> bool {
        let current = self
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *current == started {
            store();
            true
        } else {
            tracing::debug!("Cache cleared during load, result not cached");
            false
        }
    }

    fn parse(&self, path: &Path) -> Result<Post, ParseFailure> {
        self.files_parsed.fetch_add(1, Ordering::Relaxed);
        self.parser.parse_file(path)
    }

    /// Read and parse every post, newest first.
    ///
    /// Posts with equal dates keep file name order.
    fn scan(&self) -> Vec<Post> {
        self.directory_scans.fetch_add(1, Ordering::Relaxed);
        if !self.posts_dir.is_dir() {
            tracing::debug!("Posts directory {:?} does not exist", self.posts_dir);
            return Vec::new();
        }

        let mut posts = Vec::new();
        for entry in WalkDir::new(&self.posts_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Failed to read posts directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() || !is_markdown_file(path) {
                continue;
            }

            match self.parse(path) {
                Ok(post) => posts.push(post),
                // A failed document is left out of the list, never reported to callers
                Err(e) => tracing::warn!("Skipping post: {}", e),
            }
        }

        posts.sort_by(|a, b| b.date.cmp(&a.date));
        tracing::debug!(
            "Loaded {} posts from {:?}",
            posts.len(),
            self.posts_dir
        );
        posts
    }
}

/// Check if a file is a markdown post
fn is_markdown_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("md")
}

/// A slug names exactly one file inside the posts directory
fn is_valid_slug(slug: &str) -> bool {
    if slug.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(slug).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
