//! inkpost: the content pipeline of a markdown personal blog
//!
//! Markdown files with YAML front-matter are parsed into [`Post`]s, rendered to
//! HTML with syntax-highlighted code, and served from a cached [`ContentStore`]
//! that answers the queries a blog front end needs: all posts, recent posts,
//! one post by slug, posts by tag and the tag list.

pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod store;

pub use content::{ParseFailure, Post};
pub use store::{ContentStore, StoreStats, DEFAULT_RECENT_LIMIT};

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A blog rooted at a base directory
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory holding the posts
    pub posts_dir: PathBuf,
}

impl Blog {
    /// Open a blog, reading `_config.yml` from the base directory when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        // join() keeps absolute paths as they are
        let posts_dir = base_dir.join(&config.posts_dir);

        Ok(Self {
            config,
            base_dir,
            posts_dir,
        })
    }

    /// Build a content store over the posts directory
    pub fn store(&self) -> ContentStore {
        ContentStore::new(&self.posts_dir, &self.config.highlight)
    }
}
