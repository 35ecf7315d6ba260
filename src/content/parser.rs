//! Post parser - turns one markdown document into a [`Post`]

use chrono::{Local, NaiveDateTime};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::date::{normalize_date, DateValue};
use super::post::{normalize_tag, DEFAULT_TITLE};
use super::{FrontMatter, MarkdownRenderer, Post};
use crate::config::HighlightConfig;

/// A document that could not be turned into a post
#[derive(Debug, Error)]
pub enum ParseFailure {
    /// Missing, unreadable, or not valid UTF-8
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A front-matter block that is not a YAML mapping of the expected shape
    #[error("invalid front-matter in {path:?}: {source}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Parses markdown documents into posts
pub struct PostParser {
    renderer: MarkdownRenderer,
}

impl PostParser {
    /// Create a parser with the given highlight settings
    pub fn new(highlight: &HighlightConfig) -> Self {
        Self {
            renderer: MarkdownRenderer::with_options(highlight),
        }
    }

    /// The renderer used for post bodies
    pub fn renderer(&self) -> &MarkdownRenderer {
        &self.renderer
    }

    /// Parse a file; the slug is the file stem
    pub fn parse_file(&self, path: &Path) -> Result<Post, ParseFailure> {
        let content = fs::read_to_string(path).map_err(|source| ParseFailure::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let slug = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.parse_str(&slug, &content, Local::now().naive_local())
            .map_err(|source| ParseFailure::Frontmatter {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Parse document text.
    ///
    /// `now` stands in for missing or unusable dates.
    pub fn parse_str(
        &self,
        slug: &str,
        content: &str,
        now: NaiveDateTime,
    ) -> Result<Post, serde_yaml::Error> {
        let (fm, body) = FrontMatter::parse(content)?;

        let date = normalize_date(&DateValue::from_yaml(fm.date.as_ref()), now);
        let tags = fm
            .tags
            .iter()
            .map(|t| normalize_tag(t))
            .filter(|t| !t.is_empty())
            .collect();

        Ok(Post {
            slug: slug.to_string(),
            title: fm.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            date,
            tags,
            excerpt: fm.excerpt.unwrap_or_default(),
            content: self.renderer.render(body),
            raw_content: body.to_string(),
        })
    }
}

impl Default for PostParser {
    fn default() -> Self {
        Self::new(&HighlightConfig::default())
    }
}
