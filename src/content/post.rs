//! Post model

use chrono::NaiveDateTime;
use serde::Serialize;

/// Title used when front-matter has none
pub const DEFAULT_TITLE: &str = "Untitled";

/// A blog post, parsed from one markdown file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    /// File stem of the source document, unique per posts directory
    pub slug: String,

    /// Post title
    pub title: String,

    /// Publication date, local wall-clock time
    pub date: NaiveDateTime,

    /// Lower-cased, trimmed tags in front-matter order
    pub tags: Vec<String>,

    /// Hand-written excerpt, empty when absent
    pub excerpt: String,

    /// Rendered HTML content
    pub content: String,

    /// Markdown body as written
    pub raw_content: String,
}

impl Post {
    /// Whether the post carries `tag` (already normalized)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Long form date, e.g. `August 08, 2025`
    pub fn display_date(&self) -> String {
        self.date.format("%B %d, %Y").to_string()
    }

    /// Short form date for navigation, e.g. `Aug 08, 2025`
    pub fn short_date(&self) -> String {
        self.date.format("%b %d, %Y").to_string()
    }

    /// Title cut to `max` characters with a trailing ellipsis
    pub fn nav_title(&self, max: usize) -> String {
        truncate(&self.title, max)
    }

    /// The excerpt, or the start of the rendered content when there is none
    pub fn summary(&self, max: usize) -> String {
        if self.excerpt.is_empty() {
            let mut summary: String = self.content.chars().take(max).collect();
            summary.push_str("...");
            summary
        } else {
            self.excerpt.clone()
        }
    }
}

/// Canonical form of a tag: trimmed and lower-cased
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let mut out: String = s.chars().take(max).collect();
        out.push_str("...");
        out
    } else {
        s.to_string()
    }
}
