//! List site content

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::io::Write;

use crate::{ContentStore, Post};

/// Longest title shown in the recent posts list
const NAV_TITLE_LEN: usize = 40;

/// Post metadata without the rendered body
#[derive(Debug, Serialize)]
struct PostSummary<'a> {
    slug: &'a str,
    title: &'a str,
    date: NaiveDateTime,
    tags: &'a [String],
    excerpt: &'a str,
}

impl<'a> From<&'a Post> for PostSummary<'a> {
    fn from(post: &'a Post) -> Self {
        Self {
            slug: &post.slug,
            title: &post.title,
            date: post.date,
            tags: &post.tags,
            excerpt: &post.excerpt,
        }
    }
}

fn write_json<W: Write>(out: &mut W, posts: &[Post]) -> Result<()> {
    let summaries: Vec<PostSummary> = posts.iter().map(PostSummary::from).collect();
    serde_json::to_writer_pretty(&mut *out, &summaries)?;
    writeln!(out)?;
    Ok(())
}

fn write_posts<W: Write>(out: &mut W, heading: &str, posts: &[Post]) -> Result<()> {
    writeln!(out, "{} ({}):", heading, posts.len())?;
    for post in posts {
        writeln!(
            out,
            "  {} - {} [{}]",
            post.date.format("%Y-%m-%d"),
            post.title,
            post.slug
        )?;
    }
    Ok(())
}

/// List every post, newest first
pub fn posts<W: Write>(out: &mut W, store: &ContentStore, json: bool) -> Result<()> {
    let posts = store.load_all();
    if json {
        write_json(out, &posts)
    } else {
        write_posts(out, "Posts", &posts)
    }
}

/// List the newest posts the way the navigation sidebar shows them
pub fn recent<W: Write>(out: &mut W, store: &ContentStore, limit: usize, json: bool) -> Result<()> {
    let posts = store.load_recent(limit);
    if json {
        return write_json(out, &posts);
    }

    if posts.is_empty() {
        writeln!(out, "No recent posts.")?;
    }
    for post in &posts {
        writeln!(
            out,
            "  {}  {}",
            post.short_date(),
            post.nav_title(NAV_TITLE_LEN)
        )?;
    }
    Ok(())
}

/// List posts carrying a tag
pub fn tag<W: Write>(out: &mut W, store: &ContentStore, name: &str, json: bool) -> Result<()> {
    let posts = store.load_by_tag(name);
    if json {
        write_json(out, &posts)
    } else {
        write_posts(out, &format!("Posts tagged {:?}", name.trim()), &posts)
    }
}

/// List tags with their post counts
pub fn tags<W: Write>(out: &mut W, store: &ContentStore, json: bool) -> Result<()> {
    let counts = store.tag_counts();
    if json {
        serde_json::to_writer_pretty(&mut *out, &counts)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Tags ({}):", counts.len())?;
    for (tag, count) in counts {
        writeln!(out, "  {} ({})", tag, count)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HighlightConfig;
    use std::fs;
    use tempfile::TempDir;

    fn store() -> (TempDir, ContentStore) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("older.md"),
            "---\ntitle: Older\ndate: 2025-08-06\ntags: [testing]\n---\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("newer.md"),
            "---\ntitle: A Very Long Title That Will Not Fit In The Sidebar\ndate: 2025-08-08\ntags: [Python, testing]\n---\n",
        )
        .unwrap();
        let store = ContentStore::new(dir.path(), &HighlightConfig::default());
        (dir, store)
    }

    fn output(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_list_posts() {
        let (_dir, store) = store();
        let text = output(|out| posts(out, &store, false));
        assert_eq!(
            text,
            "Posts (2):\n  2025-08-08 - A Very Long Title That Will Not Fit In The Sidebar [newer]\n  2025-08-06 - Older [older]\n"
        );
    }

    #[test]
    fn test_list_posts_json() {
        let (_dir, store) = store();
        let text = output(|out| posts(out, &store, true));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["slug"], "newer");
        assert_eq!(value[0]["tags"][0], "python");
        assert_eq!(value[1]["date"], "2025-08-06T00:00:00");
        assert!(value[0].get("content").is_none());
    }

    #[test]
    fn test_recent_truncates_titles() {
        let (_dir, store) = store();
        let text = output(|out| recent(out, &store, 1, false));
        assert_eq!(
            text,
            "  Aug 08, 2025  A Very Long Title That Will Not Fit In T...\n"
        );
    }

    #[test]
    fn test_recent_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path(), &HighlightConfig::default());
        assert_eq!(output(|out| recent(out, &store, 3, false)), "No recent posts.\n");
    }

    #[test]
    fn test_tag_listing() {
        let (_dir, store) = store();
        let text = output(|out| tag(out, &store, "PYTHON", false));
        assert!(text.starts_with("Posts tagged \"PYTHON\" (1):"));
        assert!(text.contains("[newer]"));
    }

    #[test]
    fn test_tags_with_counts() {
        let (_dir, store) = store();
        assert_eq!(
            output(|out| tags(out, &store, false)),
            "Tags (2):\n  testing (2)\n  python (1)\n"
        );
    }
}
