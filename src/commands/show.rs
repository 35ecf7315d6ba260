//! Show a single post

use anyhow::{bail, Result};
use std::io::Write;

use crate::ContentStore;

/// Print a post's metadata and rendered HTML
pub fn run<W: Write>(out: &mut W, store: &ContentStore, slug: &str, json: bool) -> Result<()> {
    let Some(post) = store.load_by_slug(slug) else {
        bail!("post not found: {}", slug);
    };

    if json {
        serde_json::to_writer_pretty(&mut *out, &*post)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "{}", post.title)?;
    writeln!(out, "Published on {}", post.display_date())?;
    if !post.tags.is_empty() {
        writeln!(out, "Tags: {}", post.tags.join(", "))?;
    }
    writeln!(out)?;
    write!(out, "{}", post.content)?;
    Ok(())
}
