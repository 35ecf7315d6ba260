//! Content module - posts, front-matter, dates and markdown rendering

pub mod date;
mod frontmatter;
mod markdown;
mod parser;
mod post;

pub use frontmatter::FrontMatter;
pub use markdown::MarkdownRenderer;
pub use parser::{ParseFailure, PostParser};
pub use post::{normalize_tag, Post, DEFAULT_TITLE};
