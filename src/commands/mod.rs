//! CLI commands

pub mod css;
pub mod list;
pub mod show;
