//! CLI entry point for inkpost

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inkpost::{commands, Blog};

#[derive(Parser)]
#[command(name = "inkpost")]
#[command(version)]
#[command(about = "Query the posts of a markdown blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all posts, newest first
    #[command(alias = "ls")]
    List,

    /// List the most recent posts
    Recent {
        /// Number of posts (defaults to recent_limit from _config.yml)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show a single post
    Show {
        /// Post slug (file name without .md)
        slug: String,
    },

    /// List posts with a tag
    Tag {
        /// Tag name, case-insensitive
        name: String,
    },

    /// List all tags with post counts
    Tags,

    /// Print the code highlighting stylesheet
    Css,

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "inkpost=debug,info"
    } else {
        "inkpost=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Commands::Version = cli.command {
        println!("inkpost version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    let blog = Blog::new(&base_dir)?;
    tracing::debug!("Reading posts from {:?}", blog.posts_dir);
    let store = blog.store();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::List => commands::list::posts(&mut out, &store, cli.json)?,
        Commands::Recent { limit } => {
            let limit = limit.unwrap_or(blog.config.recent_limit);
            commands::list::recent(&mut out, &store, limit, cli.json)?
        }
        Commands::Show { slug } => commands::show::run(&mut out, &store, &slug, cli.json)?,
        Commands::Tag { name } => commands::list::tag(&mut out, &store, &name, cli.json)?,
        Commands::Tags => commands::list::tags(&mut out, &store, cli.json)?,
        Commands::Css => commands::css::run(&mut out, &store)?,
        Commands::Version => {}
    }

    out.flush()?;
    Ok(())
}
