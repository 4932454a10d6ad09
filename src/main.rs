use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use plinth::build::build_site;
use plinth::config::Config;

/// Builds a blog's content collection and render plan from its source
/// documents.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Project directory; `plinth.yaml` is searched for here and in parent
    /// directories. Defaults to the current directory.
    project_dir: Option<PathBuf>,

    /// Number of worker threads for loading documents.
    #[arg(long)]
    threads: Option<usize>,

    /// Print the finished collection and render plan as JSON for an
    /// external renderer, instead of a summary.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let project_dir = match args.project_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let config = Config::from_directory(&project_dir, args.threads)?;
    let site = build_site(&config)?;

    if args.json {
        serde_json::to_writer_pretty(std::io::stdout().lock(), &site)?;
        println!();
    } else {
        println!(
            "{} documents, {} tags, {} categories, {} pages to render",
            site.collection.documents().len(),
            site.collection.by_tag().len(),
            site.collection.by_category().len(),
            site.plan.pages.len(),
        );
    }

    Ok(())
}
