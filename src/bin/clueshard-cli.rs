use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use clueshard::{config, Engine, FsStorage, HttpStorage, Storage};

#[derive(Parser, Debug)]
#[command(name = "clueshard-cli", about = "Query a chunked answer/clue index")]
struct Args {
    /// Local directory holding the index (offline build output)
    #[arg(long, conflicts_with = "base_url")]
    root: Option<std::path::PathBuf>,
    /// Base URL of the object store serving the index
    #[arg(long)]
    base_url: Option<String>,
    /// Optional TOML config file with engine tunables
    #[arg(long)]
    config: Option<std::path::PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find answers matching a pattern (letters and `?`)
    Search {
        pattern: String,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Fetch clues for a known answer
    Clues {
        answer: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show the cost classification and strategy for a pattern
    Analyze { pattern: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let storage: Arc<dyn Storage> = match (&args.root, &args.base_url) {
        (Some(root), _) => Arc::new(FsStorage::new(root.clone())),
        (None, Some(url)) => Arc::new(HttpStorage::new(url.clone())),
        (None, None) => anyhow::bail!("pass --root <dir> or --base-url <url>"),
    };
    let cfg = config::load_config(args.config.as_deref())?;
    let engine = Engine::new(storage, cfg);

    match args.cmd {
        Command::Search { pattern, limit } => {
            let matches = engine.find_matching_answers(&pattern, limit).await?;
            println!("{}", serde_json::to_string_pretty(&matches)?);
        }
        Command::Clues { answer, limit } => {
            let clues = engine.get_clues(&answer, limit).await;
            println!("{}", serde_json::to_string_pretty(&clues)?);
        }
        Command::Analyze { pattern } => {
            let analysis = engine.analyze_pattern(&pattern);
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
    }
    Ok(())
}
