mod collect;
mod extract;
mod sink;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "vintdb-cli")]
#[command(about = "Vintage denim listing collector")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch, extract and store listings for the configured queries
    Collect {
        /// Run a single query phrase instead of the queries file
        #[arg(long)]
        query: Option<String>,

        /// Print the queries that would run without fetching anything
        #[arg(long)]
        dry_run: bool,

        /// Treat malformed listings and ambiguous ages as fatal
        #[arg(long)]
        strict: bool,
    },
    /// Run the age, model and size extractors on the given text
    Extract {
        /// Listing name, read by the age and model extractors
        #[arg(long)]
        name: String,

        /// Listing caption, read by the size extractor
        #[arg(long)]
        caption: Option<String>,
    },
}

/// Installs the fmt subscriber. `RUST_LOG` wins over `fallback`.
fn init_tracing(fallback: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Collect {
            query,
            dry_run,
            strict,
        }) => {
            let config = vintdb_core::load_app_config()?;
            init_tracing(&config.log_level)?;
            collect::run_collect(&config, query.as_deref(), dry_run, strict).await?;
        }
        Some(Commands::Extract { name, caption }) => {
            let level = std::env::var("VINTDB_LOG_LEVEL").unwrap_or_else(|_| "info".to_owned());
            init_tracing(&level)?;
            extract::run_extract(&name, caption.as_deref().unwrap_or_default())?;
        }
        None => println!("vintdb-cli: run with --help to list commands"),
    }

    Ok(())
}
