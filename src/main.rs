//! webdigest command line

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use webdigest::{config, WebSearch};

#[derive(Parser)]
#[command(name = "webdigest", version, about = "Search the web and print a short digest")]
struct Cli {
    /// Print the tool output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Keep a key set in this run in memory only
    #[arg(long, global = true)]
    no_persist: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search for the given words
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Run the tool on a JSON input such as '{"query": "rust"}'
    Run { input: String },
    /// Save the search API key (empty to clear)
    SetKey { key: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("Starting webdigest v{}", webdigest::VERSION);

    let settings = config::load()?;
    let mut search = if cli.no_persist {
        WebSearch::session_only(&settings)?
    } else {
        WebSearch::from_settings(&settings)?
    };

    let output = match cli.command {
        Command::Search { query } => {
            let input = serde_json::json!({ "query": query.join(" ") }).to_string();
            search.execute(&input).await
        }
        Command::Run { input } => search.execute(&input).await,
        Command::SetKey { key } => {
            search.set_api_key(&key)?;
            if cli.no_persist {
                println!("Search API key set for this run only");
            } else {
                println!("Search API key saved");
            }
            return Ok(());
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", output.text.trim_end());
    }

    if !output.is_ok() {
        std::process::exit(1);
    }
    Ok(())
}
