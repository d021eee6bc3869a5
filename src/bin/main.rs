//! gyaan-search CLI - run one aggregated search, or serve the HTTP API
//!
//! Credentials come from flags or their environment variables; run
//! `gyaan-search providers` to see which integrations are enabled.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use gyaan_search::{
    config::{AggregatorConfig, DEFAULT_TIMEOUT_MS},
    normalize::non_empty,
    search, server, troubleshooting_hint, Aggregator, SearchMode, SearchResult,
};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "gyaan-search")]
#[command(about = "Multi-source search aggregation CLI and HTTP service")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    keys: KeyArgs,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct KeyArgs {
    /// NewsAPI key (news, trending, web fallback)
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true, global = true)]
    newsapi_key: Option<String>,

    /// Google Custom Search API key
    #[arg(long, env = "GOOGLE_SEARCH_API_KEY", hide_env_values = true, global = true)]
    google_api_key: Option<String>,

    /// Google Custom Search engine ID (cx)
    #[arg(long, env = "GOOGLE_SEARCH_ENGINE_ID", global = true)]
    google_engine_id: Option<String>,

    /// Unsplash access key (images)
    #[arg(long, env = "UNSPLASH_ACCESS_KEY", hide_env_values = true, global = true)]
    unsplash_key: Option<String>,

    /// Per-provider timeout in milliseconds
    #[arg(long, env = "SEARCH_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS, global = true)]
    timeout_ms: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one aggregated search
    Search {
        /// Search query
        query: String,

        /// Search mode
        #[arg(short, long, value_enum, default_value = "web")]
        mode: ModeCli,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Serve GET /api/search over HTTP
    Serve {
        /// Address to bind
        #[arg(short, long, default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
    },
    /// List upstream integrations and whether they are configured
    Providers,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeCli {
    Web,
    News,
    Trending,
    Images,
}

impl From<ModeCli> for SearchMode {
    fn from(mode: ModeCli) -> Self {
        match mode {
            ModeCli::Web => SearchMode::Web,
            ModeCli::News => SearchMode::News,
            ModeCli::Trending => SearchMode::Trending,
            ModeCli::Images => SearchMode::Images,
        }
    }
}

#[derive(ValueEnum, Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
    Simple,
}

impl KeyArgs {
    fn into_config(self) -> anyhow::Result<AggregatorConfig> {
        anyhow::ensure!(self.timeout_ms > 0, "--timeout-ms must be greater than zero");

        Ok(AggregatorConfig {
            newsapi_key: non_empty(self.newsapi_key),
            google_api_key: non_empty(self.google_api_key),
            google_search_engine_id: non_empty(self.google_engine_id),
            unsplash_access_key: non_empty(self.unsplash_key),
            timeout: Duration::from_millis(self.timeout_ms),
            ..Default::default()
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = cli.keys.into_config()?;

    match cli.command {
        Commands::Search {
            query,
            mode,
            format,
        } => handle_search(&config, &query, mode.into(), format).await?,
        Commands::Serve { bind } => {
            let aggregator = Aggregator::from_config(&config);
            server::serve(bind, aggregator)
                .await
                .with_context(|| format!("HTTP server on {bind} failed"))?;
        }
        Commands::Providers => handle_list_providers(&config),
    }

    Ok(())
}

async fn handle_search(
    config: &AggregatorConfig,
    query: &str,
    mode: SearchMode,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let aggregator = Aggregator::from_config(config);

    match search(&aggregator, query, mode.as_str()).await {
        Ok(results) => {
            display_results(&results, &format, mode)?;
            Ok(())
        }
        Err(err) => {
            if let Some(hint) = troubleshooting_hint(&err) {
                eprintln!("{} {}", "Hint:".yellow().bold(), hint);
            }
            Err(err).context(format!("{mode} search failed"))
        }
    }
}

fn handle_list_providers(config: &AggregatorConfig) {
    println!("{}", "Search Integrations:".bold().blue());
    println!();

    for integration in config.integrations() {
        let status = if integration.configured {
            "✅".green()
        } else {
            "❌".red()
        };
        println!(
            "{} {} - {}",
            status,
            integration.name.bold(),
            integration.requirement.italic()
        );
    }

    println!();
    println!("{}", "Set environment variables to enable integrations:".bold());
    println!("export NEWSAPI_KEY=your_key");
    println!("export GOOGLE_SEARCH_API_KEY=your_key");
    println!("export GOOGLE_SEARCH_ENGINE_ID=your_search_engine_id");
    println!("export UNSPLASH_ACCESS_KEY=your_access_key");
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

fn display_results(
    results: &[SearchResult],
    format: &OutputFormat,
    mode: SearchMode,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(results)?);
        }
        OutputFormat::Simple => {
            for (i, result) in results.iter().enumerate() {
                println!("{}. {}", i + 1, result.title);
                println!("   {}", result.url);
                println!("   {}", result.description);
                println!();
            }
        }
        OutputFormat::Table => {
            println!("{} {}", "Search Results for mode".bold(), mode.as_str().bold().blue());
            println!("{}", "─".repeat(80).dimmed());

            for (i, result) in results.iter().enumerate() {
                println!("{}. {}", (i + 1).to_string().bold(), result.title.bold());
                println!("   🔗 {}", result.url.blue().underline());
                println!("   🌐 {}", result.source.green());
                println!("   📄 {}", truncate(&result.description, 200).italic());

                if let Some(image_url) = &result.image_url {
                    println!("   🖼  {}", image_url.cyan());
                }
                if let Some(video_url) = &result.video_url {
                    println!("   🎬 {}", video_url.cyan());
                }
                println!("   📅 {}", result.published_at.yellow());
                println!();
            }

            println!("{} {}", "Total results:".bold(), results.len().to_string().bold());
        }
    }

    Ok(())
}
