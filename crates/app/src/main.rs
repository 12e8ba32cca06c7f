use chrono::Utc;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand};
use gif_search_core::config::DEFAULT_API_BASE;
use gif_search_core::{
    autocomplete_output, failure_output, usage_output, ApiKey, Config, ContentCache,
    EnrichmentCoordinator, HttpMediaFetcher, LauncherOutput, SearchError, SearchPipeline,
    TenorClient,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use url::Url;

#[derive(Parser)]
#[command(name = "gif-search", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Tenor API key
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Tenor API base URL
    #[arg(long, env = "TENOR_API_URL", default_value = DEFAULT_API_BASE)]
    api_url: String,

    /// Number of results to request.
    #[arg(long, env = "MAX_RESULTS", default_value = "5")]
    max_results: u32,

    /// Media format used for icons and quick look.
    #[arg(long, env = "PREVIEW_QUALITY", default_value = "nanogif")]
    preview_quality: String,

    /// Media format copied when an item is selected.
    #[arg(long, env = "OUTPUT_QUALITY", default_value = "tinygif")]
    output_quality: String,

    /// Download previews into the cache directory.
    #[arg(
        long,
        env = "CACHE_ENABLED",
        default_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    cache_enabled: bool,

    /// Cache directory, relative to the executable's directory.
    #[arg(long, env = "CACHE_DIR_NAME", default_value = "cache")]
    cache_dir_name: String,

    /// Icon shown when no preview could be cached, relative to the
    /// executable's directory.
    #[arg(long, env = "FALLBACK_ICON", default_value = "./icon.png")]
    fallback_icon: String,
}

#[derive(Subcommand)]
enum Command {
    /// Search GIFs and print launcher items as JSON.
    Search {
        /// Search terms, joined with spaces.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        terms: Vec<String>,
    },
    /// Suggest search terms for a partial query.
    Autocomplete {
        /// Partial search terms, joined with spaces.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        terms: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    // stdout carries launcher JSON, so logs go to stderr.
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "gif-search boot"
    );

    let config = build_config(&cli, &workflow_dir());

    match cli.command {
        Command::Search { terms } => {
            let output = run_search(config, &terms.join(" ")).await;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Autocomplete { terms } => {
            let query = terms.join(" ").trim().to_lowercase();
            if query.is_empty() {
                anyhow::bail!("usage: gif-search autocomplete <search term>");
            }

            let client = TenorClient::new(&config?);
            let suggestions = client.autocomplete(&query).await?;
            let output = autocomplete_output(&query, suggestions);
            // Routing through a Value sorts the keys.
            println!("{}", serde_json::to_value(&output)?);
        }
    }

    Ok(())
}

async fn run_search(config: Result<Config, SearchError>, query: &str) -> LauncherOutput {
    if query.trim().is_empty() {
        return usage_output();
    }

    let config = match config {
        Ok(config) => config,
        Err(error @ SearchError::MissingCredential) => {
            warn!(%error, "cannot search without an API key");
            return failure_output("Missing API key", &error);
        }
        Err(error) => {
            warn!(%error, "invalid configuration");
            return failure_output("Configuration Error", &error);
        }
    };

    let cache = match ContentCache::new(&config.cache_dir, HttpMediaFetcher::new()) {
        Ok(cache) => cache,
        Err(error) => {
            warn!(dir = %config.cache_dir.display(), %error, "cache init failed");
            return failure_output("Cache Init Error", &error);
        }
    };

    let search = TenorClient::new(&config);
    let pipeline = SearchPipeline::new(search, EnrichmentCoordinator::new(config, cache));
    pipeline.run(query).await
}

fn build_config(cli: &Cli, workflow_dir: &Path) -> Result<Config, SearchError> {
    let api_key = ApiKey::from_optional(cli.api_key.clone())?;
    let mut config = Config::new(
        api_key,
        resolve_in(workflow_dir, &cli.cache_dir_name),
        resolve_in(workflow_dir, &cli.fallback_icon),
    )?;
    config.api_base = Url::parse(&cli.api_url)?;
    config.limit = cli.max_results;
    config.preview_quality = cli.preview_quality.clone();
    config.output_quality = cli.output_quality.clone();
    config.cache_enabled = cli.cache_enabled;
    Ok(config)
}

/// Directory holding the executable; launcher workflows keep their assets there.
fn workflow_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_default()
}

fn resolve_in(base: &Path, relative: &str) -> PathBuf {
    base.join(relative).components().collect()
}
