use actix_web::{middleware, web, App, HttpServer};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use github_trending::services::validate_inputs;
use github_trending::{
    handlers, AppState, Aggregator, Config, GitHubApiClient, TrendingPageClient,
};

/// GitHub Trending aggregation server
#[derive(Debug, Parser)]
#[command(name = "github-trending", version, about)]
struct Args {
    /// Run one aggregation, print the JSON response and exit
    #[arg(long)]
    cli: bool,

    /// Languages to filter (repeatable, "all" = no filter)
    #[arg(long, num_args = 0..)]
    languages: Vec<String>,

    /// Number of repos to fetch
    #[arg(long)]
    limit: Option<u32>,

    /// Trending time window: daily, weekly or monthly
    #[arg(long)]
    timeframe: Option<String>,

    /// Override the configured listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the configured listen port
    #[arg(long)]
    port: Option<u16>,
}

fn build_state(config: &Config) -> AppState {
    let timeout = Duration::from_secs(config.http_timeout_secs);
    let source = TrendingPageClient::new(timeout).expect("Failed to build trending page client");
    let enricher = GitHubApiClient::new(config.github_token.as_deref(), timeout)
        .expect("Failed to build GitHub API client");

    AppState {
        config: config.clone(),
        source: Arc::new(source),
        enricher: Arc::new(enricher),
    }
}

async fn run_cli(args: &Args, config: &Config) -> std::io::Result<()> {
    let languages = if args.languages.is_empty() {
        None
    } else {
        Some(args.languages.clone())
    };

    let request = match validate_inputs(languages, args.limit, args.timeframe.as_deref()) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Invalid request: {e}");
            std::process::exit(2);
        }
    };

    let state = build_state(config);
    let aggregator = Aggregator::new(
        state.source.clone(),
        state.enricher.clone(),
        Duration::from_millis(config.fetch_delay_ms),
    );

    match aggregator.aggregate(&request).await {
        Ok(response) => {
            let payload = serde_json::to_string_pretty(&response)
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            println!("{payload}");
            Ok(())
        }
        Err(e) => {
            eprintln!("Aggregation failed: {e}");
            std::process::exit(1);
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "github_trending=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = Config::from_env().expect("Failed to load configuration");
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    if args.cli {
        return run_cli(&args, &config).await;
    }

    info!(
        "Starting trending aggregation server on {}:{}",
        config.host, config.port
    );
    if config.github_token.is_some() {
        info!("GitHub API token configured; enrichment requests are authenticated");
    }

    let server_addr = (config.host.clone(), config.port);
    let app_state = web::Data::new(build_state(&config));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(handlers::configure_trending_routes)
    })
    .bind(server_addr)?
    .run()
    .await
}
