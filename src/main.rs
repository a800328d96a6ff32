use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, State};
use axum::response::{Html, IntoResponse};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod cli;
mod config;
mod errors;
mod middleware;
mod models;
mod net;
mod paths;
mod proxy;
mod store;

use middleware::usage::UsageTracker;
use proxy::upstream::UpstreamClient;

/// Shared application state passed to handlers and middleware.
pub struct AppState {
    pub config: config::Config,
    pub tracker: Arc<UsageTracker>,
    pub upstream: UpstreamClient,
    pub started_at: Instant,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "timeai=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => run_server(cfg, port).await,
        Some(cli::Commands::Seed { command }) => run_seed(cfg, command).await,
        None => run_server(cfg, None).await,
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: config::Config, requested_port: Option<u16>) -> anyhow::Result<()> {
    let requested = requested_port.unwrap_or(cfg.port);
    let port = net::resolve_port(requested).await?;
    if port != requested {
        tracing::warn!(requested, port, "requested port busy, using fallback");
    }

    let tracker = Arc::new(UsageTracker::new());
    let state = Arc::new(AppState {
        tracker: tracker.clone(),
        upstream: UpstreamClient::new(),
        config: cfg,
        started_at: Instant::now(),
    });

    let assets_dir = std::path::Path::new(&state.config.static_dir).join("assets");
    let cors_origin = state.config.cors_origin.clone();

    let app = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics_handler))
        .nest("/api", api::api_router())
        .nest_service("/assets", ServeDir::new(assets_dir))
        .fallback(spa_fallback)
        .with_state(state.clone())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer({
            use axum::http::{HeaderName, Method};
            use tower_http::cors::AllowOrigin;
            CorsLayer::new()
                .allow_origin(AllowOrigin::predicate(move |origin, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str == cors_origin
                        || origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                }))
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([
                    HeaderName::from_static("content-type"),
                    HeaderName::from_static("authorization"),
                    HeaderName::from_static("x-user-id"),
                    HeaderName::from_static("x-google-access-token"),
                    HeaderName::from_static("x-request-id"),
                ])
        })
        .layer(axum::middleware::from_fn_with_state(
            tracker,
            middleware::usage::track,
        ));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Time AI server listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_seed(cfg: config::Config, cmd: cli::SeedCommands) -> anyhow::Result<()> {
    let store = store::plans::PlanStore::new(&cfg.data_dir);
    match cmd {
        cli::SeedCommands::Plans => {
            let ids = store.seed_collection(store::plans::PLAN_CONFIGS).await?;
            println!("Seeded {} plan configs: {}", ids.len(), ids.join(", "));
        }
        cli::SeedCommands::Subscriptions => {
            let ids = store
                .seed_collection(store::plans::SUBSCRIPTION_PLANS)
                .await?;
            println!(
                "Seeded {} subscription plans: {}",
                ids.len(),
                ids.join(", ")
            );
        }
        cli::SeedCommands::All => {
            store.seed_all().await?;
            println!("Seeded plan_configs and subscription_plans.");
        }
    }
    Ok(())
}

async fn metrics_handler() -> String {
    middleware::metrics::encode_metrics()
}

/// Catch-all: serve the built frontend's entry document so the SPA
/// router can take over. Unknown routes still get the document; the
/// classification is only logged.
async fn spa_fallback(
    State(state): State<Arc<AppState>>,
    uri: axum::http::Uri,
) -> axum::response::Response {
    let classification = paths::validate_path(uri.path());
    if !classification.is_valid {
        tracing::debug!(path = %uri.path(), "path not present in the app's route tables");
    }

    let index = std::path::Path::new(&state.config.static_dir).join("index.html");
    match tokio::fs::read(&index).await {
        Ok(bytes) => Html(bytes).into_response(),
        Err(e) => {
            tracing::error!("failed to read {}: {}", index.display(), e);
            axum::http::StatusCode::NOT_FOUND.into_response()
        }
    }
}
