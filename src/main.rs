use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{Request, Response},
    middleware, Router,
};
use surrealdb::{engine::any::Any, Surreal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Span;
use uuid::Uuid;

use crate::{
    auth::token_service::AuthConfig,
    config::{DbConfig, StatsConfig},
    routes::{playback_routes::PlaybackRoutes, rating_routes::RatingRoutes},
    services::stats_tracker::{SongStatsTracker, StatsTracker},
};

pub use self::error::{Error, Result};

mod auth;
mod config;
mod controllers;
mod database;
mod error;
mod helpers;
mod middlewares;
mod models;
mod routes;
mod services;

#[derive(Clone)]
struct AppState {
    db: Surreal<Any>,
    auth_config: AuthConfig,
    stats_config: StatsConfig,
    stats_tracker: Arc<dyn StatsTracker>,
}

impl AppState {
    fn new(db: Surreal<Any>, auth_config: AuthConfig, stats_config: StatsConfig) -> Self {
        let stats_tracker = Arc::new(SongStatsTracker::new(db.clone()));
        Self {
            db,
            auth_config,
            stats_config,
            stats_tracker,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    tracing::info!("Starting Playback Stats API...");

    let db_config = DbConfig::from_env()?;
    let db = database::connect(&db_config).await?;

    let auth_config = AuthConfig::from_env()?;
    tracing::info!("Auth configuration loaded");

    let stats_config = StatsConfig::from_env()?;
    tracing::info!(
        min_prompt = stats_config.min_rating_prompt_threshold,
        max_prompt = stats_config.max_rating_prompt_threshold,
        min_duration = stats_config.playback_min_duration_secs,
        "Stats configuration loaded"
    );

    let app_state = AppState::new(db, auth_config, stats_config);

    let host = env::var("BIND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|_| Error::ConfigInvalid {
            name: "BIND_HOST".to_string(),
            reason: format!("'{host}:{port}' is not a socket address"),
        })?;

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app(app_state)).await?;

    Ok(())
}

fn app(app_state: AppState) -> Router {
    let protected_routes = Router::new()
        .nest("/playback", PlaybackRoutes::routes())
        .nest("/ratings", RatingRoutes::routes())
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            middlewares::mw_auth::mw_auth,
        ));

    Router::new()
        .nest("/api", protected_routes)
        .with_state(app_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4();
                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    tracing::info!("{} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &Response<Body>, latency: Duration, _span: &Span| {
                    let status = response.status();
                    let latency_ms = latency.as_millis();

                    match status.as_u16() {
                        200..=299 => tracing::info!("{} ({}ms)", status, latency_ms),
                        400..=499 => tracing::warn!("{} ({}ms)", status, latency_ms),
                        500..=599 => tracing::error!("{} ({}ms)", status, latency_ms),
                        _ => tracing::info!("{} ({}ms)", status, latency_ms),
                    }
                }),
        )
        .layer(CorsLayer::very_permissive())
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "playback_stats_api=debug,tower_http=info,info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

#[cfg(test)]
async fn test_state() -> AppState {
    AppState::new(
        database::testing::setup_db().await,
        auth::token_service::testing::test_config(),
        StatsConfig::default(),
    )
}
