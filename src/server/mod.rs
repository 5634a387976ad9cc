//! HTTP surface over the registry and the heatmap request.
//!
//! Every route lives under `/api/git` except the health probe. Errors are
//! answered as `{"error": message}` with the status of the underlying
//! [`GlyphError`](crate::error::GlyphError).

pub mod error;
pub mod handlers;

use crate::config::Settings;
use crate::git::GitLog;
use crate::registry::Registry;
use crate::translate::translator_from_env;
use anyhow::Context;
use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub git: GitLog,
}

impl AppState {
    pub fn new(registry: Registry, git: GitLog) -> Self {
        Self {
            registry: Arc::new(registry),
            git,
        }
    }
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let started = Instant::now();
    let response = next.run(req).await;
    log::info!(
        "{method} {uri} -> {} ({} ms)",
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

pub fn router(state: AppState) -> Router {
    let git_routes = Router::new()
        .route("/repos", get(handlers::list_repos).post(handlers::add_repo))
        .route("/repos/discover", get(handlers::discover_repos))
        .route(
            "/repos/:id",
            delete(handlers::delete_repo).patch(handlers::update_repo),
        )
        .route("/repos/:id/default", post(handlers::set_default_repo))
        .route("/heatmap/:id", get(handlers::heatmap));

    Router::new()
        .nest("/api/git", git_routes)
        .route("/api/health", get(handlers::health_check))
        .with_state(state)
        .layer(middleware::from_fn(log_requests))
}

pub async fn serve(settings: &Settings, bind: SocketAddr) -> anyhow::Result<()> {
    let registry = Registry::new(settings, translator_from_env());
    if registry
        .initialize()
        .context("Failed to initialize repository registry")?
    {
        log::info!("created {}", settings.registry_file().display());
    }

    let app = router(AppState::new(registry, settings.git_log()));
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    log::info!(
        "serving repositories under {} on http://{bind}",
        settings.repos_base.display()
    );
    eprintln!("Listening on http://{bind}");
    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
