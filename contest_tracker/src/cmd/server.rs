use crate::modules::{
    config::SourceConfig,
    handlers::{
        add_solution_link, bookmark_contest, delete_solution_link, get_contests, liveness,
        search_contests, update_solution_link,
    },
    services::{self, Stores},
};
use anyhow::{Context, Result};
use axum::{extract::Extension, routing, Router, Server};
use clap::Args;
use contest_tracker_libs::{ContestSynchronizer, Scheduler};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::CorsLayer;

const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Args)]
pub struct ServerArgs {
    #[arg(long, env = "PORT")]
    port: Option<u16>,
    /// Keep everything in process memory instead of connecting to DATABASE_URL.
    #[arg(long)]
    in_memory: bool,
}

pub async fn run(args: ServerArgs) -> Result<()> {
    let config = SourceConfig::from_env();
    let stores = Stores::open(args.in_memory).await?;

    let solution_link_synchronizer = services::solution_link_synchronizer(&config, &stores)?;
    let contest_synchronizer =
        services::contest_synchronizer(&config, &stores, solution_link_synchronizer.clone())?;

    let mut scheduler = Scheduler::new(solution_link_synchronizer);
    scheduler.start();

    let app = create_router(stores, contest_synchronizer);
    let port = match args.port {
        Some(port) => port,
        None => {
            tracing::warn!(
                "API server will be launched at default port number {}",
                DEFAULT_PORT
            );
            DEFAULT_PORT
        }
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server start at port {}", port);

    let served = match Server::try_bind(&addr) {
        Ok(builder) => {
            builder
                .serve(app.into_make_service())
                .with_graceful_shutdown(shutdown_signal())
                .await
        }
        Err(e) => Err(e),
    };

    scheduler.stop().await;

    served.with_context(|| {
        let message = format!("server on port {} terminated with an error", port);
        tracing::error!(message);
        message
    })
}

pub fn create_router(stores: Stores, synchronizer: Arc<ContestSynchronizer>) -> Router {
    Router::new()
        .route("/api/contests", routing::get(get_contests))
        .route("/api/contests/search", routing::get(search_contests))
        .route("/api/contests/bookmark/:id", routing::post(bookmark_contest))
        .route(
            "/api/contests/solution-link",
            routing::post(add_solution_link),
        )
        .route(
            "/api/contests/solution-link/:id",
            routing::put(update_solution_link).delete(delete_solution_link),
        )
        .route("/api/liveness", routing::get(liveness))
        .layer(Extension(synchronizer))
        .layer(Extension(stores.contests))
        .layer(Extension(stores.solution_links))
        .layer(CorsLayer::permissive())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler.");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown.");
}
