use crate::modules::config::{self, SourceConfig};
use anyhow::{Context, Result};
use contest_tracker_libs::{
    sources::{ClistClient, YouTubeClient},
    store::{ContestStore, MemoryStore, PgStore, SolutionLinkStore, MIGRATOR},
    ContestSynchronizer, SolutionLinkSynchronizer,
};
use sqlx::{postgres::Postgres, Pool};
use std::sync::Arc;

/// Both stores, usually backed by the same object.
#[derive(Clone)]
pub struct Stores {
    pub contests: Arc<dyn ContestStore>,
    pub solution_links: Arc<dyn SolutionLinkStore>,
}

impl Stores {
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: ContestStore + SolutionLinkStore + 'static,
    {
        Self {
            contests: store.clone(),
            solution_links: store,
        }
    }

    /// Connect to `DATABASE_URL` and apply pending migrations, or use a fresh in-memory store.
    pub async fn open(in_memory: bool) -> Result<Self> {
        if in_memory {
            tracing::warn!("Using the in-memory store. Nothing will be persisted.");
            return Ok(Self::shared(Arc::new(MemoryStore::new())));
        }

        let pool = connect(&config::database_url()?).await?;
        Ok(Self::shared(Arc::new(PgStore::new(pool))))
    }
}

pub async fn connect(database_url: &str) -> Result<Pool<Postgres>> {
    let pool: Pool<Postgres> = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .with_context(|| {
            let message = "Failed to create database connection pool.";
            tracing::error!(message);
            message
        })?;

    MIGRATOR.run(&pool).await.with_context(|| {
        let message = "Failed to apply database migrations.";
        tracing::error!(message);
        message
    })?;

    Ok(pool)
}

pub fn solution_link_synchronizer(
    config: &SourceConfig,
    stores: &Stores,
) -> Result<Arc<SolutionLinkSynchronizer>> {
    if config.youtube_api_key.is_none() {
        tracing::warn!("YOUTUBE_API_KEY is not set. Solution link sync will fail for every playlist.");
    }
    let client = YouTubeClient::new(config.youtube_api_key.clone()).with_context(|| {
        let message = "couldn't create YouTube client.";
        tracing::error!(message);
        message
    })?;

    Ok(Arc::new(SolutionLinkSynchronizer::new(
        Arc::new(client),
        stores.contests.clone(),
        stores.solution_links.clone(),
        config.playlists.clone(),
    )))
}

pub fn contest_synchronizer(
    config: &SourceConfig,
    stores: &Stores,
    solution_links: Arc<SolutionLinkSynchronizer>,
) -> Result<Arc<ContestSynchronizer>> {
    let (username, api_key) = config.clist_credentials()?;
    let client = ClistClient::new(username, api_key).with_context(|| {
        let message = "couldn't create CLIST client.";
        tracing::error!(message);
        message
    })?;

    Ok(Arc::new(ContestSynchronizer::new(
        Arc::new(client),
        stores.contests.clone(),
        solution_links,
    )))
}
