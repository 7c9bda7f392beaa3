pub mod memory;
pub mod postgres;

use crate::models::{BookmarkState, Contest, ContestRecord, NewSolutionLink, SolutionLink};
use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::{PgStore, MIGRATOR};

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("{0} not found")]
    NotFound(String),
}

#[async_trait]
pub trait ContestStore: Send + Sync {
    /// Insert or update contests keyed by `external_id`. `bookmarked` is never written.
    async fn upsert_contests(&self, records: &[ContestRecord]) -> Result<u64>;
    /// Delete every contest whose `external_id` is not listed. Returns the number of deleted rows.
    async fn delete_contests_except(&self, external_ids: &[i64]) -> Result<u64>;
    async fn list_contests(&self) -> Result<Vec<Contest>>;
    /// Case-insensitive substring search on contest names.
    async fn search_contests(&self, title: &str) -> Result<Vec<Contest>>;
    async fn toggle_bookmark(&self, id: i64) -> Result<BookmarkState>;
    async fn ping(&self) -> Result<()>;
}

#[async_trait]
pub trait SolutionLinkStore: Send + Sync {
    async fn list_solution_links(&self) -> Result<Vec<SolutionLink>>;
    async fn insert_solution_link(&self, link: &NewSolutionLink) -> Result<SolutionLink>;
    async fn update_solution_link(&self, id: i64, youtube_link: &str) -> Result<SolutionLink>;
    async fn delete_solution_link(&self, id: i64) -> Result<()>;
}
