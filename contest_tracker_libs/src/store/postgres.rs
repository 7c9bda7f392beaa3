use crate::{
    models::{BookmarkState, Contest, ContestRecord, NewSolutionLink, SolutionLink},
    store::{ContestStore, Result, SolutionLinkStore, StoreError},
};
use async_trait::async_trait;
use sqlx::{migrate::Migrator, postgres::Postgres, Pool};

pub static MIGRATOR: Migrator = sqlx::migrate!();

pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Escape LIKE wildcards so user input is matched literally.
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl ContestStore for PgStore {
    /// `INSERT ... ON CONFLICT ("external_id")`. The update list leaves `bookmarked` alone.
    async fn upsert_contests(&self, records: &[ContestRecord]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut affected: u64 = 0;

        for record in records.iter() {
            let result = sqlx::query(
                r#"
                INSERT INTO "contests" (
                    "external_id", "name", "platform", "start_time", "end_time", "url"
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT ("external_id") DO UPDATE SET
                    "name" = EXCLUDED."name",
                    "platform" = EXCLUDED."platform",
                    "start_time" = EXCLUDED."start_time",
                    "end_time" = EXCLUDED."end_time",
                    "url" = EXCLUDED."url";
                "#,
            )
            .bind(record.external_id)
            .bind(&record.name)
            .bind(&record.platform)
            .bind(record.start_time)
            .bind(record.end_time)
            .bind(&record.url)
            .execute(&mut tx)
            .await;

            match result {
                Ok(done) => affected += done.rows_affected(),
                Err(e) => {
                    tracing::error!("an error occurred at saving {:?}: {:?}", record, e);
                    tx.rollback().await?;
                    return Err(StoreError::DatabaseError(e));
                }
            }
        }

        tx.commit().await?;

        Ok(affected)
    }

    async fn delete_contests_except(&self, external_ids: &[i64]) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM "contests" WHERE NOT ("external_id" = ANY($1));
            "#,
        )
        .bind(external_ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn list_contests(&self) -> Result<Vec<Contest>> {
        let contests: Vec<Contest> = sqlx::query_as(
            r#"
            SELECT
                "id", "external_id", "name", "platform", "start_time", "end_time", "url", "bookmarked"
            FROM
                "contests"
            ORDER BY
                "start_time" ASC, "id" ASC;
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(contests)
    }

    async fn search_contests(&self, title: &str) -> Result<Vec<Contest>> {
        let contests: Vec<Contest> = sqlx::query_as(
            r#"
            SELECT
                "id", "external_id", "name", "platform", "start_time", "end_time", "url", "bookmarked"
            FROM
                "contests"
            WHERE
                "name" ILIKE $1
            ORDER BY
                "start_time" ASC, "id" ASC;
            "#,
        )
        .bind(format!("%{}%", escape_like(title)))
        .fetch_all(&self.pool)
        .await?;

        Ok(contests)
    }

    async fn toggle_bookmark(&self, id: i64) -> Result<BookmarkState> {
        let state: Option<BookmarkState> = sqlx::query_as(
            r#"
            UPDATE "contests" SET "bookmarked" = NOT "bookmarked" WHERE "id" = $1
            RETURNING "id", "bookmarked";
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        state.ok_or(StoreError::NotFound(format!("contest {}", id)))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1;").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl SolutionLinkStore for PgStore {
    async fn list_solution_links(&self) -> Result<Vec<SolutionLink>> {
        let links: Vec<SolutionLink> = sqlx::query_as(
            r#"
            SELECT "id", "contest_id", "platform", "youtube_link" FROM "solution_links" ORDER BY "id" ASC;
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    async fn insert_solution_link(&self, link: &NewSolutionLink) -> Result<SolutionLink> {
        let created: SolutionLink = sqlx::query_as(
            r#"
            INSERT INTO "solution_links" ("contest_id", "platform", "youtube_link")
            VALUES ($1, $2, $3)
            RETURNING "id", "contest_id", "platform", "youtube_link";
            "#,
        )
        .bind(link.contest_id)
        .bind(&link.platform)
        .bind(&link.youtube_link)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update_solution_link(&self, id: i64, youtube_link: &str) -> Result<SolutionLink> {
        let updated: Option<SolutionLink> = sqlx::query_as(
            r#"
            UPDATE "solution_links" SET "youtube_link" = $2 WHERE "id" = $1
            RETURNING "id", "contest_id", "platform", "youtube_link";
            "#,
        )
        .bind(id)
        .bind(youtube_link)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or(StoreError::NotFound(format!("solution link {}", id)))
    }

    async fn delete_solution_link(&self, id: i64) -> Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM "solution_links" WHERE "id" = $1;
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("solution link {}", id)));
        }

        Ok(())
    }
}
