use crate::{
    models::{BookmarkState, Contest, ContestRecord, NewSolutionLink, SolutionLink},
    store::{ContestStore, Result, SolutionLinkStore, StoreError},
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
    contests: BTreeMap<i64, Contest>,
    solution_links: BTreeMap<i64, SolutionLink>,
    next_contest_id: i64,
    next_solution_link_id: i64,
}

/// Process-local store used by tests and by `--in-memory` runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContestStore for MemoryStore {
    async fn upsert_contests(&self, records: &[ContestRecord]) -> Result<u64> {
        let mut state = self.state.write().await;

        for record in records.iter() {
            let existing = state
                .contests
                .values_mut()
                .find(|contest| contest.external_id == record.external_id);

            match existing {
                Some(contest) => {
                    contest.name = record.name.clone();
                    contest.platform = record.platform.clone();
                    contest.start_time = record.start_time;
                    contest.end_time = record.end_time;
                    contest.url = record.url.clone();
                }
                None => {
                    state.next_contest_id += 1;
                    let id = state.next_contest_id;
                    state.contests.insert(
                        id,
                        Contest {
                            id,
                            external_id: record.external_id,
                            name: record.name.clone(),
                            platform: record.platform.clone(),
                            start_time: record.start_time,
                            end_time: record.end_time,
                            url: record.url.clone(),
                            bookmarked: false,
                        },
                    );
                }
            }
        }

        Ok(records.len() as u64)
    }

    async fn delete_contests_except(&self, external_ids: &[i64]) -> Result<u64> {
        let keep: HashSet<i64> = external_ids.iter().copied().collect();
        let mut state = self.state.write().await;

        let before = state.contests.len();
        state
            .contests
            .retain(|_, contest| keep.contains(&contest.external_id));

        Ok((before - state.contests.len()) as u64)
    }

    async fn list_contests(&self) -> Result<Vec<Contest>> {
        let state = self.state.read().await;
        let mut contests: Vec<Contest> = state.contests.values().cloned().collect();
        contests.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));

        Ok(contests)
    }

    async fn search_contests(&self, title: &str) -> Result<Vec<Contest>> {
        let needle = title.to_lowercase();
        let contests = self
            .list_contests()
            .await?
            .into_iter()
            .filter(|contest| contest.name.to_lowercase().contains(&needle))
            .collect();

        Ok(contests)
    }

    async fn toggle_bookmark(&self, id: i64) -> Result<BookmarkState> {
        let mut state = self.state.write().await;
        let contest = state
            .contests
            .get_mut(&id)
            .ok_or(StoreError::NotFound(format!("contest {}", id)))?;
        contest.bookmarked = !contest.bookmarked;

        Ok(BookmarkState {
            id,
            bookmarked: contest.bookmarked,
        })
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl SolutionLinkStore for MemoryStore {
    async fn list_solution_links(&self) -> Result<Vec<SolutionLink>> {
        let state = self.state.read().await;
        Ok(state.solution_links.values().cloned().collect())
    }

    async fn insert_solution_link(&self, link: &NewSolutionLink) -> Result<SolutionLink> {
        let mut state = self.state.write().await;
        state.next_solution_link_id += 1;
        let created = SolutionLink {
            id: state.next_solution_link_id,
            contest_id: link.contest_id,
            platform: link.platform.clone(),
            youtube_link: link.youtube_link.clone(),
        };
        state.solution_links.insert(created.id, created.clone());

        Ok(created)
    }

    async fn update_solution_link(&self, id: i64, youtube_link: &str) -> Result<SolutionLink> {
        let mut state = self.state.write().await;
        let link = state
            .solution_links
            .get_mut(&id)
            .ok_or(StoreError::NotFound(format!("solution link {}", id)))?;
        link.youtube_link = String::from(youtube_link);

        Ok(link.clone())
    }

    async fn delete_solution_link(&self, id: i64) -> Result<()> {
        let mut state = self.state.write().await;
        match state.solution_links.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(format!("solution link {}", id))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(external_id: i64, name: &str) -> ContestRecord {
        ContestRecord {
            external_id,
            name: String::from(name),
            platform: String::from("codeforces"),
            start_time: Utc.with_ymd_and_hms(2024, 6, 3, 14, 35, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 6, 3, 16, 35, 0).unwrap(),
            url: String::new(),
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let store = MemoryStore::new();
        store
            .upsert_contests(&[record(1, "Round 1"), record(2, "Round 2")])
            .await
            .unwrap();
        store
            .upsert_contests(&[record(1, "Round 1 (renamed)")])
            .await
            .unwrap();

        let contests = store.list_contests().await.unwrap();
        assert_eq!(contests.len(), 2);
        assert_eq!(contests[0].name, "Round 1 (renamed)");
        assert_eq!(contests[0].id, 1);
    }

    #[tokio::test]
    async fn test_delete_contests_except() {
        let store = MemoryStore::new();
        store
            .upsert_contests(&[record(1, "a"), record(2, "b"), record(3, "c")])
            .await
            .unwrap();

        let deleted = store.delete_contests_except(&[2]).await.unwrap();
        assert_eq!(deleted, 2);

        let contests = store.list_contests().await.unwrap();
        assert_eq!(contests.len(), 1);
        assert_eq!(contests[0].external_id, 2);
    }

    #[tokio::test]
    async fn test_toggle_bookmark() {
        let store = MemoryStore::new();
        store.upsert_contests(&[record(1, "a")]).await.unwrap();

        assert!(store.toggle_bookmark(1).await.unwrap().bookmarked);
        assert!(!store.toggle_bookmark(1).await.unwrap().bookmarked);
        assert!(matches!(
            store.toggle_bookmark(42).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let store = MemoryStore::new();
        store
            .upsert_contests(&[record(1, "Codeforces Round 950"), record(2, "Starters 139")])
            .await
            .unwrap();

        let found = store.search_contests("round").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].external_id, 1);
    }

    #[tokio::test]
    async fn test_solution_link_lifecycle() {
        let store = MemoryStore::new();
        let created = store
            .insert_solution_link(&NewSolutionLink {
                contest_id: 1,
                platform: String::from("leetcode"),
                youtube_link: String::from("https://www.youtube.com/watch?v=a"),
            })
            .await
            .unwrap();

        let updated = store
            .update_solution_link(created.id, "https://www.youtube.com/watch?v=b")
            .await
            .unwrap();
        assert_eq!(updated.youtube_link, "https://www.youtube.com/watch?v=b");
        assert_eq!(updated.contest_id, 1);

        store.delete_solution_link(created.id).await.unwrap();
        assert!(store.list_solution_links().await.unwrap().is_empty());
        assert!(matches!(
            store.delete_solution_link(created.id).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
