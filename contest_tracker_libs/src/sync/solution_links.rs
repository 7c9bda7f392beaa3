use crate::{
    models::NewSolutionLink,
    sources::VideoSource,
    store::{ContestStore, SolutionLinkStore},
    sync::{matcher, SyncError},
};
use std::{collections::HashSet, sync::Arc};

/// Playlist id used in deployments that have no playlist for a platform yet.
pub const PLACEHOLDER_PLAYLIST_ID: &str = "placeholder_codechef_playlist_id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub platform: String,
    pub playlist_id: Option<String>,
}

impl Playlist {
    pub fn new(platform: &str, playlist_id: Option<&str>) -> Self {
        Self {
            platform: String::from(platform),
            playlist_id: playlist_id.map(String::from),
        }
    }

    /// The playlist id, unless it is missing, blank or the placeholder.
    pub fn usable_id(&self) -> Option<&str> {
        self.playlist_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty() && *id != PLACEHOLDER_PLAYLIST_ID)
    }
}

pub fn default_playlists() -> Vec<Playlist> {
    vec![
        Playlist::new("leetcode", Some("PLcXpkI9A-RZI6FhydNz3JBt_-p_i25Cbr")),
        Playlist::new("codeforces", Some("PLcXpkI9A-RZLUfBSNp-YQBCOezZKbDSgB")),
        Playlist::new("codechef", Some(PLACEHOLDER_PLAYLIST_ID)),
    ]
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolutionLinkSyncReport {
    pub processed: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
    pub created: usize,
    pub unmatched: usize,
}

pub struct SolutionLinkSynchronizer {
    source: Arc<dyn VideoSource>,
    contests: Arc<dyn ContestStore>,
    solution_links: Arc<dyn SolutionLinkStore>,
    playlists: Vec<Playlist>,
}

impl SolutionLinkSynchronizer {
    pub fn new(
        source: Arc<dyn VideoSource>,
        contests: Arc<dyn ContestStore>,
        solution_links: Arc<dyn SolutionLinkStore>,
        playlists: Vec<Playlist>,
    ) -> Self {
        Self {
            source,
            contests,
            solution_links,
            playlists,
        }
    }

    /// Match playlist videos to contests and record the new solution links.
    ///
    /// Never fails: errors are logged and summarized in the returned report.
    pub async fn sync_solution_links(&self) -> SolutionLinkSyncReport {
        tracing::info!("Start to sync solution links from YouTube playlists.");
        match self.try_sync().await {
            Ok(report) => {
                tracing::info!(
                    "Solution links synced: {} created, {} unmatched, failed platforms {:?}",
                    report.created,
                    report.unmatched,
                    report.failed
                );
                report
            }
            Err(e) => {
                tracing::error!("Error syncing solution links: {:?}", e);
                SolutionLinkSyncReport::default()
            }
        }
    }

    async fn try_sync(&self) -> Result<SolutionLinkSyncReport, SyncError> {
        let contests = self.contests.list_contests().await?;
        let mut known: HashSet<(i64, String)> = self
            .solution_links
            .list_solution_links()
            .await?
            .into_iter()
            .map(|link| (link.contest_id, link.youtube_link))
            .collect();

        let mut report = SolutionLinkSyncReport::default();

        for playlist in self.playlists.iter() {
            let platform = playlist.platform.as_str();
            let playlist_id = match playlist.usable_id() {
                Some(id) => id,
                None => {
                    tracing::info!(
                        "Skipping {} due to missing or placeholder playlist ID",
                        platform
                    );
                    report.skipped.push(playlist.platform.clone());
                    continue;
                }
            };

            tracing::info!(
                "Fetching videos for {} from playlist {}",
                platform,
                playlist_id
            );
            let videos = match self.source.fetch_playlist(playlist_id).await {
                Ok(videos) => videos,
                Err(e) => {
                    tracing::error!(
                        "failed to fetch playlist {} for {}: {:?}",
                        playlist_id,
                        platform,
                        e
                    );
                    report.failed.push(playlist.platform.clone());
                    continue;
                }
            };

            let mut aborted = false;
            for video in videos.iter() {
                let contest = match matcher::match_contest(platform, &video.title, &contests) {
                    Some(contest) => contest,
                    None => {
                        tracing::debug!("No matching contest found for video: {}", video.title);
                        report.unmatched += 1;
                        continue;
                    }
                };

                let key = (contest.id, video.watch_url());
                if known.contains(&key) {
                    continue;
                }

                let link = NewSolutionLink {
                    contest_id: contest.id,
                    platform: contest.platform.clone(),
                    youtube_link: key.1.clone(),
                };
                match self.solution_links.insert_solution_link(&link).await {
                    Ok(_) => {
                        tracing::info!(
                            "Added solution link for {}: {} (published at {})",
                            contest.name,
                            link.youtube_link,
                            video.published_at.as_deref().unwrap_or("unknown")
                        );
                        known.insert(key);
                        report.created += 1;
                    }
                    Err(e) => {
                        tracing::error!(
                            "failed to save solution link for {}: {:?}",
                            contest.name,
                            e
                        );
                        aborted = true;
                        break;
                    }
                }
            }

            if aborted {
                report.failed.push(playlist.platform.clone());
            } else {
                report.processed.push(playlist.platform.clone());
            }
        }

        Ok(report)
    }
}
