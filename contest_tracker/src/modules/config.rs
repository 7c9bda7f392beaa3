use anyhow::{Context, Result};
use contest_tracker_libs::sync::solution_links::{default_playlists, Playlist};
use std::env;

/// Credentials and playlist ids of the external sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub clist_username: Option<String>,
    pub clist_api_key: Option<String>,
    pub youtube_api_key: Option<String>,
    pub playlists: Vec<Playlist>,
}

impl SourceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup. Blank values count as unset.
    ///
    /// Playlist ids are read from `<PLATFORM>_PLAYLIST_ID` and fall back to the built-in ones.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|value| String::from(value.trim()))
                .filter(|value| !value.is_empty())
        };

        let playlists = default_playlists()
            .into_iter()
            .map(|playlist| {
                let key = format!("{}_PLAYLIST_ID", playlist.platform.to_uppercase());
                match value(&key) {
                    Some(id) => Playlist::new(&playlist.platform, Some(&id)),
                    None => playlist,
                }
            })
            .collect();

        Self {
            clist_username: value("CLIST_USERNAME"),
            clist_api_key: value("CLIST_API_KEY"),
            youtube_api_key: value("YOUTUBE_API_KEY"),
            playlists,
        }
    }

    pub fn clist_credentials(&self) -> Result<(&str, &str)> {
        let username = self.clist_username.as_deref().with_context(|| {
            let message = "CLIST_USERNAME must be configured.";
            tracing::error!(message);
            message
        })?;
        let api_key = self.clist_api_key.as_deref().with_context(|| {
            let message = "CLIST_API_KEY must be configured.";
            tracing::error!(message);
            message
        })?;

        Ok((username, api_key))
    }
}

pub fn database_url() -> Result<String> {
    env::var("DATABASE_URL").with_context(|| {
        let message = "DATABASE_URL must be configured.";
        tracing::error!(message);
        message
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use contest_tracker_libs::sync::solution_links::PLACEHOLDER_PLAYLIST_ID;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (String::from(*k), String::from(*v)))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SourceConfig::from_lookup(lookup(&[]));

        assert_eq!(config.clist_username, None);
        assert_eq!(config.youtube_api_key, None);
        assert_eq!(config.playlists, default_playlists());
        assert!(config.clist_credentials().is_err());
    }

    #[test]
    fn test_overrides() {
        let config = SourceConfig::from_lookup(lookup(&[
            ("CLIST_USERNAME", "alice"),
            ("CLIST_API_KEY", "secret"),
            ("YOUTUBE_API_KEY", "  "),
            ("CODECHEF_PLAYLIST_ID", "PL-codechef"),
        ]));

        assert_eq!(config.clist_credentials().unwrap(), ("alice", "secret"));
        assert_eq!(config.youtube_api_key, None);

        let codechef = config
            .playlists
            .iter()
            .find(|playlist| playlist.platform == "codechef")
            .unwrap();
        assert_eq!(codechef.usable_id(), Some("PL-codechef"));
        assert_ne!(codechef.playlist_id.as_deref(), Some(PLACEHOLDER_PLAYLIST_ID));
    }
}
